use thiserror::Error;

/// Failures of the capture resource itself.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot open capture on '{device}': {source}")]
    Open {
        device: String,
        #[source]
        source: pcap::Error,
    },

    #[error("capture read failed: {0}")]
    Read(#[source] pcap::Error),

    #[error("cannot list capture devices: {0}")]
    List(#[source] pcap::Error),
}

/// Failures reported by a sink for a single submission.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("event could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("sink is closed")]
    Closed,

    #[error("sink rejected event: {0}")]
    Rejected(String),
}

/// The only conditions that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("giving up after {failures} consecutive sink failures, last: {last}")]
    SinkFailures { failures: u32, last: SinkError },
}
