use crate::capture::Frame;
use crate::classifier::{ArpClass, ArpClassifier, Classifier};
use crate::error::{CaptureError, PipelineError, SinkError};
use crate::event::DiscoveryEvent;
use crate::processor::{Identity, Processor};
use crate::sink::Sink;
use tracing::{info, warn};

/// What the pipeline does when a sink submission fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkPolicy {
    escalate_after: Option<u32>,
}

impl SinkPolicy {
    /// Log every failure and keep capturing.
    pub fn never_escalate() -> Self {
        SinkPolicy {
            escalate_after: None,
        }
    }

    /// Stop the run once `failures` submissions in a row have failed.
    pub fn escalate_after(failures: u32) -> Self {
        SinkPolicy {
            escalate_after: Some(failures.max(1)),
        }
    }
}

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub arp_frames: u64,
    pub replies: u64,
    pub emitted: u64,
    pub sink_failures: u64,
}

/// What happened to a single frame.
#[derive(Debug)]
pub enum Outcome {
    /// Not an ARP reply.
    Skipped,
    /// A reply whose event the processor dropped.
    Suppressed,
    Emitted,
    /// The sink refused the event; the run carries on.
    SinkFailed(SinkError),
}

/// Pull loop from a frame source into a sink.
///
/// ```ignore
/// let mut pipeline = Pipeline::new(LogSink::new(std::io::stdout()))
///     .processor(Dedup::new())
///     .sink_policy(SinkPolicy::escalate_after(5));
/// let summary = pipeline.run(CaptureSource::live(&CaptureConfig::new("eth0"))?)?;
/// ```
pub struct Pipeline<C, P, S> {
    classifier: C,
    processor: P,
    sink: S,
    policy: SinkPolicy,
    summary: RunSummary,
    consecutive_failures: u32,
}

impl<S: Sink> Pipeline<ArpClassifier, Identity, S> {
    pub fn new(sink: S) -> Self {
        Pipeline {
            classifier: ArpClassifier::new(),
            processor: Identity::new(),
            sink,
            policy: SinkPolicy::never_escalate(),
            summary: RunSummary::default(),
            consecutive_failures: 0,
        }
    }
}

impl<C, P, S> Pipeline<C, P, S>
where
    C: Classifier<Packet = Frame, Class = ArpClass>,
    P: Processor<Input = DiscoveryEvent, Output = DiscoveryEvent>,
    S: Sink,
{
    pub fn processor<Q>(self, processor: Q) -> Pipeline<C, Q, S>
    where
        Q: Processor<Input = DiscoveryEvent, Output = DiscoveryEvent>,
    {
        Pipeline {
            classifier: self.classifier,
            processor,
            sink: self.sink,
            policy: self.policy,
            summary: self.summary,
            consecutive_failures: self.consecutive_failures,
        }
    }

    pub fn sink_policy(mut self, policy: SinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Ends the pipeline, handing back the sink so its owner decides when it is released.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs every frame through the pipeline until the source ends.
    ///
    /// `frames` is consumed and dropped before this returns, on every path, which for a
    /// `CaptureSource` closes the capture handle. A read error from the source ends the run with
    /// `PipelineError::Capture`; sink failures only end it if the `SinkPolicy` says so.
    pub fn run<I>(&mut self, frames: I) -> Result<RunSummary, PipelineError>
    where
        I: IntoIterator<Item = Result<Frame, CaptureError>>,
    {
        let result = self.drain(frames.into_iter());
        if let Err(err) = self.sink.flush() {
            warn!(error = %err, "sink flush failed");
        }
        result.map(|()| self.summary)
    }

    fn drain<I>(&mut self, frames: I) -> Result<(), PipelineError>
    where
        I: Iterator<Item = Result<Frame, CaptureError>>,
    {
        for frame in frames {
            self.process_frame(frame?)?;
        }
        Ok(())
    }

    /// Classifies, decodes, processes and emits a single frame.
    pub fn process_frame(&mut self, frame: Frame) -> Result<Outcome, PipelineError> {
        self.summary.frames += 1;

        let message = match self.classifier.classify(&frame) {
            ArpClass::NotArp => return Ok(Outcome::Skipped),
            ArpClass::Request(_) | ArpClass::Other(_) => {
                self.summary.arp_frames += 1;
                return Ok(Outcome::Skipped);
            }
            ArpClass::Reply(message) => message,
        };
        self.summary.arp_frames += 1;
        self.summary.replies += 1;

        let event = match self
            .processor
            .process(DiscoveryEvent::from_message(&message, frame.timestamp))
        {
            Some(event) => event,
            None => return Ok(Outcome::Suppressed),
        };

        info!("{}", event);

        match self.sink.submit(event) {
            Ok(()) => {
                self.summary.emitted += 1;
                self.consecutive_failures = 0;
                Ok(Outcome::Emitted)
            }
            Err(err) => {
                self.summary.sink_failures += 1;
                self.consecutive_failures += 1;
                warn!(error = %err, "sink submission failed, still listening");
                match self.policy.escalate_after {
                    Some(limit) if self.consecutive_failures >= limit => {
                        Err(PipelineError::SinkFailures {
                            failures: self.consecutive_failures,
                            last: err,
                        })
                    }
                    _ => Ok(Outcome::SinkFailed(err)),
                }
            }
        }
    }
}
