use arpscout_runtime::capture::{self, CaptureConfig, CaptureSource};
use arpscout_runtime::classifier::ArpClassifier;
use arpscout_runtime::error::{CaptureError, PipelineError, SinkError};
use arpscout_runtime::event::DiscoveryEvent;
use arpscout_runtime::pipeline::{Pipeline, RunSummary, SinkPolicy};
use arpscout_runtime::processor::{Dedup, Identity, Processor};
use arpscout_runtime::sink::{FileLogSink, LogSink, QueuedSink, Sink};
use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
use crate::cli::{Options, Source};

type BoxedSink = Box<dyn Sink + Send>;
type BoxedProcessor = Box<dyn Processor<Input = DiscoveryEvent, Output = DiscoveryEvent>>;
type AppPipeline = Pipeline<ArpClassifier, BoxedProcessor, BoxedSink>;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("cannot open output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot start sink worker: {0}")]
    Queue(#[source] SinkError),

    #[error("cannot install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

fn main() {
    let options = match cli::parse(std::env::args_os()) {
        Ok(options) => options,
        Err(e) => e.exit(),
    };

    init_logging(options.verbosity);

    if let Err(e) = run(&options) {
        error!("{}", e);
        process::exit(1);
    }
}

// RUST_LOG wins over -v when it is set.
fn init_logging(verbosity: u64) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(options: &Options) -> Result<(), AppError> {
    match &options.source {
        Source::ListInterfaces => list_interfaces(),
        Source::Live(device) => {
            let mut pipeline = assemble(options)?;
            let config = CaptureConfig::new(device.as_str())
                .snaplen(options.snaplen)
                .promisc(options.promisc)
                .stop_on(stop_on_interrupt()?);
            let source = CaptureSource::live(&config)?;
            info!("Listening for ARP replies on {}", source.description());
            let result = pipeline.run(source);
            finish(pipeline, result)
        }
        Source::Savefile(path) => {
            let mut pipeline = assemble(options)?;
            let source = CaptureSource::offline(path)?.stop_on(stop_on_interrupt()?);
            info!("Replaying ARP replies from {}", source.description());
            let result = pipeline.run(source);
            finish(pipeline, result)
        }
    }
}

// Ctrl-C only raises the flag; the capture source sees it and ends the run normally.
fn stop_on_interrupt() -> Result<Arc<AtomicBool>, AppError> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })?;
    Ok(stop)
}

/// Builds the pipeline the options ask for: output, queueing, dedup and sink failure policy.
fn assemble(options: &Options) -> Result<AppPipeline, AppError> {
    let processor: BoxedProcessor = if options.dedup {
        Box::new(Dedup::new())
    } else {
        Box::new(Identity::new())
    };
    Ok(Pipeline::new(build_sink(options)?)
        .processor(processor)
        .sink_policy(sink_policy(options)))
}

fn build_sink(options: &Options) -> Result<BoxedSink, AppError> {
    let sink: BoxedSink = match &options.output {
        Some(path) => Box::new(FileLogSink::new(path).map_err(|source| AppError::Output {
            path: path.clone(),
            source,
        })?),
        None => Box::new(LogSink::new(io::stdout())),
    };

    match options.queue {
        Some(capacity) => Ok(Box::new(
            QueuedSink::new(sink, capacity).map_err(AppError::Queue)?,
        )),
        None => Ok(sink),
    }
}

fn sink_policy(options: &Options) -> SinkPolicy {
    match options.max_sink_failures {
        Some(limit) => SinkPolicy::escalate_after(limit),
        None => SinkPolicy::never_escalate(),
    }
}

// Releasing the sink drains a queued sink, so the summary is only logged once every event is out.
fn finish(
    pipeline: AppPipeline,
    result: Result<RunSummary, PipelineError>,
) -> Result<(), AppError> {
    let summary = pipeline.summary();
    drop(pipeline.into_sink());
    log_summary(&summary);
    result.map(|_| ()).map_err(AppError::from)
}

fn list_interfaces() -> Result<(), AppError> {
    for interface in capture::interfaces()? {
        match interface.description {
            Some(description) => println!("{}\t{}", interface.name, description),
            None => println!("{}", interface.name),
        }
    }
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    info!(
        frames = summary.frames,
        arp_frames = summary.arp_frames,
        replies = summary.replies,
        emitted = summary.emitted,
        sink_failures = summary.sink_failures,
        "capture finished"
    );
}
