use crate::error::SinkError;
use crate::event::DiscoveryEvent;
use crate::sink::Sink;
use crossbeam::channel::{bounded, Sender};
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Decouples a slow sink from the capture loop.
///
/// `submit` pushes the event into a bounded channel; one worker thread drains the channel into the
/// inner sink in the order events were submitted. When the channel is full `submit` blocks, so a
/// stalled sink slows capture down rather than growing memory. Failures of the inner sink are logged
/// by the worker, since by then the pipeline has already moved on.
///
/// Dropping the queue closes the channel and waits for the worker to drain what is left.
pub struct QueuedSink {
    sender: Option<Sender<DiscoveryEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl QueuedSink {
    pub fn new<S: Sink + Send + 'static>(mut inner: S, capacity: usize) -> Result<Self, SinkError> {
        let (sender, receiver) = bounded::<DiscoveryEvent>(capacity);
        let worker = thread::Builder::new()
            .name("arpscout-sink".into())
            .spawn(move || {
                for event in receiver.iter() {
                    if let Err(err) = inner.submit(event) {
                        warn!(error = %err, "queued sink submission failed");
                    }
                }
                if let Err(err) = inner.flush() {
                    warn!(error = %err, "queued sink flush failed");
                }
            })?;

        Ok(QueuedSink {
            sender: Some(sender),
            worker: Some(worker),
        })
    }
}

impl Sink for QueuedSink {
    fn submit(&mut self, event: DiscoveryEvent) -> Result<(), SinkError> {
        match &self.sender {
            Some(sender) => sender.send(event).map_err(|_| SinkError::Closed),
            None => Err(SinkError::Closed),
        }
    }
}

impl Drop for QueuedSink {
    fn drop(&mut self) {
        // Hanging up the sender ends the worker's receive loop once the queue is empty.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("sink worker panicked");
            }
        }
    }
}
