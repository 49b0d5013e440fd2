//! # What are they?
//!
//! Sinks are where discovery events leave arpscout. The pipeline calls `submit` once per event, in
//! capture order, and never retries; transport, batching and retry are the sink's own business. A
//! failed submission is reported back to the pipeline, which logs it and moves on to the next frame.
use crate::error::SinkError;
use crate::event::DiscoveryEvent;

mod log;
pub use self::log::*;

mod file_log;
pub use self::file_log::*;

mod queue;
pub use self::queue::*;

pub trait Sink {
    fn submit(&mut self, event: DiscoveryEvent) -> Result<(), SinkError>;

    /// Pushes out anything buffered. Called once when a pipeline run ends.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn submit(&mut self, event: DiscoveryEvent) -> Result<(), SinkError> {
        (**self).submit(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn submit(&mut self, event: DiscoveryEvent) -> Result<(), SinkError> {
        (**self).submit(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
