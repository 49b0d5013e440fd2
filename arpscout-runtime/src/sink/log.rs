use crate::error::SinkError;
use crate::event::DiscoveryEvent;
use crate::sink::Sink;
use std::io::{BufWriter, Write};

/// Sink that writes each event as one line of JSON.
pub struct LogSink<W: Write> {
    log_writer: BufWriter<W>,
}

impl<W: Write> LogSink<W> {
    pub fn new(writer: W) -> LogSink<W> {
        LogSink {
            log_writer: BufWriter::new(writer),
        }
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        let LogSink { log_writer } = self;
        log_writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> Sink for LogSink<W> {
    fn submit(&mut self, event: DiscoveryEvent) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.log_writer, &event)?;
        self.log_writer.write_all(b"\n")?;
        // one line per event must be durable before the next frame is pulled
        self.log_writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.log_writer.flush()?;
        Ok(())
    }
}
