use crate::error::SinkError;
use crate::event::DiscoveryEvent;
use crate::sink::{LogSink, Sink};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Wraps LogSink with a simpler File-specific interface.
/// Events are appended, so a restarted monitor keeps the earlier record.
pub struct FileLogSink {
    log_sink: LogSink<File>,
}

impl FileLogSink {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<FileLogSink> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileLogSink {
            log_sink: LogSink::new(file),
        })
    }
}

impl Sink for FileLogSink {
    fn submit(&mut self, event: DiscoveryEvent) -> Result<(), SinkError> {
        self.log_sink.submit(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.log_sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs::{self, create_dir_all};
    use tempfile::tempdir;
    use uuid::Uuid;

    fn event(ip: &str) -> DiscoveryEvent {
        DiscoveryEvent {
            ip: ip.into(),
            mac: "AA:BB:CC:DD:EE:FF".into(),
            observed_at: Utc::now(),
        }
    }

    fn read_events(path: &Path) -> Vec<DiscoveryEvent> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_stream_of_events() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("test_logs");
        create_dir_all(&log_dir).unwrap();
        let log_path = log_dir.join(format!("{}.jsonl", Uuid::new_v4()));

        let events: Vec<DiscoveryEvent> = (0..10).map(|i| event(&format!("10.0.0.{}", i))).collect();
        let mut sink = FileLogSink::new(&log_path).unwrap();
        for e in events.clone() {
            sink.submit(e).unwrap();
        }
        std::mem::drop(sink);

        assert_eq!(read_events(&log_path), events);
    }

    #[test]
    fn appends_across_sinks() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join(format!("{}.jsonl", Uuid::new_v4()));

        let first = event("10.0.0.1");
        let second = event("10.0.0.2");
        FileLogSink::new(&log_path).unwrap().submit(first.clone()).unwrap();
        FileLogSink::new(&log_path).unwrap().submit(second.clone()).unwrap();

        assert_eq!(read_events(&log_path), vec![first, second]);
    }

    #[test]
    fn unwritable_path_fails_to_open() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("missing").join("events.jsonl");
        assert!(FileLogSink::new(&log_path).is_err());
    }
}
