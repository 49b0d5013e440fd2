//! # What are they?
//!
//! A pipeline is the one loop arpscout runs: pull a frame, classify it, decode ARP replies into discovery
//! events, pass them through a processor and submit them to a sink. It owns the classifier, processor and
//! sink for the whole run; the frame source is handed to `run` and dropped when the run ends.

mod runner;
pub use self::runner::*;
