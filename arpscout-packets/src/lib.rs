//! Zero-copy-ish views over captured link-layer frames.
//!
//! Frames are owned `Vec<u8>` buffers; the wrappers in this crate only add typed getters and
//! setters at the offsets defined by the relevant RFCs.

mod types;
pub use self::types::*;

mod ethernet;
pub use self::ethernet::*;

mod arp;
pub use self::arp::*;
