/// The capture source binds to a live interface, or replays a savefile, and hands out owned `Frame`s
/// in arrival order. It is the only place in arpscout that touches libpcap, and the capture handle it
/// holds is released as soon as the source is dropped.
pub mod capture;

/// Classifiers look at a frame by reference and decide what kind of traffic it is. The ARP classifier
/// sorts frames into non-ARP, requests, replies, and anything else, decoding the ARP fields on the way.
pub mod classifier;

/// Processors sit between decoding and emission, and may pass, rewrite or drop a discovery event.
pub mod processor;

/// The decoded ARP view and the discovery event handed to sinks.
pub mod event;

/// Sinks are the consumers of discovery events. The pipeline owns exactly one for its whole run.
pub mod sink;

/// The pipeline pulls frames from a source one at a time and drives them through classification,
/// decoding, processing and emission. There is no concurrency in here; one frame is finished (or
/// abandoned) before the next one is pulled.
pub mod pipeline;

pub mod error;
