//! # What are they for?
//!
//! Classifiers are used to differentiate a stream of frames. They take each frame by reference and are
//! not able to modify it. Classifiers are able to return any type, but generally return an Enum that tells
//! the pipeline which path the frame takes next. For ARP discovery that is one of: drop it, or decode it
//! into an event.
mod arp;
pub use self::arp::*;

/// Used by the pipeline to determine the kind of frame we have. Classifier::Class is then consumed by
/// the pipeline to decide whether the frame goes any further.
pub trait Classifier {
    type Packet: Send + Clone;
    type Class: Sized;

    fn classify(&self, packet: &Self::Packet) -> Self::Class;
}
