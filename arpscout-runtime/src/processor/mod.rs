//! Processors receive each decoded discovery event by value and either pass it on (possibly changed)
//! or drop it by returning `None`.
mod identity;
pub use self::identity::*;

mod dedup;
pub use self::dedup::*;

pub trait Processor {
    type Input: Send + Clone;
    type Output: Send + Clone;

    fn process(&mut self, packet: Self::Input) -> Option<Self::Output>;
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    type Input = P::Input;
    type Output = P::Output;

    fn process(&mut self, packet: Self::Input) -> Option<Self::Output> {
        (**self).process(packet)
    }
}
