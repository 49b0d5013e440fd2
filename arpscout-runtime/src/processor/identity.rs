use crate::event::DiscoveryEvent;
use crate::processor::Processor;

/// Hands every discovery event to the sink unchanged. This is the pipeline's default, so a device
/// that keeps answering ARP is reported every time it does.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Identity {
    pub fn new() -> Self {
        Identity
    }
}

impl Processor for Identity {
    type Input = DiscoveryEvent;
    type Output = DiscoveryEvent;

    fn process(&mut self, event: Self::Input) -> Option<Self::Output> {
        Some(event)
    }
}
