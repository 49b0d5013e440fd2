use crate::event::DiscoveryEvent;
use crate::processor::Processor;
use std::collections::HashSet;

/// Dedup
/// Drops events for an (ip, mac) pair that has already been passed. The set lives only as long
/// as the processor, so it is empty again after a restart.
#[derive(Default)]
pub struct Dedup {
    seen: HashSet<(String, String)>,
}

impl Dedup {
    pub fn new() -> Self {
        Dedup::default()
    }

    pub fn seen(&self) -> usize {
        self.seen.len()
    }
}

impl Processor for Dedup {
    type Input = DiscoveryEvent;
    type Output = DiscoveryEvent;

    fn process(&mut self, event: Self::Input) -> Option<Self::Output> {
        if self.seen.insert((event.ip.clone(), event.mac.clone())) {
            Some(event)
        } else {
            None
        }
    }
}
