use crate::capture::{Frame, LinkType};
use crate::classifier::Classifier;
use crate::event::ArpMessage;
use arpscout_packets::{ArpFrame, ArpOp, EthernetFrame, ARP_ETHER_TYPE, VLAN_ETHER_TYPE};
use std::convert::TryFrom;
use tracing::{debug, trace};

/// What a frame turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpClass {
    /// Not ARP at all, or ARP we cannot decode. By far the most common case.
    NotArp,
    Request(ArpMessage),
    Reply(ArpMessage),
    /// ARP with an operation code other than request or reply.
    Other(ArpMessage),
}

#[derive(Default)]
pub struct ArpClassifier {}

impl ArpClassifier {
    pub fn new() -> Self {
        ArpClassifier {}
    }
}

impl Classifier for ArpClassifier {
    type Packet = Frame;
    type Class = ArpClass;

    fn classify(&self, packet: &Self::Packet) -> Self::Class {
        let ethernet = match arp_carrier(packet) {
            Some(ethernet) => ethernet,
            None => return ArpClass::NotArp,
        };

        let message = match ArpFrame::try_from(ethernet)
            .ok()
            .and_then(|arp| ArpMessage::from_frame(&arp))
        {
            Some(message) => message,
            None => return ArpClass::NotArp,
        };

        debug!(
            operation = message.operation,
            sender_ip = %message.sender_ip,
            target_ip = %message.target_ip,
            "ARP packet"
        );

        match message.op() {
            Some(ArpOp::Request) => ArpClass::Request(message),
            Some(ArpOp::Reply) => ArpClass::Reply(message),
            None => {
                trace!(operation = message.operation, "ignoring ARP operation");
                ArpClass::Other(message)
            }
        }
    }
}

// Linux cooked capture header: packet type, ARPHRD type, address length, 8 address bytes, protocol.
const SLL_HEADER_LEN: usize = 16;
const SLL_PROTOCOL_OFFSET: usize = 14;

// Only frames that carry ARP get copied into an EthernetFrame. A cooked capture frame is rewrapped
// with a blank Ethernet header, since the ARP body carries the addresses we report.
fn arp_carrier(packet: &Frame) -> Option<EthernetFrame> {
    let data = &packet.data;
    match packet.link_type {
        LinkType::Ethernet => {
            let carries_arp = match be16(data, 12) {
                Some(ARP_ETHER_TYPE) => true,
                Some(VLAN_ETHER_TYPE) => be16(data, 16) == Some(ARP_ETHER_TYPE),
                _ => false,
            };
            if carries_arp {
                EthernetFrame::from_buffer(data.clone()).ok()
            } else {
                None
            }
        }
        LinkType::LinuxSll => {
            if be16(data, SLL_PROTOCOL_OFFSET) != Some(ARP_ETHER_TYPE) {
                return None;
            }
            let mut ethernet = EthernetFrame::empty();
            ethernet.set_ether_type(ARP_ETHER_TYPE);
            ethernet.set_payload(data.get(SLL_HEADER_LEN..)?);
            Some(ethernet)
        }
        LinkType::Other(_) => None,
    }
}

fn be16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::packet_generators::{
        arp_frame, arp_reply, arp_request, ipv4_frame, linux_sll, vlan_tagged,
    };
    use std::net::Ipv4Addr;

    const MAC: [u8; 6] = [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e];

    fn sender() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 1, 100)
    }

    fn target() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 1, 1)
    }

    #[test]
    fn reply_is_reply() {
        let class = ArpClassifier::new().classify(&arp_reply(MAC, sender(), target()));
        match class {
            ArpClass::Reply(message) => {
                assert_eq!(message.sender_ip, sender());
                assert_eq!(message.sender_mac.bytes, MAC);
                assert_eq!(message.target_ip, target());
            }
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[test]
    fn request_is_request() {
        let class = ArpClassifier::new().classify(&arp_request(MAC, sender(), target()));
        assert!(matches!(class, ArpClass::Request(_)));
    }

    #[test]
    fn plain_ipv4_is_not_arp() {
        assert_eq!(ArpClassifier::new().classify(&ipv4_frame()), ArpClass::NotArp);
    }

    #[test]
    fn unknown_operation_is_other() {
        let class = ArpClassifier::new().classify(&arp_frame(3, MAC, sender(), target()));
        assert!(matches!(class, ArpClass::Other(m) if m.operation == 3));
    }

    #[test]
    fn vlan_tagged_reply_is_reply() {
        let class = ArpClassifier::new().classify(&vlan_tagged(arp_reply(MAC, sender(), target()), 10));
        assert!(matches!(class, ArpClass::Reply(_)));
    }

    #[test]
    fn cooked_capture_reply_is_reply() {
        let frame = linux_sll(arp_reply(MAC, sender(), target()));
        assert_eq!(frame.link_type, LinkType::LinuxSll);
        match ArpClassifier::new().classify(&frame) {
            ArpClass::Reply(message) => {
                assert_eq!(message.sender_ip, sender());
                assert_eq!(message.sender_mac.bytes, MAC);
                assert_eq!(message.target_ip, target());
            }
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[test]
    fn cooked_capture_request_and_ipv4() {
        let classifier = ArpClassifier::new();
        assert!(matches!(
            classifier.classify(&linux_sll(arp_request(MAC, sender(), target()))),
            ArpClass::Request(_)
        ));
        assert_eq!(classifier.classify(&linux_sll(ipv4_frame())), ArpClass::NotArp);
    }

    #[test]
    fn truncated_cooked_capture_is_not_arp() {
        let mut frame = linux_sll(arp_reply(MAC, sender(), target()));
        frame.data.truncate(SLL_HEADER_LEN + 10);
        assert_eq!(ArpClassifier::new().classify(&frame), ArpClass::NotArp);
        frame.data.truncate(SLL_PROTOCOL_OFFSET + 1);
        assert_eq!(ArpClassifier::new().classify(&frame), ArpClass::NotArp);
    }

    #[test]
    fn unknown_link_type_is_not_arp() {
        let mut frame = arp_reply(MAC, sender(), target());
        frame.link_type = LinkType::Other(147);
        assert_eq!(ArpClassifier::new().classify(&frame), ArpClass::NotArp);
    }

    #[test]
    fn truncated_arp_is_not_arp() {
        let mut frame = arp_reply(MAC, sender(), target());
        frame.data.truncate(30);
        assert_eq!(ArpClassifier::new().classify(&frame), ArpClass::NotArp);
    }

    #[test]
    fn runt_frame_is_not_arp() {
        let mut frame = ipv4_frame();
        frame.data.truncate(10);
        assert_eq!(ArpClassifier::new().classify(&frame), ArpClass::NotArp);
    }
}
