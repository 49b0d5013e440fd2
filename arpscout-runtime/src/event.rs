use arpscout_packets::{ArpFrame, ArpOp, MacAddr, IPV4_ETHER_TYPE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::net::Ipv4Addr;

/// The fields of an Ethernet/IPv4 ARP packet that discovery cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpMessage {
    pub operation: u16,
    pub sender_ip: Ipv4Addr,
    pub sender_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpMessage {
    /// Reads the message out of a validated ARP frame. Frames for other protocol or hardware
    /// address families (anything but 6 byte MACs and IPv4) yield `None`.
    pub fn from_frame(arp: &ArpFrame) -> Option<Self> {
        if arp.protocol_type() != IPV4_ETHER_TYPE {
            return None;
        }
        Some(ArpMessage {
            operation: arp.opcode(),
            sender_ip: arp.sender_ipv4()?,
            sender_mac: arp.sender_mac()?,
            target_ip: arp.target_ipv4()?,
        })
    }

    pub fn op(&self) -> Option<ArpOp> {
        ArpOp::try_from(self.operation).ok()
    }

    pub fn is_reply(&self) -> bool {
        self.op() == Some(ArpOp::Reply)
    }
}

/// A device seen answering ARP, as handed to a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEvent {
    pub ip: String,
    pub mac: String,
    pub observed_at: DateTime<Utc>,
}

impl DiscoveryEvent {
    pub fn from_message(message: &ArpMessage, observed_at: DateTime<Utc>) -> Self {
        DiscoveryEvent {
            ip: message.sender_ip.to_string(),
            mac: message.sender_mac.to_string(),
            observed_at,
        }
    }
}

impl fmt::Display for DiscoveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discovered Device -> IP: {}, MAC: {}", self.ip, self.mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpscout_packets::EthernetFrame;
    use chrono::TimeZone;
    use std::net::IpAddr;

    fn reply_frame() -> ArpFrame {
        let mut arp = ArpFrame::ethernet_ipv4();
        arp.set_opcode(ArpOp::Reply as u16);
        arp.set_sender_hardware_addr(MacAddr::new([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]));
        arp.set_sender_protocol_addr(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100)));
        arp.set_target_protocol_addr(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)));
        arp
    }

    #[test]
    fn message_from_frame() {
        let message = ArpMessage::from_frame(&reply_frame()).unwrap();
        assert_eq!(message.operation, 2);
        assert!(message.is_reply());
        assert_eq!(message.sender_ip, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(message.target_ip, Ipv4Addr::new(192, 168, 1, 1));
    }

    #[test]
    fn non_ipv4_protocol_is_not_a_message() {
        let mut arp = reply_frame();
        arp.set_protocol_type(0x86dd);
        assert!(ArpMessage::from_frame(&arp).is_none());
    }

    #[test]
    fn odd_address_lengths_are_not_a_message() {
        let mut arp = ArpFrame::new(8, 4);
        arp.set_protocol_type(IPV4_ETHER_TYPE);
        arp.set_opcode(ArpOp::Reply as u16);
        let arp = ArpFrame::try_from(EthernetFrame::from_buffer(arp.frame().data).unwrap()).unwrap();
        assert!(ArpMessage::from_frame(&arp).is_none());
    }

    #[test]
    fn event_renders_display_strings() {
        let observed_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let message = ArpMessage::from_frame(&reply_frame()).unwrap();
        let event = DiscoveryEvent::from_message(&message, observed_at);
        assert_eq!(event.ip, "192.168.1.100");
        assert_eq!(event.mac, "00:1A:2B:3C:4D:5E");
        assert_eq!(event.observed_at, observed_at);
        assert_eq!(
            event.to_string(),
            "Discovered Device -> IP: 192.168.1.100, MAC: 00:1A:2B:3C:4D:5E"
        );
    }

    #[test]
    fn event_serializes_camel_case() {
        let event = DiscoveryEvent {
            ip: "10.0.0.7".into(),
            mac: "AA:BB:CC:DD:EE:FF".into(),
            observed_at: Utc.timestamp_opt(0, 0).unwrap(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"ip":"10.0.0.7","mac":"AA:BB:CC:DD:EE:FF","observedAt":"1970-01-01T00:00:00Z"}"#
        );
    }
}
