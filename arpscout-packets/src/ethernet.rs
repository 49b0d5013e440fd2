use crate::*;
use std::borrow::Cow;
use std::convert::{TryFrom, TryInto};

const HEADER_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;

#[derive(Clone, Debug)]
pub struct EthernetFrame {
    pub data: PacketData,
    pub payload_offset: usize,
}

impl EthernetFrame {
    pub fn from_buffer(frame: PacketData) -> Result<EthernetFrame, &'static str> {
        // Ethernet II frames must be at least the header, which is 14bytes
        // 0                    6                    12                      14
        // |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
        // A single 802.1Q tag pushes the real EtherType 4 bytes further in.

        if frame.len() < HEADER_LEN {
            return Err("Frame is less than the minimum of 14 bytes");
        }

        let outer_type = u16::from_be_bytes([frame[12], frame[13]]);
        let payload_offset = if outer_type == VLAN_ETHER_TYPE {
            if frame.len() < HEADER_LEN + VLAN_TAG_LEN {
                return Err("VLAN tagged frame is less than the minimum of 18 bytes");
            }
            HEADER_LEN + VLAN_TAG_LEN
        } else {
            HEADER_LEN
        };

        Ok(EthernetFrame {
            data: frame,
            payload_offset,
        })
    }

    /// Returns an empty EthernetFrame where all values all populated to zero. This function allocates a
    /// new array to hold the header.
    pub fn empty() -> EthernetFrame {
        EthernetFrame {
            data: vec![0; HEADER_LEN],
            payload_offset: HEADER_LEN,
        }
    }

    pub fn dest_mac(&self) -> MacAddr {
        let bytes = <[u8; 6]>::try_from(&self.data[0..6]).unwrap();
        MacAddr::new(bytes)
    }

    pub fn src_mac(&self) -> MacAddr {
        let bytes = <[u8; 6]>::try_from(&self.data[6..12]).unwrap();
        MacAddr::new(bytes)
    }

    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        self.data[..6].copy_from_slice(&mac.bytes[..6]);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        self.data[6..12].copy_from_slice(&mac.bytes[..6]);
    }

    /// The EtherType of the payload, looking through a VLAN tag if there is one.
    pub fn ether_type(&self) -> u16 {
        let at = self.payload_offset - 2;
        u16::from_be_bytes(self.data[at..at + 2].try_into().unwrap())
    }

    pub fn set_ether_type(&mut self, ether_type: u16) {
        let at = self.payload_offset - 2;
        self.data[at..at + 2].copy_from_slice(&ether_type.to_be_bytes());
    }

    pub fn is_vlan_tagged(&self) -> bool {
        self.payload_offset == HEADER_LEN + VLAN_TAG_LEN
    }

    // This gives you a cow of a slice of the payload.
    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[self.payload_offset..])
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.data.truncate(self.payload_offset);
        self.data.reserve_exact(payload.len());
        self.data.extend(payload);
    }

    /// Inserts an 802.1Q tag carrying `vlan_id`, keeping the current EtherType and payload.
    pub fn push_vlan_tag(&mut self, vlan_id: u16) {
        if self.is_vlan_tagged() {
            return;
        }
        let inner_type = self.ether_type();
        let mut tag = Vec::with_capacity(VLAN_TAG_LEN);
        tag.extend_from_slice(&VLAN_ETHER_TYPE.to_be_bytes());
        tag.extend_from_slice(&(vlan_id & 0x0fff).to_be_bytes());
        self.data.splice(12..12, tag);
        self.payload_offset = HEADER_LEN + VLAN_TAG_LEN;
        self.set_ether_type(inner_type);
    }
}

/// EthernetFrames are considered the same if they carry the same bytes.
impl PartialEq for EthernetFrame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for EthernetFrame {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn ethernet_frame() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0, 0];
        let frame = EthernetFrame::from_buffer(data).unwrap();
        assert_eq!(
            frame.dest_mac(),
            MacAddr::new([0xde, 0xad, 0xbe, 0xef, 0xff, 0xff])
        );
        assert_eq!(frame.src_mac(), MacAddr::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(frame.ether_type(), 0);
        assert_eq!(frame.payload().len(), 0);
    }

    #[test]
    fn set_payload() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0, 0];
        let mut frame = EthernetFrame::from_buffer(data).unwrap();
        assert_eq!(frame.payload().len(), 0);

        let new_payload: Vec<u8> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];
        frame.set_payload(&new_payload);
        assert_eq!(frame.payload(), new_payload);
        assert_eq!(frame.payload()[2], 3);
    }

    #[test]
    fn invalid_data_length() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6];
        assert_eq!(
            EthernetFrame::from_buffer(data),
            Err("Frame is less than the minimum of 14 bytes")
        );
    }

    #[test]
    fn set_macs() {
        let mut frame = EthernetFrame::empty();
        let new_dest = MacAddr::new([0x98, 0x88, 0x18, 0x12, 0xb4, 0xdf]);
        let new_src = MacAddr::new([0xac, 0x67, 0x3d, 0xfa, 0xbc, 0xdd]);
        frame.set_dest_mac(new_dest);
        frame.set_src_mac(new_src);
        assert_eq!(frame.dest_mac(), new_dest);
        assert_eq!(frame.src_mac(), new_src);
    }

    #[test]
    fn ether_type() {
        let data: Vec<u8> = vec![
            0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0x08, 0x06,
        ];
        let frame = EthernetFrame::from_buffer(data).unwrap();
        assert_eq!(frame.ether_type(), ARP_ETHER_TYPE);
        assert!(!frame.is_vlan_tagged());
    }

    #[test]
    fn vlan_tag_is_looked_through() {
        let data: Vec<u8> = vec![
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0x81, 0x00, 0x00, 0x0a, 0x08,
            0x06, 0xaa, 0xbb,
        ];
        let frame = EthernetFrame::from_buffer(data).unwrap();
        assert!(frame.is_vlan_tagged());
        assert_eq!(frame.ether_type(), ARP_ETHER_TYPE);
        assert_eq!(frame.payload(), vec![0xaa, 0xbb]);
    }

    #[test]
    fn truncated_vlan_tag() {
        let data: Vec<u8> = vec![
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0x81, 0x00, 0x00,
        ];
        assert!(EthernetFrame::from_buffer(data).is_err());
    }

    #[test]
    fn push_vlan_tag_keeps_payload() {
        let mut frame = EthernetFrame::empty();
        frame.set_ether_type(ARP_ETHER_TYPE);
        frame.set_payload(&[1, 2, 3]);
        frame.push_vlan_tag(42);

        let reparsed = EthernetFrame::from_buffer(frame.data.clone()).unwrap();
        assert!(reparsed.is_vlan_tagged());
        assert_eq!(reparsed.ether_type(), ARP_ETHER_TYPE);
        assert_eq!(reparsed.payload(), vec![1, 2, 3]);
        assert_eq!(reparsed.data[14..16], [0x00, 42]);
    }

    #[test]
    fn empty() {
        let empty_frame = EthernetFrame::empty();
        assert_eq!(empty_frame.payload_offset, 14);
        assert_eq!(empty_frame.data.len(), 14);
    }
}
