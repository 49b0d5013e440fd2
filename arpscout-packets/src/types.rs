use std::fmt;

/// The common datatype that all packet structures share to represent their data
pub type PacketData = Vec<u8>;

pub const IPV4_ETHER_TYPE: u16 = 0x0800;
pub const ARP_ETHER_TYPE: u16 = 0x0806;
pub const VLAN_ETHER_TYPE: u16 = 0x8100;

// Most significant byte is 0th
#[derive(Eq, Clone, Copy, Hash, PartialEq, Debug)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    pub fn broadcast() -> MacAddr {
        MacAddr::new([0xff; 6])
    }
}

/// Colon separated, upper-case hex: `00:1A:2B:3C:4D:5E`.
impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_upper_hex_with_colons() {
        let mac = MacAddr::new([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
        assert_eq!(mac.to_string(), "00:1A:2B:3C:4D:5E");
    }

    #[test]
    fn display_pads_single_digit_octets() {
        let mac = MacAddr::new([1, 2, 3, 4, 5, 0xf]);
        assert_eq!(mac.to_string(), "01:02:03:04:05:0F");
        assert_eq!(MacAddr::broadcast().to_string(), "FF:FF:FF:FF:FF:FF");
    }
}
