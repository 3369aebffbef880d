/// DMR 24-bit radio and talkgroup addresses.
///
/// Addresses travel as three bytes, most significant first.
use core::fmt;

use serde::Serialize;

/// A 24-bit DMR address (radio ID or talkgroup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Address(u32);

impl Address {
    /// Largest representable address (2^24 - 1).
    pub const MAX_VALUE: u32 = 0x00FF_FFFF;

    /// All-zero address, used before any call has been seen.
    pub const ZERO: Address = Address(0);

    /// Build an address from a raw value. Returns `None` above 24 bits.
    pub const fn new(value: u32) -> Option<Self> {
        if value > Self::MAX_VALUE {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Assemble an address from its wire bytes, high byte first.
    #[inline]
    pub const fn decode(hi: u8, mid: u8, lo: u8) -> Self {
        Self(lo as u32 | (mid as u32) << 8 | (hi as u32) << 16)
    }

    /// Assemble an address from a 3-byte wire triplet.
    #[inline]
    pub const fn from_bytes(b: [u8; 3]) -> Self {
        Self::decode(b[0], b[1], b[2])
    }

    /// Wire bytes, high byte first. Inverse of [`Address::decode`].
    #[inline]
    pub const fn encode(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_big_endian_triplet() {
        assert_eq!(Address::decode(0x00, 0x00, 0x63).value(), 99);
        assert_eq!(Address::decode(0x30, 0x05, 0x54).value(), 3_147_092);
        assert_eq!(Address::decode(0xFF, 0xFF, 0xFF).value(), Address::MAX_VALUE);
    }

    #[test]
    fn encode_puts_high_byte_first() {
        let addr = Address::new(0x30_05_54).unwrap();
        assert_eq!(addr.encode(), [0x30, 0x05, 0x54]);
    }

    #[test]
    fn new_rejects_values_above_24_bits() {
        assert!(Address::new(Address::MAX_VALUE).is_some());
        assert!(Address::new(Address::MAX_VALUE + 1).is_none());
        assert!(Address::new(u32::MAX).is_none());
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(format!("{}", Address::decode(0, 0, 0x63)), "99");
    }

    proptest! {
        #[test]
        fn encode_then_decode_is_identity(value in 0u32..=Address::MAX_VALUE) {
            let addr = Address::new(value).unwrap();
            prop_assert_eq!(Address::from_bytes(addr.encode()), addr);
        }

        #[test]
        fn decode_then_encode_is_identity(hi: u8, mid: u8, lo: u8) {
            prop_assert_eq!(Address::decode(hi, mid, lo).encode(), [hi, mid, lo]);
        }
    }
}
