use std::fmt;
use std::str::FromStr;

use crate::error::RadioError;

/// Number of bytes in a radio address.
pub const ADDRESS_LEN: usize = 5;

/// A 5-byte transceiver address.
///
/// Displayed as colon-separated upper-case hex (`E7:E7:E7:E7:E7`). Parsing
/// accepts that form or ten bare hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = RadioError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| RadioError::InvalidAddress {
            input: format!("{bytes:02X?}"),
            reason: "expected exactly 5 bytes",
        })?;
        Ok(Self(raw))
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}")
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = RadioError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| RadioError::InvalidAddress {
            input: input.to_string(),
            reason,
        };

        let digits: String = input.trim().chars().filter(|c| *c != ':').collect();
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(invalid("expected 10 hex digits"));
        }

        let mut raw = [0u8; ADDRESS_LEN];
        for (slot, pair) in raw.iter_mut().zip(digits.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| invalid("non-ascii input"))?;
            *slot = u8::from_str_radix(pair, 16).map_err(|_| invalid("invalid hex digit"))?;
        }
        Ok(Self(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_colon_separated_hex() {
        let addr = Address::new([0xE7, 0xD3, 0xF0, 0x35, 0x01]);
        assert_eq!(addr.to_string(), "E7:D3:F0:35:01");
    }

    #[test]
    fn parse_accepts_both_forms() {
        let colon: Address = "e7:d3:f0:35:01".parse().unwrap();
        let bare: Address = "E7D3F03501".parse().unwrap();
        assert_eq!(colon, bare);
        assert_eq!(colon.as_bytes(), &[0xE7, 0xD3, 0xF0, 0x35, 0x01]);
    }

    #[test]
    fn parse_rejects_wrong_length_and_bad_digits() {
        assert!(matches!(
            "E7:D3".parse::<Address>(),
            Err(RadioError::InvalidAddress { .. })
        ));
        assert!(matches!(
            "ZZ:D3:F0:35:01".parse::<Address>(),
            Err(RadioError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn try_from_slice_requires_five_bytes() {
        assert!(Address::try_from(&[1u8, 2, 3, 4, 5][..]).is_ok());
        assert!(Address::try_from(&[1u8, 2, 3][..]).is_err());
    }
}
