use core::fmt;
use core::str::FromStr;

/// A 48-bit Bluetooth device address, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; 6]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Length,
    Separator,
    Digit,
}

impl MacAddress {
    /// Builds an address from the little-endian byte order used on the HCI wire.
    pub fn from_le_bytes(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "AA:BB:CC:DD:EE:FF"
        if s.len() != 17 {
            return Err(ParseError::Length);
        }
        let bytes = s.as_bytes();
        let separator = bytes[2];
        if separator != b':' && separator != b'-' {
            return Err(ParseError::Separator);
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let start = i * 3;
            if i > 0 && bytes[start - 1] != separator {
                return Err(ParseError::Separator);
            }
            let hi = hex_value(bytes[start]).ok_or(ParseError::Digit)?;
            let lo = hex_value(bytes[start + 1]).ok_or(ParseError::Digit)?;
            *octet = hi << 4 | lo;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
