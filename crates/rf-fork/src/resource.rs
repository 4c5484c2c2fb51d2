//! Resource type codes, map entries and materialized payloads.

use core::fmt;

use crate::mac_roman::{decode_mac_roman, encode_mac_roman};

/// A four-byte resource type code such as `snd ` or `Tune`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResType(pub [u8; 4]);

impl ResType {
    pub const SND: ResType = ResType(*b"snd ");
    pub const YSND: ResType = ResType(*b"Ysnd");
    pub const TUNE: ResType = ResType(*b"Tune");

    /// Parse a type code written as Unicode text, e.g. `"wëap"`.
    pub fn parse(code: &str) -> Option<ResType> {
        let bytes = encode_mac_roman(code)?;
        let arr: [u8; 4] = bytes.try_into().ok()?;
        Some(ResType(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for ResType {
    fn from(code: [u8; 4]) -> Self {
        ResType(code)
    }
}

impl fmt::Display for ResType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&decode_mac_roman(&self.0))
    }
}

impl fmt::Debug for ResType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResType({:?})", decode_mac_roman(&self.0))
    }
}

/// One resource in the map. Holds the location of the payload, not the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceEntry {
    pub res_type: ResType,
    pub id: i16,
    /// `None` when the entry's name offset is the 0xFFFF sentinel.
    pub name: Option<String>,
    /// Absolute offset of the first payload byte (past the length prefix).
    pub data_offset: u64,
    pub data_length: u32,
}

impl ResourceEntry {
    /// Name or an empty string for unnamed resources.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A resource entry together with its payload bytes.
#[derive(Clone, Debug)]
pub struct Resource {
    pub entry: ResourceEntry,
    pub data: Vec<u8>,
}

impl Resource {
    /// Lowercase two-digit hex bytes separated by single spaces.
    pub fn to_hex_string(&self) -> String {
        self.data
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decimal byte values separated by single spaces.
    pub fn to_decimal_string(&self) -> String {
        self.data
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Payload as big-endian 16-bit words. A trailing odd byte is dropped.
    pub fn words(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(data: &[u8]) -> Resource {
        Resource {
            entry: ResourceEntry {
                res_type: ResType::SND,
                id: 1,
                name: None,
                data_offset: 0,
                data_length: data.len() as u32,
            },
            data: data.to_vec(),
        }
    }

    #[test]
    fn parse_round_trips_display() {
        let t = ResType::parse("wëap").unwrap();
        assert_eq!(t.0, [b'w', 0x91, b'a', b'p']);
        assert_eq!(t.to_string(), "wëap");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(ResType::parse("snd"), None);
        assert_eq!(ResType::parse("sound"), None);
    }

    #[test]
    fn hex_and_decimal_strings() {
        let r = resource(&[0xFF, 0x00, 0x1E]);
        assert_eq!(r.to_hex_string(), "ff 00 1e");
        assert_eq!(r.to_decimal_string(), "255 0 30");
    }

    #[test]
    fn words_are_big_endian() {
        let r = resource(&[0x00, 0x7B, 0xFF, 0xFF, 0x01]);
        assert_eq!(r.words(), vec![0x007B, 0xFFFF]);
    }

    #[test]
    fn unnamed_display_name_is_empty() {
        assert_eq!(resource(&[]).entry.display_name(), "");
    }
}
