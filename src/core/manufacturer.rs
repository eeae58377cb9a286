/*!
The `manufacturer` module provides the system-exclusive manufacturer ID. An ID is either a
single byte from `0x01` to `0x7D`, or a three-byte form beginning with `0x00`. The bytes `0x7E`
and `0x7F` are not manufacturer IDs; they introduce universal non-realtime and realtime
system-exclusive messages and are modelled separately on the event type.
!*/

use crate::core::U7;
use crate::error::LibResult;

/// `0x7E`: introduces a universal non-realtime system exclusive message.
pub(crate) const UNIVERSAL_NON_REAL_TIME: u8 = 0x7e;

/// `0x7F`: introduces a universal realtime system exclusive message.
pub(crate) const UNIVERSAL_REAL_TIME: u8 = 0x7f;

/// A manufacturer ID as assigned by the MIDI Manufacturers Association.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ManufacturerId {
    /// A one-byte ID, `0x01` to `0x7D`.
    Standard(U7),
    /// A three-byte ID: a leading `0x00` (not stored) followed by two data bytes.
    Extended { byte1: U7, byte2: U7 },
}

impl ManufacturerId {
    /// Create a one-byte ID. Zero and the universal prefixes `0x7E`/`0x7F` are rejected.
    pub fn standard(byte: u8) -> crate::Result<Self> {
        Ok(Self::standard_checked(byte)?)
    }

    pub(crate) fn standard_checked(byte: u8) -> LibResult<Self> {
        if byte == 0 || byte >= UNIVERSAL_NON_REAL_TIME {
            return crate::error::OutOfRange {
                field: "ManufacturerId",
                value: byte as u64,
                max: 0x7du64,
            }
            .fail();
        }
        Ok(ManufacturerId::Standard(U7::new(byte)))
    }

    /// Create a three-byte ID from its two data bytes (the leading `0x00` is implied).
    pub fn extended(byte1: u8, byte2: u8) -> crate::Result<Self> {
        Ok(Self::extended_checked(byte1, byte2)?)
    }

    pub(crate) fn extended_checked(byte1: u8, byte2: u8) -> LibResult<Self> {
        Ok(ManufacturerId::Extended {
            byte1: U7::checked(byte1)?,
            byte2: U7::checked(byte2)?,
        })
    }

    /// Parse an ID from the head of a system-exclusive payload, returning the ID and the
    /// number of bytes it occupied (1 or 3).
    pub(crate) fn parse(data: &[u8]) -> LibResult<(Self, usize)> {
        match data.first() {
            None => malformed!(0u64, "empty sysex payload, expected a manufacturer id"),
            Some(0x00) => {
                if data.len() < 3 {
                    malformed!(data.len(), "three-byte manufacturer id is truncated");
                }
                Ok((Self::extended_checked(data[1], data[2])?, 3))
            }
            Some(&byte) => Ok((Self::standard_checked(byte)?, 1)),
        }
    }

    /// The bytes of the ID as transmitted, including the leading `0x00` of the extended form.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ManufacturerId::Standard(b) => vec![b.get()],
            ManufacturerId::Extended { byte1, byte2 } => vec![0x00, byte1.get(), byte2.get()],
        }
    }

    /// The name of the manufacturer for a table of well-known IDs, or `None`.
    pub fn name(&self) -> Option<&'static str> {
        let key = match self {
            ManufacturerId::Standard(b) => (b.get(), 0u8, 0u8),
            ManufacturerId::Extended { byte1, byte2 } => (0, byte1.get(), byte2.get()),
        };
        WELL_KNOWN
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, name)| *name)
    }
}

/// Well-known manufacturer IDs, keyed as (one-byte id, extended byte 1, extended byte 2) with
/// zeros in the unused positions. Immutable static data.
const WELL_KNOWN: &[((u8, u8, u8), &str)] = &[
    ((0x01, 0, 0), "Sequential Circuits"),
    ((0x04, 0, 0), "Moog"),
    ((0x06, 0, 0), "Lexicon"),
    ((0x07, 0, 0), "Kurzweil"),
    ((0x0f, 0, 0), "Ensoniq"),
    ((0x10, 0, 0), "Oberheim"),
    ((0x18, 0, 0), "E-mu"),
    ((0x1a, 0, 0), "ART"),
    ((0x22, 0, 0), "Synthaxe"),
    ((0x40, 0, 0), "Kawai"),
    ((0x41, 0, 0), "Roland"),
    ((0x42, 0, 0), "Korg"),
    ((0x43, 0, 0), "Yamaha"),
    ((0x44, 0, 0), "Casio"),
    ((0x47, 0, 0), "Akai"),
    ((0x4c, 0, 0), "Fostex"),
    ((0x4e, 0, 0), "Soundtracs"),
    ((0, 0x00, 0x0e), "Alesis"),
    ((0, 0x00, 0x1b), "Peavey"),
    ((0, 0x00, 0x66), "Mackie"),
    ((0, 0x20, 0x29), "Focusrite/Novation"),
    ((0, 0x20, 0x32), "Behringer"),
    ((0, 0x20, 0x6b), "Arturia"),
    ((0, 0x21, 0x09), "Native Instruments"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn standard_validation() {
        assert!(ManufacturerId::standard(0x41).is_ok());
        assert_eq!(
            ErrorKind::OutOfRange,
            ManufacturerId::standard(0x00).unwrap_err().kind()
        );
        assert_eq!(
            ErrorKind::OutOfRange,
            ManufacturerId::standard(0x7e).unwrap_err().kind()
        );
        assert_eq!(
            ErrorKind::OutOfRange,
            ManufacturerId::standard(0x7f).unwrap_err().kind()
        );
    }

    #[test]
    fn extended_validation() {
        assert!(ManufacturerId::extended(0x00, 0x66).is_ok());
        assert!(ManufacturerId::extended(0x80, 0x00).is_err());
    }

    #[test]
    fn parse_forms() {
        let (id, used) = ManufacturerId::parse(&[0x41, 0x10]).unwrap();
        assert_eq!(ManufacturerId::standard(0x41).unwrap(), id);
        assert_eq!(1, used);

        let (id, used) = ManufacturerId::parse(&[0x00, 0x00, 0x66, 0x05]).unwrap();
        assert_eq!(ManufacturerId::extended(0x00, 0x66).unwrap(), id);
        assert_eq!(3, used);
        assert_eq!(Some("Mackie"), id.name());

        assert!(ManufacturerId::parse(&[0x00, 0x01]).is_err());
        assert!(ManufacturerId::parse(&[]).is_err());
    }

    #[test]
    fn bytes_round_trip() {
        let roland = ManufacturerId::standard(0x41).unwrap();
        assert_eq!(vec![0x41], roland.to_bytes());
        let mackie = ManufacturerId::extended(0x00, 0x66).unwrap();
        assert_eq!(vec![0x00, 0x00, 0x66], mackie.to_bytes());
    }
}
