use crate::error::LibResult;
use crate::scribe::Scribe;
use crate::Error;
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::Write;

/// The allowable values for [`Division`] when using the quarter note method. It is a positive
/// 15-bit number and thus has the range 1 to 32,767. The default value is 1024.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct QuarterNoteDivision(u16);

impl QuarterNoteDivision {
    pub const MAX: Self = Self(0x7fff);

    /// Silently clamps out-of-range values into `1..=32767`.
    pub const fn new(value: u16) -> Self {
        if value == 0 {
            Self(1)
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    pub const fn get(&self) -> u16 {
        self.0
    }
}

impl Default for QuarterNoteDivision {
    fn default() -> Self {
        Self(1024)
    }
}

impl std::fmt::Display for QuarterNoteDivision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Specifies the meaning of the delta-times. It has two formats, one for metrical time, and
/// one for time-code-based time:
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Division {
    /// If bit 15 of `<division>` is a zero, the bits 14 thru 0 represent the number of
    /// delta-time "ticks" which make up a quarter-note. For instance, if `<division>` is 96,
    /// then a time interval of an eighth-note between two events in the file would be 48.
    QuarterNote(QuarterNoteDivision),
    /// Frame rate and resolution within the frame.
    Smpte(SmpteRate),
}

impl Default for Division {
    fn default() -> Self {
        Division::QuarterNote(QuarterNoteDivision::default())
    }
}

const DIVISION_TYPE_BIT: u16 = 0b1000_0000_0000_0000;

impl Division {
    pub(crate) fn from_u16(value: u16, offset: u64) -> LibResult<Self> {
        if value & DIVISION_TYPE_BIT == DIVISION_TYPE_BIT {
            let fps_byte = (value >> 8) as u8 as i8;
            let frame_rate = FrameRate::from_i8(fps_byte, offset)?;
            Ok(Division::Smpte(SmpteRate {
                frame_rate,
                resolution: (value & 0xff) as u8,
            }))
        } else {
            Ok(Division::QuarterNote(QuarterNoteDivision::new(value)))
        }
    }

    pub(crate) fn to_u16(self) -> u16 {
        match self {
            Division::QuarterNote(q) => q.get(),
            Division::Smpte(s) => {
                ((s.frame_rate.to_i8() as u8 as u16) << 8) | s.resolution as u16
            }
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        w.write_all(&self.to_u16().to_be_bytes()).context(wr!())?;
        Ok(())
    }
}

impl TryFrom<u16> for Division {
    type Error = Error;

    fn try_from(value: u16) -> crate::Result<Self> {
        Ok(Division::from_u16(value, 0)?)
    }
}

/// `<division>` Bits 14 thru 8 contain one of the four values -24, -25, -29, or -30,
/// corresponding to the four standard SMPTE and MIDI time code formats (-29 corresponds to 30
/// drop frame), and represents the number of frames per second. These negative numbers are
/// stored in two's complement form.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum FrameRate {
    /// 24 frames per second
    N24,
    /// 25 frames per second
    N25,
    /// 30 drop
    N29,
    /// 30 frames per second
    N30,
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::N24
    }
}

impl FrameRate {
    pub(crate) fn from_i8(value: i8, offset: u64) -> LibResult<Self> {
        match value {
            -24 => Ok(FrameRate::N24),
            -25 => Ok(FrameRate::N25),
            -29 => Ok(FrameRate::N29),
            -30 => Ok(FrameRate::N30),
            _ => malformed!(offset, "bad smpte frame rate byte {}", value),
        }
    }

    pub(crate) fn to_i8(self) -> i8 {
        match self {
            FrameRate::N24 => -24,
            FrameRate::N25 => -25,
            FrameRate::N29 => -29,
            FrameRate::N30 => -30,
        }
    }
}

/// A SMPTE division: frame rate plus sub-frame resolution.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteRate {
    /// The number of frames per second.
    pub frame_rate: FrameRate,
    /// The `<division>` second byte (stored positive) is the resolution within a frame:
    /// typical values may be 4 (MIDI time code resolution), 8, 10, 80 (bit resolution), or
    /// 100. This system allows exact specification of time-code-based tracks, but also allows
    /// millisecond-based tracks by specifying 25 frames/sec and a resolution of 40 units per
    /// frame.
    pub resolution: u8,
}

impl Default for SmpteRate {
    fn default() -> Self {
        // This is the 'millisecond-based tracks' example given by the spec.
        SmpteRate {
            frame_rate: FrameRate::N25,
            resolution: 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_note_round_trip() {
        let d = Division::from_u16(480, 0).unwrap();
        assert_eq!(Division::QuarterNote(QuarterNoteDivision::new(480)), d);
        assert_eq!(480, d.to_u16());
    }

    #[test]
    fn smpte_round_trip() {
        // 25 fps, 40 ticks per frame: 0xE728
        let value = 0xe728u16;
        let d = Division::from_u16(value, 0).unwrap();
        assert_eq!(
            Division::Smpte(SmpteRate {
                frame_rate: FrameRate::N25,
                resolution: 0x28,
            }),
            d
        );
        assert_eq!(value, d.to_u16());
    }

    #[test]
    fn bad_smpte_rate() {
        assert!(Division::from_u16(0x8000 | (0xfeu16 << 8), 0).is_err());
    }
}
