use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::scribe::Scribe;
use crate::Error;
use snafu::{ensure, ResultExt};
use std::convert::TryFrom;
use std::io::{Read, Write};

use super::meta_event::{LEN_META_TIME_SIG, META_TIME_SIG};

/// `DurationName` is used when specifying the denominator of a [`TimeSignatureValue`]. When
/// defining time signatures, the MIDI file spec says:
/// ```text
/// The denominator is a negative power of two: 2 represents a quarter-note, 3 represents an
/// eighth-note, etc.
/// ```
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum DurationName {
    /// Whole Note / Semibreve
    Whole = 0,

    /// Half Note / Minim
    Half = 1,

    /// Quarter Note / Crotchet
    Quarter = 2,

    /// Eighth Note / Quaver
    Eighth = 3,

    /// Sixteenth note / Semiquaver
    Sixteenth = 4,

    /// Thirty-Second Note / Demisemiquaver
    D32 = 5,

    /// Sixty-Fourth Note / Hemidemisemiquaver
    D64 = 6,

    /// One-Twenty-Eighth Note / Semihemidemisemiquaver
    D128 = 7,

    /// Two-Fifty-Sixth Note / Demisemihemidemisemiquaver
    D256 = 8,

    /// Five-Twelfth Note
    D512 = 9,

    /// One Thousand, Twenty-Fourth Note
    D1024 = 10,
}

impl Default for DurationName {
    fn default() -> Self {
        DurationName::Quarter
    }
}

impl DurationName {
    pub(crate) fn from_u8(v: u8) -> LibResult<Self> {
        match v {
            0 => Ok(DurationName::Whole),
            1 => Ok(DurationName::Half),
            2 => Ok(DurationName::Quarter),
            3 => Ok(DurationName::Eighth),
            4 => Ok(DurationName::Sixteenth),
            5 => Ok(DurationName::D32),
            6 => Ok(DurationName::D64),
            7 => Ok(DurationName::D128),
            8 => Ok(DurationName::D256),
            9 => Ok(DurationName::D512),
            10 => Ok(DurationName::D1024),
            _ => malformed!(0u64, "bad time signature denominator power {}", v),
        }
    }
}

impl TryFrom<u8> for DurationName {
    type Error = Error;

    fn try_from(value: u8) -> crate::Result<Self> {
        Ok(Self::from_u8(value)?)
    }
}

/// There are 24 MIDI Clocks in every quarter note. (12 MIDI Clocks in an eighth note, 6 MIDI
/// Clocks in a 16th, etc). One use of this enum is in the [`TimeSignatureValue`], where we can
/// specify the frequency of the metronome click.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Clocks {
    DottedWhole,
    Whole,
    DottedHalf,
    Half,
    DottedQuarter,
    Quarter,
    DottedEighth,
    Eighth,
    DottedSixteenth,
    Sixteenth,
    Other(u8),
}

impl Default for Clocks {
    fn default() -> Self {
        Clocks::Quarter
    }
}

impl Clocks {
    pub(crate) fn from_u8(v: u8) -> Clocks {
        match v {
            142 => Clocks::DottedWhole,
            96 => Clocks::Whole,
            72 => Clocks::DottedHalf,
            48 => Clocks::Half,
            32 => Clocks::DottedQuarter,
            24 => Clocks::Quarter,
            18 => Clocks::DottedEighth,
            12 => Clocks::Eighth,
            9 => Clocks::DottedSixteenth,
            6 => Clocks::Sixteenth,
            _ => Clocks::Other(v),
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Clocks::DottedWhole => 142,
            Clocks::Whole => 96,
            Clocks::DottedHalf => 72,
            Clocks::Half => 48,
            Clocks::DottedQuarter => 32,
            Clocks::Quarter => 24,
            Clocks::DottedEighth => 18,
            Clocks::Eighth => 12,
            Clocks::DottedSixteenth => 9,
            Clocks::Sixteenth => 6,
            Clocks::Other(v) => v,
        }
    }

    pub fn new(clocks: u8) -> Self {
        Self::from_u8(clocks)
    }
}

/// `FF 58 04 nn dd cc bb`: The time signature is expressed as four numbers. `nn` and `dd`
/// represent the numerator and denominator of the time signature as it would be notated. The
/// denominator is a negative power of two: 2 represents a quarter-note, 3 represents an
/// eighth-note, etc. The `cc` parameter expresses the number of MIDI clocks in a metronome
/// click. The `bb` parameter expresses the number of notated 32nd-notes in what MIDI thinks of
/// as a quarter-note (24 MIDI Clocks).
///
/// The complete event for 6/8 time, where the metronome clicks every three eighth-notes, but
/// there are 24 clocks per quarter-note, 72 to the bar, would be (in hex): `FF 58 04 06 03 24
/// 08`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TimeSignatureValue {
    /// The upper part of a time signature. For example, in 6/8, the `numerator` is 6.
    numerator: u8,

    /// The lower part of a time signature. For example, in 6/8, the `denominator` is
    /// [`DurationName::Eighth`].
    denominator: DurationName,

    /// The number of MIDI clocks in a metronome click, i.e. on which beats of the bar a
    /// metronome should click. Unrelated to tempo.
    click: Clocks,

    /// The number of 32nd notes per quarter. This should normally be 8.
    tpq: u8,
}

impl Default for TimeSignatureValue {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: DurationName::default(),
            click: Clocks::default(),
            tpq: 8,
        }
    }
}

impl TimeSignatureValue {
    pub fn new(numerator: u8, denominator: DurationName, click: Clocks) -> crate::Result<Self> {
        ensure!(
            numerator > 0,
            error::OutOfRange {
                field: "time signature numerator",
                value: 0u64,
                max: u8::MAX as u64,
            }
        );
        Ok(Self {
            numerator,
            denominator,
            click,
            ..Self::default()
        })
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator(&self) -> DurationName {
        self.denominator
    }

    pub fn click(&self) -> Clocks {
        self.click
    }

    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_expect(LEN_META_TIME_SIG).context(io!())?;
        Ok(Self {
            numerator: iter.read_or_die().context(io!())?,
            denominator: DurationName::from_u8(iter.read_or_die().context(io!())?)?,
            click: Clocks::from_u8(iter.read_or_die().context(io!())?),
            tpq: iter.read_or_die().context(io!())?,
        })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_u8!(w, META_TIME_SIG)?;
        write_u8!(w, LEN_META_TIME_SIG)?;
        write_u8!(w, self.numerator)?;
        write_u8!(w, self.denominator as u8)?;
        write_u8!(w, self.click.to_u8())?;
        write_u8!(w, self.tpq)?;
        Ok(())
    }
}
