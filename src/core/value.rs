/*!
The `value` module provides payload values that remember the protocol width they were captured
at. A value decoded from a MIDI 1.0 stream holds its original 7- or 14-bit number; a value
decoded from a MIDI 2.0 packet holds its 16- or 32-bit number. Converting to the other width
uses the Min-Center-Max bit scaling from [`crate::core::numbers`], so a value can always be
rendered for either protocol while equality remains exact on the native representation.
!*/

use crate::core::numbers::{scale_down, scale_up};
use crate::core::{U14, U16, U32, U7};

/// A note velocity: 7 bits in MIDI 1.0, 16 bits in MIDI 2.0.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Velocity {
    Midi1(U7),
    Midi2(U16),
}

impl Velocity {
    pub fn midi1(&self) -> U7 {
        match self {
            Velocity::Midi1(v) => *v,
            Velocity::Midi2(v) => U7::new(scale_down(v.as_u32(), 16, 7) as u8),
        }
    }

    pub fn midi2(&self) -> U16 {
        match self {
            Velocity::Midi1(v) => U16::new(scale_up(v.as_u32(), 7, 16) as u16),
            Velocity::Midi2(v) => *v,
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity::Midi1(U7::new(64))
    }
}

/// A channel-wide payload value: 7 bits in MIDI 1.0, 32 bits in MIDI 2.0. Used for control
/// change values and channel/key pressure amounts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ChanValue {
    Midi1(U7),
    Midi2(U32),
}

impl ChanValue {
    pub fn midi1(&self) -> U7 {
        match self {
            ChanValue::Midi1(v) => *v,
            ChanValue::Midi2(v) => U7::new(scale_down(v.get(), 32, 7) as u8),
        }
    }

    pub fn midi2(&self) -> U32 {
        match self {
            ChanValue::Midi1(v) => U32::new(scale_up(v.as_u32(), 7, 32)),
            ChanValue::Midi2(v) => *v,
        }
    }
}

impl Default for ChanValue {
    fn default() -> Self {
        ChanValue::Midi1(U7::new(0))
    }
}

/// A pitch bend value: 14 bits in MIDI 1.0, 32 bits in MIDI 2.0. The center of the range is
/// "no bend" in both protocols.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BendValue {
    Midi1(U14),
    Midi2(U32),
}

impl BendValue {
    pub fn midi1(&self) -> U14 {
        match self {
            BendValue::Midi1(v) => *v,
            BendValue::Midi2(v) => U14::new(scale_down(v.get(), 32, 14) as u16),
        }
    }

    pub fn midi2(&self) -> U32 {
        match self {
            BendValue::Midi1(v) => U32::new(scale_up(v.as_u32(), 14, 32)),
            BendValue::Midi2(v) => *v,
        }
    }

    /// The centered, "no bend" value in the native width.
    pub fn center_midi1() -> Self {
        BendValue::Midi1(U14::CENTER)
    }
}

impl Default for BendValue {
    fn default() -> Self {
        Self::center_midi1()
    }
}

/// A registered or non-registered parameter data value: 14 bits when assembled from a MIDI 1.0
/// data-entry transaction, 32 bits in a MIDI 2.0 controller message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ParamValue {
    Midi1(U14),
    Midi2(U32),
}

impl ParamValue {
    pub fn midi1(&self) -> U14 {
        match self {
            ParamValue::Midi1(v) => *v,
            ParamValue::Midi2(v) => U14::new(scale_down(v.get(), 32, 14) as u16),
        }
    }

    pub fn midi2(&self) -> U32 {
        match self {
            ParamValue::Midi1(v) => U32::new(scale_up(v.as_u32(), 14, 32)),
            ParamValue::Midi2(v) => *v,
        }
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::Midi1(U14::new(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_widths() {
        let v = Velocity::Midi1(U7::new(0x40));
        assert_eq!(0x8000, v.midi2().get());
        let v = Velocity::Midi2(U16::new(0xc000));
        assert_eq!(0x60, v.midi1().get());
        // native representation is returned unchanged
        assert_eq!(0xc000, v.midi2().get());
    }

    #[test]
    fn bend_center() {
        let b = BendValue::center_midi1();
        assert_eq!(0x2000, b.midi1().get());
        assert_eq!(0x8000_0000, b.midi2().get());
    }

    #[test]
    fn native_equality_distinguishes_protocols() {
        // a scaled value is not structurally equal to its native counterpart
        assert_ne!(
            ChanValue::Midi1(U7::new(0x7f)),
            ChanValue::Midi2(U32::new(0xffff_ffff))
        );
    }
}
