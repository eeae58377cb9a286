/*!
The `vpot` module models the V-Pot rotary encoders and their LED rings. Each ring has eleven
LEDs plus one "lower" LED beneath the knob. A display instruction is one byte: the low nibble
is an LED index (1 to 11, zero meaning all off), bits 4-5 select how the index is rendered,
and bit 6 lights the lower LED.
!*/

use crate::core::U4;

/// Identifies one of the thirteen V-Pots.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum VPotId {
    /// The eight channel-strip pots, index 0 to 7.
    Channel(U4),
    /// The four parameter-edit pots, index 0 to 3.
    ParamEdit(U4),
    /// The scroll/jog encoder. Input only: it has no LED ring.
    Scroll,
}

impl VPotId {
    /// The wire index, `0x0..=0xC`.
    pub fn raw(&self) -> u8 {
        match self {
            VPotId::Channel(index) => index.get(),
            VPotId::ParamEdit(index) => 0x08 + index.get(),
            VPotId::Scroll => 0x0c,
        }
    }

    /// Resolve a wire index.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00..=0x07 => Some(VPotId::Channel(U4::new(raw))),
            0x08..=0x0b => Some(VPotId::ParamEdit(U4::new(raw - 0x08))),
            0x0c => Some(VPotId::Scroll),
            _ => None,
        }
    }

    /// Whether this pot has an LED ring to display on.
    pub fn has_leds(&self) -> bool {
        !matches!(self, VPotId::Scroll)
    }
}

/// An LED index on the ring, 1 to 11. Unit-interval constructors quantise monotonically onto
/// the eleven positions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LedPosition(u8);

impl LedPosition {
    pub const CENTER: LedPosition = LedPosition(6);

    /// Clamps into `1..=11`.
    pub const fn new(index: u8) -> Self {
        if index == 0 {
            Self(1)
        } else if index > 11 {
            Self(11)
        } else {
            Self(index)
        }
    }

    /// Quantise a `[0.0, 1.0]` position onto the ring: 0.0 is LED 1, 0.5 the center LED, 1.0
    /// LED 11.
    pub fn from_unit(unit: f64) -> Self {
        let unit = if unit.is_nan() {
            0.0
        } else {
            unit.max(0.0).min(1.0)
        };
        Self::new(1 + (unit * 10.0).round() as u8)
    }

    pub const fn get(&self) -> u8 {
        self.0
    }

    /// The position back on the unit interval.
    pub fn unit(&self) -> f64 {
        (self.0 - 1) as f64 / 10.0
    }
}

/// How the LED index is rendered on the ring.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VPotRing {
    /// Every ring LED dark.
    AllOff,
    /// A single LED at the position.
    Single(LedPosition),
    /// LEDs lit from the center out to the position, like a pan spread.
    CenterAnchor(LedPosition),
    /// LEDs lit from the left end up to the position, like a level bar.
    LeftAnchor(LedPosition),
    /// LEDs lit symmetrically around the center with the position as the radius.
    CenterRadius(LedPosition),
}

/// One complete display instruction for a ring.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct VPotDisplay {
    pub ring: VPotRing,
    pub lower_led: bool,
}

const MODE_SINGLE: u8 = 0x00;
const MODE_CENTER_ANCHOR: u8 = 0x10;
const MODE_LEFT_ANCHOR: u8 = 0x20;
const MODE_CENTER_RADIUS: u8 = 0x30;
const LOWER_LED_BIT: u8 = 0x40;

impl VPotDisplay {
    pub fn all_off() -> Self {
        Self {
            ring: VPotRing::AllOff,
            lower_led: false,
        }
    }

    /// A single LED at a unit-interval position.
    pub fn single(unit: f64) -> Self {
        Self {
            ring: VPotRing::Single(LedPosition::from_unit(unit)),
            lower_led: false,
        }
    }

    /// The wire byte for this display.
    pub fn encode(&self) -> u8 {
        let (mode, index) = match self.ring {
            VPotRing::AllOff => (MODE_SINGLE, 0),
            VPotRing::Single(position) => (MODE_SINGLE, position.get()),
            VPotRing::CenterAnchor(position) => (MODE_CENTER_ANCHOR, position.get()),
            VPotRing::LeftAnchor(position) => (MODE_LEFT_ANCHOR, position.get()),
            VPotRing::CenterRadius(position) => (MODE_CENTER_RADIUS, position.get()),
        };
        let lower = if self.lower_led { LOWER_LED_BIT } else { 0 };
        lower | mode | index
    }

    /// Decode a wire byte. Total: out-of-range indices clamp onto the ring.
    pub fn decode(byte: u8) -> Self {
        let lower_led = byte & LOWER_LED_BIT != 0;
        let index = byte & 0x0f;
        let ring = if index == 0 {
            VPotRing::AllOff
        } else {
            let position = LedPosition::new(index);
            match byte & 0x30 {
                MODE_SINGLE => VPotRing::Single(position),
                MODE_CENTER_ANCHOR => VPotRing::CenterAnchor(position),
                MODE_LEFT_ANCHOR => VPotRing::LeftAnchor(position),
                _ => VPotRing::CenterRadius(position),
            }
        };
        Self { ring, lower_led }
    }

    /// Which of the eleven ring LEDs are lit, LED 1 first. The ROM renders the modes this
    /// way; it is also handy for tests and for emulating a surface.
    pub fn led_pattern(&self) -> [bool; 11] {
        let mut leds = [false; 11];
        match self.ring {
            VPotRing::AllOff => {}
            VPotRing::Single(position) => leds[(position.get() - 1) as usize] = true,
            VPotRing::CenterAnchor(position) => {
                let center = LedPosition::CENTER.get();
                let target = position.get();
                let (low, high) = if target <= center {
                    (target, center)
                } else {
                    (center, target)
                };
                for ix in low..=high {
                    leds[(ix - 1) as usize] = true;
                }
            }
            VPotRing::LeftAnchor(position) => {
                for ix in 1..=position.get() {
                    leds[(ix - 1) as usize] = true;
                }
            }
            VPotRing::CenterRadius(position) => {
                let center = LedPosition::CENTER.get() as i16;
                let radius = ((position.get() as i16 - 1) / 2).max(0);
                for ix in (center - radius).max(1)..=(center + radius).min(11) {
                    leds[(ix - 1) as usize] = true;
                }
            }
        }
        leds
    }
}

/// A rotation report from a pot: a signed click count, at most 63 clicks per message.
pub fn encode_delta(delta: i8) -> u8 {
    if delta >= 0 {
        (delta as u8).min(0x3f)
    } else {
        0x40 | ((-(delta as i16)) as u8).min(0x3f)
    }
}

/// Decode a sign/magnitude rotation byte.
pub fn decode_delta(byte: u8) -> i8 {
    let magnitude = (byte & 0x3f) as i8;
    if byte & 0x40 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_quantisation_is_monotonic() {
        let mut last = 0;
        for step in 0..=100 {
            let unit = step as f64 / 100.0;
            let index = LedPosition::from_unit(unit).get();
            assert!(index >= last);
            last = index;
        }
        assert_eq!(1, LedPosition::from_unit(0.0).get());
        assert_eq!(6, LedPosition::from_unit(0.5).get());
        assert_eq!(11, LedPosition::from_unit(1.0).get());
    }

    #[test]
    fn display_byte_round_trip() {
        let samples = [
            VPotDisplay::all_off(),
            VPotDisplay::single(0.5),
            VPotDisplay {
                ring: VPotRing::LeftAnchor(LedPosition::new(11)),
                lower_led: true,
            },
            VPotDisplay {
                ring: VPotRing::CenterRadius(LedPosition::new(5)),
                lower_led: false,
            },
        ];
        for display in samples {
            assert_eq!(display, VPotDisplay::decode(display.encode()));
        }
    }

    #[test]
    fn single_half_lights_the_center() {
        let display = VPotDisplay::single(0.5);
        let leds = display.led_pattern();
        assert!(leds[5]);
        assert_eq!(1, leds.iter().filter(|lit| **lit).count());
    }

    #[test]
    fn delta_round_trip() {
        for delta in [-63i8, -10, -1, 0, 1, 5, 63] {
            assert_eq!(delta, decode_delta(encode_delta(delta)));
        }
    }

    #[test]
    fn pot_ids() {
        assert_eq!(0x00, VPotId::Channel(U4::new(0)).raw());
        assert_eq!(0x0b, VPotId::ParamEdit(U4::new(3)).raw());
        assert_eq!(Some(VPotId::Scroll), VPotId::from_raw(0x0c));
        assert_eq!(None, VPotId::from_raw(0x0d));
        assert!(!VPotId::Scroll.has_leds());
    }
}
