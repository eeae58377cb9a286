/*!
The `controller` module names all 128 control change numbers from the MIDI specification's
controller table, including the channel-mode controls at 120 to 127. Every `u8` in `0..=127`
maps to exactly one case, so converting to and from the wire byte is total and lossless.
!*/

use crate::core::U7;
use crate::error::LibResult;

/// A control change number. Controllers 0 to 31 are the MSB of a potentially 14-bit value
/// whose LSB arrives on the corresponding controller 32 to 63. Controllers 120 to 127 are the
/// channel-mode messages, which share the `0xB` status with ordinary control changes and are
/// distinguished only by this number.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Controller {
    BankSelect = 0,
    ModWheel = 1,
    BreathController = 2,
    Undefined3 = 3,
    FootController = 4,
    PortamentoTime = 5,
    DataEntry = 6,
    ChannelVolume = 7,
    Balance = 8,
    Undefined9 = 9,
    Pan = 10,
    Expression = 11,
    EffectControl1 = 12,
    EffectControl2 = 13,
    Undefined14 = 14,
    Undefined15 = 15,
    GeneralPurpose1 = 16,
    GeneralPurpose2 = 17,
    GeneralPurpose3 = 18,
    GeneralPurpose4 = 19,
    Undefined20 = 20,
    Undefined21 = 21,
    Undefined22 = 22,
    Undefined23 = 23,
    Undefined24 = 24,
    Undefined25 = 25,
    Undefined26 = 26,
    Undefined27 = 27,
    Undefined28 = 28,
    Undefined29 = 29,
    Undefined30 = 30,
    Undefined31 = 31,

    // These carry the "LSB" for controllers 0-31. When a 0-31 value is wider than one byte,
    // two messages are sent, one with the MSB and one with the LSB.
    BankSelectLsb = 32,
    ModWheelLsb = 33,
    BreathControllerLsb = 34,
    Undefined3Lsb = 35,
    FootControllerLsb = 36,
    PortamentoTimeLsb = 37,
    DataEntryLsb = 38,
    ChannelVolumeLsb = 39,
    BalanceLsb = 40,
    Undefined9Lsb = 41,
    PanLsb = 42,
    ExpressionLsb = 43,
    EffectControl1Lsb = 44,
    EffectControl2Lsb = 45,
    Undefined14Lsb = 46,
    Undefined15Lsb = 47,
    GeneralPurpose1Lsb = 48,
    GeneralPurpose2Lsb = 49,
    GeneralPurpose3Lsb = 50,
    GeneralPurpose4Lsb = 51,
    Undefined20Lsb = 52,
    Undefined21Lsb = 53,
    Undefined22Lsb = 54,
    Undefined23Lsb = 55,
    Undefined24Lsb = 56,
    Undefined25Lsb = 57,
    Undefined26Lsb = 58,
    Undefined27Lsb = 59,
    Undefined28Lsb = 60,
    Undefined29Lsb = 61,
    Undefined30Lsb = 62,
    Undefined31Lsb = 63,

    DamperPedal = 64,
    PortamentoOnOff = 65,
    Sostenuto = 66,
    SoftPedal = 67,
    LegatoFootswitch = 68,
    Hold2 = 69,
    SoundVariation = 70,
    HarmonicIntensity = 71,
    ReleaseTime = 72,
    AttackTime = 73,
    Brightness = 74,
    SoundControllers6 = 75,
    SoundControllers7 = 76,
    SoundControllers8 = 77,
    SoundControllers9 = 78,
    SoundControllers10 = 79,
    GeneralPurpose5 = 80,
    GeneralPurpose6 = 81,
    GeneralPurpose7 = 82,
    GeneralPurpose8 = 83,
    PortamentoControl = 84,
    Undefined85 = 85,
    Undefined86 = 86,
    Undefined87 = 87,
    Undefined88 = 88,
    Undefined89 = 89,
    Undefined90 = 90,
    Effects1Depth = 91,
    Effects2Depth = 92,
    Effects3Depth = 93,
    Effects4Depth = 94,
    Effects5Depth = 95,
    DataIncrement = 96,
    DataDecrement = 97,
    NonRegisteredParameterLsb = 98,
    NonRegisteredParameterMsb = 99,
    RegisteredParameterLsb = 100,
    RegisteredParameterMsb = 101,
    Undefined102 = 102,
    Undefined103 = 103,
    Undefined104 = 104,
    Undefined105 = 105,
    Undefined106 = 106,
    Undefined107 = 107,
    Undefined108 = 108,
    Undefined109 = 109,
    Undefined110 = 110,
    Undefined111 = 111,
    Undefined112 = 112,
    Undefined113 = 113,
    Undefined114 = 114,
    Undefined115 = 115,
    Undefined116 = 116,
    Undefined117 = 117,
    Undefined118 = 118,
    Undefined119 = 119,

    // channel-mode messages
    AllSoundOff = 120,
    ResetAllControllers = 121,
    LocalControl = 122,
    AllNotesOff = 123,
    OmniModeOff = 124,
    OmniModeOn = 125,
    MonoModeOn = 126,
    PolyModeOn = 127,
}

impl Default for Controller {
    fn default() -> Self {
        Controller::BankSelect
    }
}

impl Controller {
    pub(crate) fn from_u8(value: u8) -> LibResult<Self> {
        use Controller::*;
        Ok(match value {
            0 => BankSelect,
            1 => ModWheel,
            2 => BreathController,
            3 => Undefined3,
            4 => FootController,
            5 => PortamentoTime,
            6 => DataEntry,
            7 => ChannelVolume,
            8 => Balance,
            9 => Undefined9,
            10 => Pan,
            11 => Expression,
            12 => EffectControl1,
            13 => EffectControl2,
            14 => Undefined14,
            15 => Undefined15,
            16 => GeneralPurpose1,
            17 => GeneralPurpose2,
            18 => GeneralPurpose3,
            19 => GeneralPurpose4,
            20 => Undefined20,
            21 => Undefined21,
            22 => Undefined22,
            23 => Undefined23,
            24 => Undefined24,
            25 => Undefined25,
            26 => Undefined26,
            27 => Undefined27,
            28 => Undefined28,
            29 => Undefined29,
            30 => Undefined30,
            31 => Undefined31,
            32 => BankSelectLsb,
            33 => ModWheelLsb,
            34 => BreathControllerLsb,
            35 => Undefined3Lsb,
            36 => FootControllerLsb,
            37 => PortamentoTimeLsb,
            38 => DataEntryLsb,
            39 => ChannelVolumeLsb,
            40 => BalanceLsb,
            41 => Undefined9Lsb,
            42 => PanLsb,
            43 => ExpressionLsb,
            44 => EffectControl1Lsb,
            45 => EffectControl2Lsb,
            46 => Undefined14Lsb,
            47 => Undefined15Lsb,
            48 => GeneralPurpose1Lsb,
            49 => GeneralPurpose2Lsb,
            50 => GeneralPurpose3Lsb,
            51 => GeneralPurpose4Lsb,
            52 => Undefined20Lsb,
            53 => Undefined21Lsb,
            54 => Undefined22Lsb,
            55 => Undefined23Lsb,
            56 => Undefined24Lsb,
            57 => Undefined25Lsb,
            58 => Undefined26Lsb,
            59 => Undefined27Lsb,
            60 => Undefined28Lsb,
            61 => Undefined29Lsb,
            62 => Undefined30Lsb,
            63 => Undefined31Lsb,
            64 => DamperPedal,
            65 => PortamentoOnOff,
            66 => Sostenuto,
            67 => SoftPedal,
            68 => LegatoFootswitch,
            69 => Hold2,
            70 => SoundVariation,
            71 => HarmonicIntensity,
            72 => ReleaseTime,
            73 => AttackTime,
            74 => Brightness,
            75 => SoundControllers6,
            76 => SoundControllers7,
            77 => SoundControllers8,
            78 => SoundControllers9,
            79 => SoundControllers10,
            80 => GeneralPurpose5,
            81 => GeneralPurpose6,
            82 => GeneralPurpose7,
            83 => GeneralPurpose8,
            84 => PortamentoControl,
            85 => Undefined85,
            86 => Undefined86,
            87 => Undefined87,
            88 => Undefined88,
            89 => Undefined89,
            90 => Undefined90,
            91 => Effects1Depth,
            92 => Effects2Depth,
            93 => Effects3Depth,
            94 => Effects4Depth,
            95 => Effects5Depth,
            96 => DataIncrement,
            97 => DataDecrement,
            98 => NonRegisteredParameterLsb,
            99 => NonRegisteredParameterMsb,
            100 => RegisteredParameterLsb,
            101 => RegisteredParameterMsb,
            102 => Undefined102,
            103 => Undefined103,
            104 => Undefined104,
            105 => Undefined105,
            106 => Undefined106,
            107 => Undefined107,
            108 => Undefined108,
            109 => Undefined109,
            110 => Undefined110,
            111 => Undefined111,
            112 => Undefined112,
            113 => Undefined113,
            114 => Undefined114,
            115 => Undefined115,
            116 => Undefined116,
            117 => Undefined117,
            118 => Undefined118,
            119 => Undefined119,
            120 => AllSoundOff,
            121 => ResetAllControllers,
            122 => LocalControl,
            123 => AllNotesOff,
            124 => OmniModeOff,
            125 => OmniModeOn,
            126 => MonoModeOn,
            127 => PolyModeOn,
            _ => {
                return crate::error::OutOfRange {
                    field: "Controller",
                    value: value as u64,
                    max: 127u64,
                }
                .fail()
            }
        })
    }

    /// Construct from a data byte, which is always in range.
    pub fn from_u7(value: U7) -> Self {
        // a U7 cannot be out of range for the controller table
        Self::from_u8(value.get()).unwrap_or(Controller::BankSelect)
    }

    pub fn to_u8(&self) -> u8 {
        *self as u8
    }

    pub fn to_u7(&self) -> U7 {
        U7::new(*self as u8)
    }

    /// True for controllers 120 to 127, which are channel-mode messages rather than ordinary
    /// control changes.
    pub fn is_channel_mode(&self) -> bool {
        self.to_u8() >= 120
    }

    /// For controllers 0 to 31, the controller carrying the value's LSB.
    pub fn lsb_counterpart(&self) -> Option<Controller> {
        let number = self.to_u8();
        if number < 32 {
            Some(Self::from_u7(U7::new(number + 32)))
        } else {
            None
        }
    }
}

impl std::convert::TryFrom<u8> for Controller {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(Self::from_u8(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_round_trip() {
        for number in 0..=127u8 {
            let controller = Controller::from_u8(number).unwrap();
            assert_eq!(number, controller.to_u8());
        }
        assert!(Controller::from_u8(128).is_err());
    }

    #[test]
    fn lsb_counterparts() {
        assert_eq!(
            Some(Controller::ModWheelLsb),
            Controller::ModWheel.lsb_counterpart()
        );
        assert_eq!(
            Some(Controller::BankSelectLsb),
            Controller::BankSelect.lsb_counterpart()
        );
        assert_eq!(None, Controller::DamperPedal.lsb_counterpart());
        assert_eq!(None, Controller::ModWheelLsb.lsb_counterpart());
    }

    #[test]
    fn channel_mode() {
        assert!(Controller::AllNotesOff.is_channel_mode());
        assert!(!Controller::Pan.is_channel_mode());
    }
}
