/*!
The `event` module provides the `Event` type: one tagged sum over every channel voice, system
common, system realtime, system exclusive and utility message in MIDI 1.0 and MIDI 2.0. Events
are constructed with plain struct literals or the convenience constructors on `Event`, are
immutable once built, and are the single currency that the wire codecs, the file layer, the
filters and the stream processors trade in.

Every event carries a UMP `group` (zero in plain MIDI 1.0 contexts). Payload values that exist
at different widths in the two protocols are stored as the width-remembering types from
[`crate::core::value`].
!*/

use crate::core::{
    BendValue, ChanValue, Controller, ManufacturerId, ParamValue, Velocity, U14, U16, U32, U4, U7,
};

/// Represents the data that is common, and required, for both [`Event::NoteOn`] and
/// [`Event::NoteOff`] messages.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteMessage {
    pub group: U4,
    pub channel: U4,
    pub note: U7,
    pub velocity: Velocity,
    /// The MIDI 2.0 note attribute. Always `None` on events decoded from MIDI 1.0.
    pub attribute: Option<NoteAttribute>,
}

/// The MIDI 2.0 per-note attribute carried by note on and note off messages. Attribute type
/// zero means "no attribute" and is represented as `None` on the event itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NoteAttribute {
    /// Attribute type 1.
    ManufacturerSpecific(U16),
    /// Attribute type 2.
    ProfileSpecific(U16),
    /// Attribute type 3: pitch in 7.9 fixed-point semitones.
    Pitch7_9(U16),
    /// An attribute type this library does not know; preserved for round trips.
    Unknown { index: u8, data: U16 },
}

impl NoteAttribute {
    pub(crate) fn from_raw(index: u8, data: u16) -> Option<Self> {
        let data = U16::new(data);
        match index {
            0 => None,
            1 => Some(NoteAttribute::ManufacturerSpecific(data)),
            2 => Some(NoteAttribute::ProfileSpecific(data)),
            3 => Some(NoteAttribute::Pitch7_9(data)),
            _ => Some(NoteAttribute::Unknown { index, data }),
        }
    }

    pub(crate) fn type_byte(&self) -> u8 {
        match self {
            NoteAttribute::ManufacturerSpecific(_) => 1,
            NoteAttribute::ProfileSpecific(_) => 2,
            NoteAttribute::Pitch7_9(_) => 3,
            NoteAttribute::Unknown { index, .. } => *index,
        }
    }

    pub(crate) fn data(&self) -> U16 {
        match self {
            NoteAttribute::ManufacturerSpecific(d)
            | NoteAttribute::ProfileSpecific(d)
            | NoteAttribute::Pitch7_9(d) => *d,
            NoteAttribute::Unknown { data, .. } => *data,
        }
    }
}

/// Polyphonic key pressure.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NotePressure {
    pub group: U4,
    pub channel: U4,
    pub note: U7,
    pub amount: ChanValue,
}

/// A MIDI 2.0 per-note controller (registered or assignable).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteCc {
    pub group: U4,
    pub channel: U4,
    pub note: U7,
    pub controller: PerNoteController,
    pub value: U32,
}

/// The controller index space of a per-note controller message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PerNoteController {
    Registered(U7),
    Assignable(U7),
}

/// MIDI 2.0 per-note pitch bend.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NotePitchBend {
    pub group: U4,
    pub channel: U4,
    pub note: U7,
    /// 32-bit bend, center `0x8000_0000`.
    pub value: U32,
}

/// MIDI 2.0 per-note management.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteManagement {
    pub group: U4,
    pub channel: U4,
    pub note: U7,
    /// Detach per-note controllers from previously received note(s).
    pub detach: bool,
    /// Reset (set to default) per-note controllers.
    pub reset: bool,
}

/// A control change message.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ControlChange {
    pub group: U4,
    pub channel: U4,
    pub controller: Controller,
    pub value: ChanValue,
}

/// Provides the ability to change an instrument (sound, patch, etc.) by specifying the
/// affected channel number and the new program value. The optional `bank` is the 14-bit
/// combined bank select; in MIDI 1.0 it is transmitted as CC 0/32 ahead of the program
/// change, in MIDI 2.0 it rides in the same packet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProgramChange {
    pub group: U4,
    pub channel: U4,
    pub program: U7,
    pub bank: Option<U14>,
}

/// Channel pressure (aftertouch).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChannelPressure {
    pub group: U4,
    pub channel: U4,
    pub amount: ChanValue,
}

/// Pitch bend change.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PitchBend {
    pub group: U4,
    pub channel: U4,
    pub value: BendValue,
}

/// Whether a parameter message sets the value or nudges it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ParameterChange {
    Absolute,
    Relative,
}

impl Default for ParameterChange {
    fn default() -> Self {
        ParameterChange::Absolute
    }
}

/// A registered parameter number message. In MIDI 1.0 this is the assembled form of a CC
/// 101/100/6/38 transaction; in MIDI 2.0 it is a single packet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rpn {
    pub group: U4,
    pub channel: U4,
    /// The combined 14-bit parameter number (MSB bank, LSB index).
    pub parameter: U14,
    pub value: ParamValue,
    pub change: ParameterChange,
}

/// A non-registered parameter number message; the same shape as [`Rpn`] in the assignable
/// parameter space.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Nrpn {
    pub group: U4,
    pub channel: U4,
    pub parameter: U14,
    pub value: ParamValue,
    pub change: ParameterChange,
}

/// MIDI time code quarter frame. The data byte is `0nnn dddd`: a piece index `nnn` (0 to 7)
/// and a nibble `dddd` of the timecode being transmitted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimecodeQuarterFrame {
    pub group: U4,
    pub data_byte: U7,
}

impl TimecodeQuarterFrame {
    pub fn new(group: U4, piece: u8, nibble: u8) -> Self {
        Self {
            group,
            data_byte: U7::new(((piece & 0x07) << 4) | (nibble & 0x0f)),
        }
    }

    /// Which of the eight quarter-frame pieces this is (0 to 7).
    pub fn piece(&self) -> u8 {
        self.data_byte.get() >> 4
    }

    /// The 4-bit payload nibble.
    pub fn nibble(&self) -> u8 {
        self.data_byte.get() & 0x0f
    }
}

/// Song position pointer, in MIDI beats (sixteenth notes) since the start of the song.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SongPositionPointer {
    pub group: U4,
    pub beat: U14,
}

/// Song select.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SongSelect {
    pub group: U4,
    pub number: U7,
}

/// The flavor of a universal system exclusive message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum UniversalKind {
    /// Introduced by `0x7E`.
    NonRealTime,
    /// Introduced by `0x7F`.
    RealTime,
}

/// A manufacturer system exclusive message with 7-bit payload bytes.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SysEx7 {
    pub group: U4,
    pub manufacturer: ManufacturerId,
    /// Payload bytes, each `0x00..=0x7F`, excluding the `F0`/`F7` framing and the
    /// manufacturer ID.
    pub data: Vec<u8>,
}

/// A universal system exclusive message with 7-bit payload bytes.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UniversalSysEx7 {
    pub group: U4,
    pub kind: UniversalKind,
    /// The destination device ID ("channel"), `0x7F` for "all devices".
    pub device_id: U7,
    pub sub_id1: U7,
    pub sub_id2: U7,
    pub data: Vec<u8>,
}

/// A manufacturer system exclusive message in the MIDI 2.0 8-bit form, which may carry full
/// bytes and is multiplexed by a stream ID.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SysEx8 {
    pub group: U4,
    pub stream_id: u8,
    pub manufacturer: ManufacturerId,
    pub data: Vec<u8>,
}

/// A universal system exclusive message in the 8-bit form.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UniversalSysEx8 {
    pub group: U4,
    pub stream_id: u8,
    pub kind: UniversalKind,
    pub device_id: U7,
    pub sub_id1: U7,
    pub sub_id2: U7,
    pub data: Vec<u8>,
}

/// MIDI 2.0 jitter-reduction clock or timestamp payload.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct JrTime {
    pub group: U4,
    /// Time in units of 1/31250 of a second.
    pub time: U16,
}

/// A UMP packet whose message type this library does not interpret (flex data, stream
/// messages, reserved message types, mixed data sets). The words are preserved verbatim so
/// the packet can be passed through unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UnrecognizedPacket {
    pub words: Vec<u32>,
}

impl UnrecognizedPacket {
    pub fn group(&self) -> U4 {
        U4::new(((self.words.first().copied().unwrap_or(0) >> 24) & 0x0f) as u8)
    }
}

/// Any MIDI event.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Event {
    // channel voice
    NoteOff(NoteMessage),
    NoteOn(NoteMessage),
    NotePressure(NotePressure),
    NoteCc(NoteCc),
    NotePitchBend(NotePitchBend),
    NoteManagement(NoteManagement),
    ControlChange(ControlChange),
    ProgramChange(ProgramChange),
    ChannelPressure(ChannelPressure),
    PitchBend(PitchBend),
    Rpn(Rpn),
    Nrpn(Nrpn),
    // system common
    TimecodeQuarterFrame(TimecodeQuarterFrame),
    SongPositionPointer(SongPositionPointer),
    SongSelect(SongSelect),
    TuneRequest(U4),
    // system realtime
    TimingClock(U4),
    Start(U4),
    Continue(U4),
    Stop(U4),
    ActiveSensing(U4),
    SystemReset(U4),
    // system exclusive
    SysEx7(SysEx7),
    UniversalSysEx7(UniversalSysEx7),
    SysEx8(SysEx8),
    UniversalSysEx8(UniversalSysEx8),
    // utility (MIDI 2.0 only)
    NoOp(U4),
    JrClock(JrTime),
    JrTimestamp(JrTime),
    // pass-through
    Unrecognized(UnrecognizedPacket),
}

impl Default for Event {
    fn default() -> Self {
        Event::TimingClock(U4::new(0))
    }
}

/// A fieldless mirror of the [`Event`] variants, used by the filter library and anywhere a
/// discriminant is needed without the payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventKind {
    NoteOff,
    NoteOn,
    NotePressure,
    NoteCc,
    NotePitchBend,
    NoteManagement,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    Rpn,
    Nrpn,
    TimecodeQuarterFrame,
    SongPositionPointer,
    SongSelect,
    TuneRequest,
    TimingClock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    SystemReset,
    SysEx7,
    UniversalSysEx7,
    SysEx8,
    UniversalSysEx8,
    NoOp,
    JrClock,
    JrTimestamp,
    Unrecognized,
}

impl EventKind {
    /// Every kind, in declaration order. The position of a kind in this list is its bit in a
    /// kind set.
    pub const ALL: [EventKind; 30] = [
        EventKind::NoteOff,
        EventKind::NoteOn,
        EventKind::NotePressure,
        EventKind::NoteCc,
        EventKind::NotePitchBend,
        EventKind::NoteManagement,
        EventKind::ControlChange,
        EventKind::ProgramChange,
        EventKind::ChannelPressure,
        EventKind::PitchBend,
        EventKind::Rpn,
        EventKind::Nrpn,
        EventKind::TimecodeQuarterFrame,
        EventKind::SongPositionPointer,
        EventKind::SongSelect,
        EventKind::TuneRequest,
        EventKind::TimingClock,
        EventKind::Start,
        EventKind::Continue,
        EventKind::Stop,
        EventKind::ActiveSensing,
        EventKind::SystemReset,
        EventKind::SysEx7,
        EventKind::UniversalSysEx7,
        EventKind::SysEx8,
        EventKind::UniversalSysEx8,
        EventKind::NoOp,
        EventKind::JrClock,
        EventKind::JrTimestamp,
        EventKind::Unrecognized,
    ];

    pub(crate) fn bit(&self) -> u32 {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0) as u32
    }

    /// True for the channel voice kinds.
    pub fn is_channel_voice(&self) -> bool {
        matches!(
            self,
            EventKind::NoteOff
                | EventKind::NoteOn
                | EventKind::NotePressure
                | EventKind::NoteCc
                | EventKind::NotePitchBend
                | EventKind::NoteManagement
                | EventKind::ControlChange
                | EventKind::ProgramChange
                | EventKind::ChannelPressure
                | EventKind::PitchBend
                | EventKind::Rpn
                | EventKind::Nrpn
        )
    }

    /// True for the system realtime kinds.
    pub fn is_system_realtime(&self) -> bool {
        matches!(
            self,
            EventKind::TimingClock
                | EventKind::Start
                | EventKind::Continue
                | EventKind::Stop
                | EventKind::ActiveSensing
                | EventKind::SystemReset
        )
    }
}

/// The 0, 1 or 2 data bytes that follow a MIDI 1.0 status byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DataBytes {
    Zero,
    One(u8),
    Two(u8, u8),
}

impl DataBytes {
    pub fn len(&self) -> usize {
        match self {
            DataBytes::Zero => 0,
            DataBytes::One(_) => 1,
            DataBytes::Two(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push_onto(&self, out: &mut Vec<u8>) {
        match self {
            DataBytes::Zero => {}
            DataBytes::One(a) => out.push(*a),
            DataBytes::Two(a, b) => {
                out.push(*a);
                out.push(*b);
            }
        }
    }
}

impl Event {
    /// The discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NoteOff(_) => EventKind::NoteOff,
            Event::NoteOn(_) => EventKind::NoteOn,
            Event::NotePressure(_) => EventKind::NotePressure,
            Event::NoteCc(_) => EventKind::NoteCc,
            Event::NotePitchBend(_) => EventKind::NotePitchBend,
            Event::NoteManagement(_) => EventKind::NoteManagement,
            Event::ControlChange(_) => EventKind::ControlChange,
            Event::ProgramChange(_) => EventKind::ProgramChange,
            Event::ChannelPressure(_) => EventKind::ChannelPressure,
            Event::PitchBend(_) => EventKind::PitchBend,
            Event::Rpn(_) => EventKind::Rpn,
            Event::Nrpn(_) => EventKind::Nrpn,
            Event::TimecodeQuarterFrame(_) => EventKind::TimecodeQuarterFrame,
            Event::SongPositionPointer(_) => EventKind::SongPositionPointer,
            Event::SongSelect(_) => EventKind::SongSelect,
            Event::TuneRequest(_) => EventKind::TuneRequest,
            Event::TimingClock(_) => EventKind::TimingClock,
            Event::Start(_) => EventKind::Start,
            Event::Continue(_) => EventKind::Continue,
            Event::Stop(_) => EventKind::Stop,
            Event::ActiveSensing(_) => EventKind::ActiveSensing,
            Event::SystemReset(_) => EventKind::SystemReset,
            Event::SysEx7(_) => EventKind::SysEx7,
            Event::UniversalSysEx7(_) => EventKind::UniversalSysEx7,
            Event::SysEx8(_) => EventKind::SysEx8,
            Event::UniversalSysEx8(_) => EventKind::UniversalSysEx8,
            Event::NoOp(_) => EventKind::NoOp,
            Event::JrClock(_) => EventKind::JrClock,
            Event::JrTimestamp(_) => EventKind::JrTimestamp,
            Event::Unrecognized(_) => EventKind::Unrecognized,
        }
    }

    /// The UMP group of this event. Zero for events that came from plain MIDI 1.0.
    pub fn group(&self) -> U4 {
        match self {
            Event::NoteOff(m) | Event::NoteOn(m) => m.group,
            Event::NotePressure(m) => m.group,
            Event::NoteCc(m) => m.group,
            Event::NotePitchBend(m) => m.group,
            Event::NoteManagement(m) => m.group,
            Event::ControlChange(m) => m.group,
            Event::ProgramChange(m) => m.group,
            Event::ChannelPressure(m) => m.group,
            Event::PitchBend(m) => m.group,
            Event::Rpn(m) => m.group,
            Event::Nrpn(m) => m.group,
            Event::TimecodeQuarterFrame(m) => m.group,
            Event::SongPositionPointer(m) => m.group,
            Event::SongSelect(m) => m.group,
            Event::TuneRequest(g)
            | Event::TimingClock(g)
            | Event::Start(g)
            | Event::Continue(g)
            | Event::Stop(g)
            | Event::ActiveSensing(g)
            | Event::SystemReset(g)
            | Event::NoOp(g) => *g,
            Event::SysEx7(m) => m.group,
            Event::UniversalSysEx7(m) => m.group,
            Event::SysEx8(m) => m.group,
            Event::UniversalSysEx8(m) => m.group,
            Event::JrClock(m) | Event::JrTimestamp(m) => m.group,
            Event::Unrecognized(m) => m.group(),
        }
    }

    /// The channel, for channel voice events.
    pub fn channel(&self) -> Option<U4> {
        match self {
            Event::NoteOff(m) | Event::NoteOn(m) => Some(m.channel),
            Event::NotePressure(m) => Some(m.channel),
            Event::NoteCc(m) => Some(m.channel),
            Event::NotePitchBend(m) => Some(m.channel),
            Event::NoteManagement(m) => Some(m.channel),
            Event::ControlChange(m) => Some(m.channel),
            Event::ProgramChange(m) => Some(m.channel),
            Event::ChannelPressure(m) => Some(m.channel),
            Event::PitchBend(m) => Some(m.channel),
            Event::Rpn(m) => Some(m.channel),
            Event::Nrpn(m) => Some(m.channel),
            _ => None,
        }
    }

    /// The note number, for events that address a note.
    pub fn note(&self) -> Option<U7> {
        match self {
            Event::NoteOff(m) | Event::NoteOn(m) => Some(m.note),
            Event::NotePressure(m) => Some(m.note),
            Event::NoteCc(m) => Some(m.note),
            Event::NotePitchBend(m) => Some(m.note),
            Event::NoteManagement(m) => Some(m.note),
            _ => None,
        }
    }

    /// The MIDI 1.0 status byte, where a single-message MIDI 1.0 representation exists.
    /// `Rpn`/`Nrpn` (multi-message transactions) and the MIDI 2.0-only events return `None`.
    pub fn raw_status_byte(&self) -> Option<u8> {
        match self {
            Event::NoteOff(m) => Some(0x80 | m.channel.get()),
            Event::NoteOn(m) => Some(0x90 | m.channel.get()),
            Event::NotePressure(m) => Some(0xa0 | m.channel.get()),
            Event::ControlChange(m) => Some(0xb0 | m.channel.get()),
            Event::ProgramChange(m) => Some(0xc0 | m.channel.get()),
            Event::ChannelPressure(m) => Some(0xd0 | m.channel.get()),
            Event::PitchBend(m) => Some(0xe0 | m.channel.get()),
            Event::SysEx7(_) | Event::UniversalSysEx7(_) => Some(0xf0),
            Event::TimecodeQuarterFrame(_) => Some(0xf1),
            Event::SongPositionPointer(_) => Some(0xf2),
            Event::SongSelect(_) => Some(0xf3),
            Event::TuneRequest(_) => Some(0xf6),
            Event::TimingClock(_) => Some(0xf8),
            Event::Start(_) => Some(0xfa),
            Event::Continue(_) => Some(0xfb),
            Event::Stop(_) => Some(0xfc),
            Event::ActiveSensing(_) => Some(0xfe),
            Event::SystemReset(_) => Some(0xff),
            _ => None,
        }
    }

    /// The data bytes that follow [`Event::raw_status_byte`] on a MIDI 1.0 wire. System
    /// exclusive payloads are not rendered here; the `midi1` encoder frames those.
    pub fn raw_data_bytes(&self) -> Option<DataBytes> {
        match self {
            Event::NoteOff(m) | Event::NoteOn(m) => Some(DataBytes::Two(
                m.note.get(),
                m.velocity.midi1().get(),
            )),
            Event::NotePressure(m) => {
                Some(DataBytes::Two(m.note.get(), m.amount.midi1().get()))
            }
            Event::ControlChange(m) => Some(DataBytes::Two(
                m.controller.to_u8(),
                m.value.midi1().get(),
            )),
            Event::ProgramChange(m) => Some(DataBytes::One(m.program.get())),
            Event::ChannelPressure(m) => Some(DataBytes::One(m.amount.midi1().get())),
            Event::PitchBend(m) => {
                let (msb, lsb) = m.value.midi1().into_pair();
                Some(DataBytes::Two(lsb.get(), msb.get()))
            }
            Event::TimecodeQuarterFrame(m) => Some(DataBytes::One(m.data_byte.get())),
            Event::SongPositionPointer(m) => {
                let (msb, lsb) = m.beat.into_pair();
                Some(DataBytes::Two(lsb.get(), msb.get()))
            }
            Event::SongSelect(m) => Some(DataBytes::One(m.number.get())),
            Event::TuneRequest(_)
            | Event::TimingClock(_)
            | Event::Start(_)
            | Event::Continue(_)
            | Event::Stop(_)
            | Event::ActiveSensing(_)
            | Event::SystemReset(_) => Some(DataBytes::Zero),
            _ => None,
        }
    }

    /// Encode this event as UMP words appended to `out`. A convenience for
    /// [`crate::ump::encode_ump`].
    pub fn ump_words(&self, protocol: crate::ump::Protocol, out: &mut Vec<u32>) -> crate::Result<()> {
        crate::ump::encode_ump(self, protocol, out)
    }

    // construction helpers

    pub fn note_on(group: U4, channel: U4, note: U7, velocity: Velocity) -> Self {
        Event::NoteOn(NoteMessage {
            group,
            channel,
            note,
            velocity,
            attribute: None,
        })
    }

    pub fn note_off(group: U4, channel: U4, note: U7, velocity: Velocity) -> Self {
        Event::NoteOff(NoteMessage {
            group,
            channel,
            note,
            velocity,
            attribute: None,
        })
    }

    pub fn control_change(group: U4, channel: U4, controller: Controller, value: ChanValue) -> Self {
        Event::ControlChange(ControlChange {
            group,
            channel,
            controller,
            value,
        })
    }

    pub fn program_change(group: U4, channel: U4, program: U7) -> Self {
        Event::ProgramChange(ProgramChange {
            group,
            channel,
            program,
            bank: None,
        })
    }

    pub fn pitch_bend(group: U4, channel: U4, value: BendValue) -> Self {
        Event::PitchBend(PitchBend {
            group,
            channel,
            value,
        })
    }

    pub fn channel_pressure(group: U4, channel: U4, amount: ChanValue) -> Self {
        Event::ChannelPressure(ChannelPressure {
            group,
            channel,
            amount,
        })
    }

    pub fn poly_pressure(group: U4, channel: U4, note: U7, amount: ChanValue) -> Self {
        Event::NotePressure(NotePressure {
            group,
            channel,
            note,
            amount,
        })
    }

    pub fn song_position(group: U4, beat: U14) -> Self {
        Event::SongPositionPointer(SongPositionPointer { group, beat })
    }

    pub fn song_select(group: U4, number: U7) -> Self {
        Event::SongSelect(SongSelect { group, number })
    }

    pub fn quarter_frame(group: U4, piece: u8, nibble: u8) -> Self {
        Event::TimecodeQuarterFrame(TimecodeQuarterFrame::new(group, piece, nibble))
    }

    pub fn note_cc(
        group: U4,
        channel: U4,
        note: U7,
        controller: PerNoteController,
        value: U32,
    ) -> Self {
        Event::NoteCc(NoteCc {
            group,
            channel,
            note,
            controller,
            value,
        })
    }

    pub fn note_pitch_bend(group: U4, channel: U4, note: U7, value: U32) -> Self {
        Event::NotePitchBend(NotePitchBend {
            group,
            channel,
            note,
            value,
        })
    }

    pub fn note_management(group: U4, channel: U4, note: U7, detach: bool, reset: bool) -> Self {
        Event::NoteManagement(NoteManagement {
            group,
            channel,
            note,
            detach,
            reset,
        })
    }

    /// An absolute registered parameter change.
    pub fn rpn(group: U4, channel: U4, parameter: U14, value: ParamValue) -> Self {
        Event::Rpn(Rpn {
            group,
            channel,
            parameter,
            value,
            change: ParameterChange::Absolute,
        })
    }

    /// An absolute assignable (non-registered) parameter change.
    pub fn nrpn(group: U4, channel: U4, parameter: U14, value: ParamValue) -> Self {
        Event::Nrpn(Nrpn {
            group,
            channel,
            parameter,
            value,
            change: ParameterChange::Absolute,
        })
    }

    pub fn jr_clock(group: U4, time: U16) -> Self {
        Event::JrClock(JrTime { group, time })
    }

    pub fn jr_timestamp(group: U4, time: U16) -> Self {
        Event::JrTimestamp(JrTime { group, time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::U7;

    #[test]
    fn raw_bytes_note_on() {
        let e = Event::note_on(
            U4::new(0),
            U4::new(2),
            U7::new(60),
            Velocity::Midi1(U7::new(100)),
        );
        assert_eq!(Some(0x92), e.raw_status_byte());
        assert_eq!(Some(DataBytes::Two(60, 100)), e.raw_data_bytes());
        assert_eq!(EventKind::NoteOn, e.kind());
        assert_eq!(Some(U4::new(2)), e.channel());
    }

    #[test]
    fn raw_bytes_pitch_bend_is_lsb_first() {
        let e = Event::pitch_bend(
            U4::new(0),
            U4::new(0),
            BendValue::Midi1(U14::new(0x2001)),
        );
        assert_eq!(Some(0xe0), e.raw_status_byte());
        assert_eq!(Some(DataBytes::Two(0x01, 0x40)), e.raw_data_bytes());
    }

    #[test]
    fn midi2_only_events_have_no_midi1_bytes() {
        let e = Event::Rpn(Rpn::default());
        assert_eq!(None, e.raw_status_byte());
        assert_eq!(None, e.raw_data_bytes());
        let e = Event::NoOp(U4::new(3));
        assert_eq!(None, e.raw_status_byte());
        assert_eq!(U4::new(3), e.group());
    }

    #[test]
    fn quarter_frame_pieces() {
        let qf = TimecodeQuarterFrame::new(U4::new(0), 6, 0x2);
        assert_eq!(6, qf.piece());
        assert_eq!(2, qf.nibble());
        assert_eq!(0x62, qf.data_byte.get());
    }

    #[test]
    fn kind_bits_are_unique() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(i as u32, kind.bit());
        }
    }
}
