/*!
The `midi1` module is the MIDI 1.0 byte-stream codec. The encoder renders an event as a status
byte followed by its data bytes (system exclusive is framed with `F0` ... `F7`); running
status is never emitted at this layer; the file layer may impose it explicitly. The decoder is
a
byte-at-a-time state machine: realtime bytes are accepted in any state and surface as side-band
events without disturbing the message being assembled.
!*/

use crate::core::{
    BendValue, ChanValue, ChannelPressure, ControlChange, Controller, Event, ManufacturerId,
    NoteMessage, NotePressure, ParameterChange, PitchBend, ProgramChange, StatusType, SysEx7,
    UniversalKind, UniversalSysEx7, Velocity, U14, U4, U7, UNIVERSAL_NON_REAL_TIME,
    UNIVERSAL_REAL_TIME,
};
use crate::error::LibResult;
use log::trace;

/// Settings for the MIDI 1.0 decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Midi1Settings {
    /// When true (the default), an incoming `Note On` with velocity zero is normalised to a
    /// `Note Off` with velocity zero, as the MIDI specification intends.
    pub translate_zero_velocity_note_on: bool,
    /// The maximum number of system-exclusive payload bytes buffered before the decoder gives
    /// up on the message.
    pub sysex_byte_limit: usize,
}

impl Default for Midi1Settings {
    fn default() -> Self {
        Self {
            translate_zero_velocity_note_on: true,
            sysex_byte_limit: 65_536,
        }
    }
}

/// Encode an event onto `out` as MIDI 1.0 wire bytes. Events with no MIDI 1.0 representation
/// (per-note controllers, 8-bit system exclusive, utility messages) produce an `Unsupported`
/// error. `Rpn`/`Nrpn` render as their multi-message controller transaction, and a program
/// change with a bank renders the two bank-select controllers ahead of the program change.
pub fn encode(event: &Event, out: &mut Vec<u8>) -> crate::Result<()> {
    Ok(encode_inner(event, out)?)
}

fn encode_inner(event: &Event, out: &mut Vec<u8>) -> LibResult<()> {
    match event {
        Event::SysEx7(sysex) => return encode_sysex7(sysex, out),
        Event::UniversalSysEx7(sysex) => return encode_universal_sysex7(sysex, out),
        Event::ProgramChange(pc) if pc.bank.is_some() => {
            let (msb, lsb) = pc.bank.unwrap_or_default().into_pair();
            let status = 0xb0 | pc.channel.get();
            out.extend_from_slice(&[status, Controller::BankSelect.to_u8(), msb.get()]);
            out.extend_from_slice(&[status, Controller::BankSelectLsb.to_u8(), lsb.get()]);
            out.extend_from_slice(&[0xc0 | pc.channel.get(), pc.program.get()]);
            return Ok(());
        }
        Event::Rpn(rpn) => {
            return encode_parameter(
                out,
                rpn.channel,
                rpn.parameter,
                Controller::RegisteredParameterMsb,
                Controller::RegisteredParameterLsb,
                rpn.value.midi1(),
                rpn.change,
            )
        }
        Event::Nrpn(nrpn) => {
            return encode_parameter(
                out,
                nrpn.channel,
                nrpn.parameter,
                Controller::NonRegisteredParameterMsb,
                Controller::NonRegisteredParameterLsb,
                nrpn.value.midi1(),
                nrpn.change,
            )
        }
        _ => {}
    }
    let status = match event.raw_status_byte() {
        Some(status) => status,
        None => unsupported!(format!("{:?} has no MIDI 1.0 representation", event.kind())),
    };
    out.push(status);
    if let Some(data) = event.raw_data_bytes() {
        data.push_onto(out);
    }
    Ok(())
}

fn encode_parameter(
    out: &mut Vec<u8>,
    channel: U4,
    parameter: U14,
    msb_select: Controller,
    lsb_select: Controller,
    value: U14,
    change: ParameterChange,
) -> LibResult<()> {
    let status = 0xb0 | channel.get();
    let (param_msb, param_lsb) = parameter.into_pair();
    out.extend_from_slice(&[status, msb_select.to_u8(), param_msb.get()]);
    out.extend_from_slice(&[status, lsb_select.to_u8(), param_lsb.get()]);
    match change {
        ParameterChange::Absolute => {
            let (value_msb, value_lsb) = value.into_pair();
            out.extend_from_slice(&[status, Controller::DataEntry.to_u8(), value_msb.get()]);
            out.extend_from_slice(&[status, Controller::DataEntryLsb.to_u8(), value_lsb.get()]);
        }
        ParameterChange::Relative => {
            // the direction is all that survives in MIDI 1.0; increment when the nudge is at
            // or above the center of the 14-bit range, decrement below it
            let controller = if value.get() >= U14::CENTER.get() || value.get() == 0 {
                Controller::DataIncrement
            } else {
                Controller::DataDecrement
            };
            out.extend_from_slice(&[status, controller.to_u8(), 0x00]);
        }
    }
    Ok(())
}

fn encode_sysex7(sysex: &SysEx7, out: &mut Vec<u8>) -> LibResult<()> {
    out.push(0xf0);
    out.extend_from_slice(&sysex.manufacturer.to_bytes());
    push_payload7(&sysex.data, out)?;
    out.push(0xf7);
    Ok(())
}

fn encode_universal_sysex7(sysex: &UniversalSysEx7, out: &mut Vec<u8>) -> LibResult<()> {
    out.push(0xf0);
    out.push(match sysex.kind {
        UniversalKind::NonRealTime => UNIVERSAL_NON_REAL_TIME,
        UniversalKind::RealTime => UNIVERSAL_REAL_TIME,
    });
    out.push(sysex.device_id.get());
    out.push(sysex.sub_id1.get());
    out.push(sysex.sub_id2.get());
    push_payload7(&sysex.data, out)?;
    out.push(0xf7);
    Ok(())
}

fn push_payload7(data: &[u8], out: &mut Vec<u8>) -> LibResult<()> {
    for &byte in data {
        let _ = U7::checked(byte)?;
        out.push(byte);
    }
    Ok(())
}

/// The decoder's progress through a multi-byte message.
#[derive(Clone, Debug, Eq, PartialEq)]
enum DecodeState {
    Idle,
    Data1Expected { status: u8 },
    Data2Expected { status: u8, data1: u8 },
    SysExBody { bytes: Vec<u8> },
}

/// A byte-at-a-time MIDI 1.0 decoder. Feed it bytes; complete messages come back as events.
/// Running status is not accepted at this layer: a data byte with no message in progress is an
/// error. After any error the decoder resets so that subsequent good input is decoded.
#[derive(Debug)]
pub struct Midi1Decoder {
    state: DecodeState,
    settings: Midi1Settings,
    offset: u64,
}

impl Default for Midi1Decoder {
    fn default() -> Self {
        Self::new(Midi1Settings::default())
    }
}

impl Midi1Decoder {
    pub fn new(settings: Midi1Settings) -> Self {
        Self {
            state: DecodeState::Idle,
            settings,
            offset: 0,
        }
    }

    /// The number of bytes fed so far; errors report the offset of the offending byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Feed one byte. Returns an event when the byte completes a message.
    pub fn feed(&mut self, byte: u8) -> Option<crate::Result<Event>> {
        let offset = self.offset;
        self.offset += 1;
        match self.feed_inner(byte, offset) {
            Ok(maybe) => maybe.map(Ok),
            Err(e) => {
                self.state = DecodeState::Idle;
                Some(Err(e.into()))
            }
        }
    }

    fn feed_inner(&mut self, byte: u8, offset: u64) -> LibResult<Option<Event>> {
        // realtime bytes are side-band: valid in any state, and they leave the state alone
        if byte >= 0xf8 {
            return match byte {
                0xf8 => Ok(Some(Event::TimingClock(U4::new(0)))),
                0xfa => Ok(Some(Event::Start(U4::new(0)))),
                0xfb => Ok(Some(Event::Continue(U4::new(0)))),
                0xfc => Ok(Some(Event::Stop(U4::new(0)))),
                0xfe => Ok(Some(Event::ActiveSensing(U4::new(0)))),
                0xff => Ok(Some(Event::SystemReset(U4::new(0)))),
                _ => malformed!(offset, "undefined realtime status byte {:#04x}", byte),
            };
        }
        let state = std::mem::replace(&mut self.state, DecodeState::Idle);
        match state {
            DecodeState::Idle => self.start_message(byte, offset),
            DecodeState::Data1Expected { status } => {
                if byte > 0x7f {
                    malformed!(offset, "expected a data byte, got {:#04x}", byte);
                }
                if expected_data_len(status) == 2 {
                    self.state = DecodeState::Data2Expected {
                        status,
                        data1: byte,
                    };
                    Ok(None)
                } else {
                    self.complete(status, byte, 0)
                }
            }
            DecodeState::Data2Expected { status, data1 } => {
                if byte > 0x7f {
                    malformed!(offset, "expected a data byte, got {:#04x}", byte);
                }
                self.complete(status, data1, byte)
            }
            DecodeState::SysExBody { mut bytes } => {
                if byte == 0xf7 {
                    trace!("sysex terminated with {} payload bytes", bytes.len());
                    return Ok(Some(classify_sysex7(U4::new(0), &bytes, offset)?));
                }
                if byte > 0x7f {
                    malformed!(offset, "status byte {:#04x} inside a sysex body", byte);
                }
                if bytes.len() >= self.settings.sysex_byte_limit {
                    malformed!(offset, "sysex exceeds {} bytes", self.settings.sysex_byte_limit);
                }
                bytes.push(byte);
                self.state = DecodeState::SysExBody { bytes };
                Ok(None)
            }
        }
    }

    fn start_message(&mut self, byte: u8, offset: u64) -> LibResult<Option<Event>> {
        match byte {
            0x00..=0x7f => {
                malformed!(offset, "data byte {:#04x} with no message in progress", byte)
            }
            0xf0 => {
                self.state = DecodeState::SysExBody { bytes: Vec::new() };
                Ok(None)
            }
            0xf1 | 0xf3 => {
                self.state = DecodeState::Data1Expected { status: byte };
                Ok(None)
            }
            0xf2 => {
                self.state = DecodeState::Data1Expected { status: byte };
                Ok(None)
            }
            0xf6 => Ok(Some(Event::TuneRequest(U4::new(0)))),
            0xf4 | 0xf5 | 0xf7 => {
                malformed!(offset, "unexpected status byte {:#04x}", byte)
            }
            _ => {
                // a channel voice status
                let status_type = StatusType::from_u8(byte >> 4)?;
                if status_type.data_len() == 0 {
                    malformed!(offset, "unexpected status byte {:#04x}", byte);
                }
                self.state = DecodeState::Data1Expected { status: byte };
                Ok(None)
            }
        }
    }

    fn complete(&mut self, status: u8, data1: u8, data2: u8) -> LibResult<Option<Event>> {
        let group = U4::new(0);
        let event = match status {
            0xf1 => Event::TimecodeQuarterFrame(crate::core::TimecodeQuarterFrame {
                group,
                data_byte: U7::new_truncating(data1),
            }),
            0xf2 => Event::song_position(
                group,
                U14::from_pair(U7::new_truncating(data2), U7::new_truncating(data1)),
            ),
            0xf3 => Event::song_select(group, U7::new_truncating(data1)),
            _ => channel_voice_from_bytes(
                group,
                status,
                data1,
                data2,
                self.settings.translate_zero_velocity_note_on,
            )?,
        };
        Ok(Some(event))
    }
}

/// Build a channel voice event from a MIDI 1.0 status byte and its data bytes. Shared between
/// the byte-stream decoder, the UMP MIDI-1-in-UMP decoder, and the file layer.
pub(crate) fn channel_voice_from_bytes(
    group: U4,
    status: u8,
    data1: u8,
    data2: u8,
    translate_zero_velocity: bool,
) -> LibResult<Event> {
    let channel = U4::new_truncating(status);
    let status_type = StatusType::from_u8(status >> 4)?;
    let event = match status_type {
        StatusType::NoteOff => Event::NoteOff(NoteMessage {
            group,
            channel,
            note: U7::new_truncating(data1),
            velocity: Velocity::Midi1(U7::new_truncating(data2)),
            attribute: None,
        }),
        StatusType::NoteOn => {
            let message = NoteMessage {
                group,
                channel,
                note: U7::new_truncating(data1),
                velocity: Velocity::Midi1(U7::new_truncating(data2)),
                attribute: None,
            };
            if data2 == 0 && translate_zero_velocity {
                Event::NoteOff(message)
            } else {
                Event::NoteOn(message)
            }
        }
        StatusType::PolyPressure => Event::NotePressure(NotePressure {
            group,
            channel,
            note: U7::new_truncating(data1),
            amount: ChanValue::Midi1(U7::new_truncating(data2)),
        }),
        StatusType::Control => Event::ControlChange(ControlChange {
            group,
            channel,
            controller: Controller::from_u8(data1)?,
            value: ChanValue::Midi1(U7::new_truncating(data2)),
        }),
        StatusType::Program => Event::ProgramChange(ProgramChange {
            group,
            channel,
            program: U7::new_truncating(data1),
            bank: None,
        }),
        StatusType::ChannelPressure => Event::ChannelPressure(ChannelPressure {
            group,
            channel,
            amount: ChanValue::Midi1(U7::new_truncating(data1)),
        }),
        StatusType::PitchBend => Event::PitchBend(PitchBend {
            group,
            channel,
            value: BendValue::Midi1(U14::from_pair(
                U7::new_truncating(data2),
                U7::new_truncating(data1),
            )),
        }),
        StatusType::System => {
            malformed!(0u64, "status byte {:#04x} is not a channel voice status", status)
        }
    };
    Ok(event)
}

fn expected_data_len(status: u8) -> usize {
    match status {
        0xf1 | 0xf3 => 1,
        0xf2 => 2,
        _ => match status >> 4 {
            0xc | 0xd => 1,
            _ => 2,
        },
    }
}

/// Classify a complete 7-bit system exclusive payload (framing bytes already removed) into a
/// manufacturer or universal event.
pub(crate) fn classify_sysex7(group: U4, payload: &[u8], offset: u64) -> LibResult<Event> {
    match payload.first() {
        None => malformed!(offset, "empty sysex message"),
        Some(&UNIVERSAL_NON_REAL_TIME) | Some(&UNIVERSAL_REAL_TIME) => {
            if payload.len() < 4 {
                malformed!(offset, "universal sysex is shorter than its header");
            }
            let kind = if payload[0] == UNIVERSAL_NON_REAL_TIME {
                UniversalKind::NonRealTime
            } else {
                UniversalKind::RealTime
            };
            Ok(Event::UniversalSysEx7(UniversalSysEx7 {
                group,
                kind,
                device_id: U7::checked(payload[1])?,
                sub_id1: U7::checked(payload[2])?,
                sub_id2: U7::checked(payload[3])?,
                data: payload[4..].to_vec(),
            }))
        }
        Some(_) => {
            let (manufacturer, used) = ManufacturerId::parse(payload)?;
            Ok(Event::SysEx7(SysEx7 {
                group,
                manufacturer,
                data: payload[used..].to_vec(),
            }))
        }
    }
}

/// An iterator decoding a byte slice into events.
pub struct Midi1Stream<'a> {
    bytes: &'a [u8],
    ix: usize,
    decoder: Midi1Decoder,
}

impl<'a> Iterator for Midi1Stream<'a> {
    type Item = crate::Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.ix < self.bytes.len() {
            let byte = self.bytes[self.ix];
            self.ix += 1;
            if let Some(result) = self.decoder.feed(byte) {
                return Some(result);
            }
        }
        None
    }
}

/// Decode a MIDI 1.0 byte stream into an iterator of events. Decoding is lazy; each error
/// item carries the offset of the byte that could not be decoded, and decoding continues with
/// the following byte.
pub fn decode_stream(bytes: &[u8]) -> Midi1Stream<'_> {
    decode_stream_with(bytes, Midi1Settings::default())
}

/// [`decode_stream`] with explicit settings.
pub fn decode_stream_with(bytes: &[u8], settings: Midi1Settings) -> Midi1Stream<'_> {
    Midi1Stream {
        bytes,
        ix: 0,
        decoder: Midi1Decoder::new(settings),
    }
}
