use crate::core::{
    Event, JrTime, ManufacturerId, NoteAttribute, NoteCc, NoteManagement, NoteMessage,
    NotePitchBend, NotePressure, Nrpn, ParameterChange, PerNoteController, PitchBend,
    ChannelPressure, ControlChange, Controller, ProgramChange, Rpn, SysEx8, UniversalKind,
    UniversalSysEx8, UnrecognizedPacket, Velocity, BendValue, ChanValue, U14, U16, U32, U4, U7,
    UNIVERSAL_NON_REAL_TIME, UNIVERSAL_REAL_TIME,
};
use crate::error::LibResult;
use crate::midi1::{channel_voice_from_bytes, classify_sysex7};
use crate::ump::{word_count, UmpSettings};
use log::trace;

const STREAM_COMPLETE: u32 = 0x0;
const STREAM_START: u32 = 0x1;
const STREAM_CONTINUE: u32 = 0x2;
const STREAM_END: u32 = 0x3;
const STREAM_MDS_HEADER: u32 = 0x8;
const STREAM_MDS_PAYLOAD: u32 = 0x9;

/// A packet-at-a-time UMP decoder. Multi-packet system exclusive messages are reassembled per
/// UMP group; a reassembly error resets only the offending group, so subsequent good input
/// decodes normally.
#[derive(Debug)]
pub struct UmpDecoder {
    settings: UmpSettings,
    sysex7: [Option<Vec<u8>>; 16],
    sysex8: [Option<Sysex8Buffer>; 16],
}

#[derive(Debug)]
struct Sysex8Buffer {
    stream_id: u8,
    bytes: Vec<u8>,
}

impl Default for UmpDecoder {
    fn default() -> Self {
        Self::new(UmpSettings::default())
    }
}

impl UmpDecoder {
    pub fn new(settings: UmpSettings) -> Self {
        Self {
            settings,
            sysex7: Default::default(),
            sysex8: Default::default(),
        }
    }

    /// Decode a single packet. `index` is the word index of the packet's first word within
    /// the caller's stream, used for error reporting. Returns `None` when the packet was a
    /// chunk of a message still being reassembled.
    pub fn decode_packet(&mut self, words: &[u32], index: u64) -> crate::Result<Option<Event>> {
        Ok(self.packet_inner(words, index)?)
    }

    fn packet_inner(&mut self, words: &[u32], index: u64) -> LibResult<Option<Event>> {
        let w0 = match words.first() {
            Some(w) => *w,
            None => malformed!(index, "empty packet"),
        };
        let message_type = ((w0 >> 28) & 0xf) as u8;
        if words.len() != word_count(message_type) {
            malformed!(
                index,
                "message type {:#x} needs {} words, got {}",
                message_type,
                word_count(message_type),
                words.len()
            );
        }
        let group = U4::new(((w0 >> 24) & 0xf) as u8);
        trace!("packet mt {:#x} group {} at word {}", message_type, group, index);
        match message_type {
            0x0 => self.utility(group, w0, words),
            0x1 => system(group, w0, index).map(Some),
            0x2 => {
                let status = ((w0 >> 16) & 0xff) as u8;
                if !(0x80..=0xef).contains(&status) {
                    malformed!(index, "bad MIDI 1.0 channel voice status {:#04x}", status);
                }
                channel_voice_from_bytes(
                    group,
                    status,
                    ((w0 >> 8) & 0x7f) as u8,
                    (w0 & 0x7f) as u8,
                    self.settings.translate_zero_velocity_note_on,
                )
                .map(Some)
            }
            0x3 => self.sysex7_packet(group, w0, words[1], index),
            0x4 => midi2_voice(group, w0, words[1], index).map(Some),
            0x5 => self.sysex8_packet(group, w0, words, index),
            0xd if !self.settings.flex_data => {
                unsupported!("flex data packet (message type 0xd) while flex data is disabled")
            }
            0xf if !self.settings.stream_messages => {
                unsupported!("stream message packet (message type 0xf) while stream messages are disabled")
            }
            _ => Ok(Some(Event::Unrecognized(UnrecognizedPacket {
                words: words.to_vec(),
            }))),
        }
    }

    fn utility(&mut self, group: U4, w0: u32, words: &[u32]) -> LibResult<Option<Event>> {
        let status = (w0 >> 20) & 0xf;
        let time = U16::new((w0 & 0xffff) as u16);
        Ok(Some(match status {
            0x0 => Event::NoOp(group),
            0x1 => Event::JrClock(JrTime { group, time }),
            0x2 => Event::JrTimestamp(JrTime { group, time }),
            _ => Event::Unrecognized(UnrecognizedPacket {
                words: words.to_vec(),
            }),
        }))
    }

    fn sysex7_packet(
        &mut self,
        group: U4,
        w0: u32,
        w1: u32,
        index: u64,
    ) -> LibResult<Option<Event>> {
        let status = (w0 >> 20) & 0xf;
        let count = ((w0 >> 16) & 0xf) as usize;
        if count > 6 {
            malformed!(index, "sysex7 packet declares {} bytes, maximum is 6", count);
        }
        let all = [
            ((w0 >> 8) & 0xff) as u8,
            (w0 & 0xff) as u8,
            (w1 >> 24) as u8,
            ((w1 >> 16) & 0xff) as u8,
            ((w1 >> 8) & 0xff) as u8,
            (w1 & 0xff) as u8,
        ];
        let chunk = &all[..count];
        let slot = group.get() as usize;
        match status {
            STREAM_COMPLETE => {
                if self.sysex7[slot].take().is_some() {
                    malformed!(index, "complete sysex7 packet while reassembling group {}", group);
                }
                classify7(group, chunk.to_vec(), index).map(Some)
            }
            STREAM_START => {
                if self.sysex7[slot].replace(chunk.to_vec()).is_some() {
                    self.sysex7[slot] = None;
                    malformed!(index, "sysex7 start without end on group {}", group);
                }
                Ok(None)
            }
            STREAM_CONTINUE | STREAM_END => {
                let mut buffer = match self.sysex7[slot].take() {
                    Some(buffer) => buffer,
                    None => malformed!(
                        index,
                        "sysex7 continuation without start on group {}",
                        group
                    ),
                };
                if buffer.len() + chunk.len() > self.settings.sysex_byte_limit {
                    malformed!(
                        index,
                        "sysex7 on group {} exceeds {} bytes",
                        group,
                        self.settings.sysex_byte_limit
                    );
                }
                buffer.extend_from_slice(chunk);
                if status == STREAM_END {
                    classify7(group, buffer, index).map(Some)
                } else {
                    self.sysex7[slot] = Some(buffer);
                    Ok(None)
                }
            }
            _ => malformed!(index, "bad sysex7 stream status {:#x}", status),
        }
    }

    fn sysex8_packet(
        &mut self,
        group: U4,
        w0: u32,
        words: &[u32],
        index: u64,
    ) -> LibResult<Option<Event>> {
        let status = (w0 >> 20) & 0xf;
        if status == STREAM_MDS_HEADER || status == STREAM_MDS_PAYLOAD {
            // mixed data sets carry non-MIDI payloads; pass them through untouched
            return Ok(Some(Event::Unrecognized(UnrecognizedPacket {
                words: words.to_vec(),
            })));
        }
        let count = ((w0 >> 16) & 0xf) as usize;
        if count == 0 || count > 14 {
            malformed!(index, "sysex8 packet declares {} bytes, expected 1 to 14", count);
        }
        let stream_id = ((w0 >> 8) & 0xff) as u8;
        let mut all = [0u8; 13];
        all[0] = (w0 & 0xff) as u8;
        for (word_ix, word) in words[1..].iter().enumerate() {
            let bytes = word.to_be_bytes();
            all[1 + word_ix * 4..1 + word_ix * 4 + 4].copy_from_slice(&bytes);
        }
        let chunk = &all[..count - 1];
        let slot = group.get() as usize;
        match status {
            STREAM_COMPLETE => {
                if self.sysex8[slot].take().is_some() {
                    malformed!(index, "complete sysex8 packet while reassembling group {}", group);
                }
                classify8(group, stream_id, chunk.to_vec(), index).map(Some)
            }
            STREAM_START => {
                if self.sysex8[slot].is_some() {
                    self.sysex8[slot] = None;
                    malformed!(index, "sysex8 start without end on group {}", group);
                }
                self.sysex8[slot] = Some(Sysex8Buffer {
                    stream_id,
                    bytes: chunk.to_vec(),
                });
                Ok(None)
            }
            STREAM_CONTINUE | STREAM_END => {
                let mut buffer = match self.sysex8[slot].take() {
                    Some(buffer) => buffer,
                    None => malformed!(
                        index,
                        "sysex8 continuation without start on group {}",
                        group
                    ),
                };
                if buffer.stream_id != stream_id {
                    malformed!(
                        index,
                        "sysex8 stream id changed from {} to {} mid-message",
                        buffer.stream_id,
                        stream_id
                    );
                }
                if buffer.bytes.len() + chunk.len() > self.settings.sysex_byte_limit {
                    malformed!(
                        index,
                        "sysex8 on group {} exceeds {} bytes",
                        group,
                        self.settings.sysex_byte_limit
                    );
                }
                buffer.bytes.extend_from_slice(chunk);
                if status == STREAM_END {
                    classify8(group, stream_id, buffer.bytes, index).map(Some)
                } else {
                    self.sysex8[slot] = Some(buffer);
                    Ok(None)
                }
            }
            _ => malformed!(index, "bad sysex8 stream status {:#x}", status),
        }
    }
}

/// Classify a reassembled 7-bit payload. Some senders include the `F0`/`F7` framing bytes in
/// the packet payload even though UMP does not require them; both forms are accepted.
fn classify7(group: U4, mut payload: Vec<u8>, index: u64) -> LibResult<Event> {
    if payload.first() == Some(&0xf0) {
        payload.remove(0);
    }
    if payload.last() == Some(&0xf7) {
        payload.pop();
    }
    classify_sysex7(group, &payload, index)
}

fn classify8(group: U4, stream_id: u8, payload: Vec<u8>, index: u64) -> LibResult<Event> {
    match payload.first() {
        None => malformed!(index, "empty sysex8 message"),
        Some(&UNIVERSAL_NON_REAL_TIME) | Some(&UNIVERSAL_REAL_TIME) => {
            if payload.len() < 4 {
                malformed!(index, "universal sysex8 is shorter than its header");
            }
            let kind = if payload[0] == UNIVERSAL_NON_REAL_TIME {
                UniversalKind::NonRealTime
            } else {
                UniversalKind::RealTime
            };
            Ok(Event::UniversalSysEx8(UniversalSysEx8 {
                group,
                stream_id,
                kind,
                device_id: U7::checked(payload[1])?,
                sub_id1: U7::checked(payload[2])?,
                sub_id2: U7::checked(payload[3])?,
                data: payload[4..].to_vec(),
            }))
        }
        Some(_) => {
            let (manufacturer, used) = ManufacturerId::parse(&payload)?;
            Ok(Event::SysEx8(SysEx8 {
                group,
                stream_id,
                manufacturer,
                data: payload[used..].to_vec(),
            }))
        }
    }
}

/// Decode a message type `0x1` system packet.
fn system(group: U4, w0: u32, index: u64) -> LibResult<Event> {
    let status = ((w0 >> 16) & 0xff) as u8;
    let data1 = ((w0 >> 8) & 0x7f) as u8;
    let data2 = (w0 & 0x7f) as u8;
    Ok(match status {
        0xf1 => Event::quarter_frame(group, data1 >> 4, data1 & 0x0f),
        0xf2 => Event::song_position(
            group,
            U14::from_pair(U7::new(data2), U7::new(data1)),
        ),
        0xf3 => Event::song_select(group, U7::new(data1)),
        0xf6 => Event::TuneRequest(group),
        0xf8 => Event::TimingClock(group),
        0xfa => Event::Start(group),
        0xfb => Event::Continue(group),
        0xfc => Event::Stop(group),
        0xfe => Event::ActiveSensing(group),
        0xff => Event::SystemReset(group),
        _ => malformed!(index, "bad system status byte {:#04x}", status),
    })
}

/// Decode a MIDI 2.0 channel voice packet (message type `0x4`).
fn midi2_voice(group: U4, w0: u32, w1: u32, index: u64) -> LibResult<Event> {
    let opcode = (w0 >> 20) & 0xf;
    let channel = U4::new(((w0 >> 16) & 0xf) as u8);
    let byte2 = ((w0 >> 8) & 0xff) as u8;
    let byte3 = (w0 & 0xff) as u8;
    let note = U7::new_truncating(byte2);
    Ok(match opcode {
        0x0 | 0x1 => Event::NoteCc(NoteCc {
            group,
            channel,
            note,
            controller: if opcode == 0x0 {
                PerNoteController::Registered(U7::new_truncating(byte3))
            } else {
                PerNoteController::Assignable(U7::new_truncating(byte3))
            },
            value: U32::new(w1),
        }),
        0x2 | 0x4 => Event::Rpn(Rpn {
            group,
            channel,
            parameter: U14::from_pair(U7::new_truncating(byte2), U7::new_truncating(byte3)),
            value: crate::core::ParamValue::Midi2(U32::new(w1)),
            change: if opcode == 0x2 {
                ParameterChange::Absolute
            } else {
                ParameterChange::Relative
            },
        }),
        0x3 | 0x5 => Event::Nrpn(Nrpn {
            group,
            channel,
            parameter: U14::from_pair(U7::new_truncating(byte2), U7::new_truncating(byte3)),
            value: crate::core::ParamValue::Midi2(U32::new(w1)),
            change: if opcode == 0x3 {
                ParameterChange::Absolute
            } else {
                ParameterChange::Relative
            },
        }),
        0x6 => Event::NotePitchBend(NotePitchBend {
            group,
            channel,
            note,
            value: U32::new(w1),
        }),
        0x8 | 0x9 => {
            let message = NoteMessage {
                group,
                channel,
                note,
                velocity: Velocity::Midi2(U16::new((w1 >> 16) as u16)),
                attribute: NoteAttribute::from_raw(byte3, (w1 & 0xffff) as u16),
            };
            if opcode == 0x9 {
                Event::NoteOn(message)
            } else {
                Event::NoteOff(message)
            }
        }
        0xa => Event::NotePressure(NotePressure {
            group,
            channel,
            note,
            amount: ChanValue::Midi2(U32::new(w1)),
        }),
        0xb => Event::ControlChange(ControlChange {
            group,
            channel,
            controller: Controller::from_u8(byte2 & 0x7f)?,
            value: ChanValue::Midi2(U32::new(w1)),
        }),
        0xc => {
            let bank = if w0 & 0x1 == 0x1 {
                Some(U14::from_pair(
                    U7::new_truncating((w1 >> 8) as u8),
                    U7::new_truncating(w1 as u8),
                ))
            } else {
                None
            };
            Event::ProgramChange(ProgramChange {
                group,
                channel,
                program: U7::new_truncating((w1 >> 24) as u8),
                bank,
            })
        }
        0xd => Event::ChannelPressure(ChannelPressure {
            group,
            channel,
            amount: ChanValue::Midi2(U32::new(w1)),
        }),
        0xe => Event::PitchBend(PitchBend {
            group,
            channel,
            value: BendValue::Midi2(U32::new(w1)),
        }),
        0xf => Event::NoteManagement(NoteManagement {
            group,
            channel,
            note,
            detach: byte3 & 0x02 != 0,
            reset: byte3 & 0x01 != 0,
        }),
        _ => malformed!(index, "bad MIDI 2.0 channel voice opcode {:#x}", opcode),
    })
}

/// An iterator decoding a word slice into events.
pub struct UmpStream<'a> {
    words: &'a [u32],
    ix: usize,
    decoder: UmpDecoder,
}

impl<'a> Iterator for UmpStream<'a> {
    type Item = crate::Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.ix < self.words.len() {
            let message_type = ((self.words[self.ix] >> 28) & 0xf) as u8;
            let needed = word_count(message_type);
            let index = self.ix as u64;
            if self.ix + needed > self.words.len() {
                self.ix = self.words.len();
                let e: crate::error::LibError = malformed_e!(
                    index,
                    "packet of message type {:#x} is truncated",
                    message_type
                );
                return Some(Err(e.into()));
            }
            let packet = &self.words[self.ix..self.ix + needed];
            self.ix += needed;
            match self.decoder.decode_packet(packet, index) {
                Ok(None) => continue,
                Ok(Some(event)) => return Some(Ok(event)),
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Decode a stream of UMP words into an iterator of events.
pub fn decode_ump(words: &[u32]) -> UmpStream<'_> {
    decode_ump_with(words, UmpSettings::default())
}

/// [`decode_ump`] with explicit settings.
pub fn decode_ump_with(words: &[u32], settings: UmpSettings) -> UmpStream<'_> {
    UmpStream {
        words,
        ix: 0,
        decoder: UmpDecoder::new(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventKind;
    use crate::ump::{encode_ump, Protocol};

    fn decode_all(words: &[u32]) -> Vec<Event> {
        decode_ump(words).collect::<crate::Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn midi2_note_on() {
        let events = decode_all(&[0x4191_3c00, 0xc000_0000]);
        match &events[0] {
            Event::NoteOn(m) => {
                assert_eq!(1, m.group.get());
                assert_eq!(1, m.channel.get());
                assert_eq!(60, m.note.get());
                assert_eq!(Velocity::Midi2(U16::new(0xc000)), m.velocity);
                assert_eq!(None, m.attribute);
            }
            other => panic!("expected note on, got {:?}", other),
        }
    }

    #[test]
    fn sysex7_multi_packet_reassembly() {
        let words = [
            0x3015_f07e, 0x0006_0100, // Start [F0 7E 00 06 01]
            0x3025_0203, 0x0405_0600, // Continue [02 03 04 05 06]
            0x3032_07f7, 0x0000_0000, // End [07 F7]
        ];
        let events = decode_all(&words);
        assert_eq!(1, events.len());
        match &events[0] {
            Event::UniversalSysEx7(u) => {
                assert_eq!(UniversalKind::NonRealTime, u.kind);
                assert_eq!(0, u.device_id.get());
                assert_eq!(6, u.sub_id1.get());
                assert_eq!(1, u.sub_id2.get());
                assert_eq!(vec![0x02, 0x03, 0x04, 0x05, 0x06, 0x07], u.data);
            }
            other => panic!("expected universal sysex, got {:?}", other),
        }
    }

    #[test]
    fn continue_without_start_is_malformed_and_recoverable() {
        let words = [
            0x3022_0102, 0x0000_0000, // Continue with no Start
            0x2091_3c64, // a good MIDI 1 note on afterwards
        ];
        let results: Vec<_> = decode_ump(&words).collect();
        assert_eq!(2, results.len());
        assert_eq!(
            crate::ErrorKind::Malformed,
            results[0].as_ref().unwrap_err().kind()
        );
        assert_eq!(
            EventKind::NoteOn,
            results[1].as_ref().unwrap().kind()
        );
    }

    #[test]
    fn byte_cap_is_enforced() {
        let settings = UmpSettings {
            sysex_byte_limit: 8,
            ..UmpSettings::default()
        };
        let words = [
            0x3016_0102, 0x0304_0506, // Start, 6 bytes
            0x3026_0102, 0x0304_0506, // Continue, 6 more (over the cap)
        ];
        let results: Vec<_> = decode_ump_with(&words, settings).collect();
        assert_eq!(
            crate::ErrorKind::Malformed,
            results[0].as_ref().unwrap_err().kind()
        );
    }

    #[test]
    fn truncated_packet_is_malformed() {
        let results: Vec<_> = decode_ump(&[0x4191_3c00]).collect();
        assert_eq!(
            crate::ErrorKind::Malformed,
            results[0].as_ref().unwrap_err().kind()
        );
    }

    #[test]
    fn flex_data_passthrough_and_unsupported() {
        let words = [0xd012_3456, 0, 0, 0];
        let events = decode_all(&words);
        assert_eq!(EventKind::Unrecognized, events[0].kind());

        let settings = UmpSettings {
            flex_data: false,
            ..UmpSettings::default()
        };
        let results: Vec<_> = decode_ump_with(&words, settings).collect();
        assert_eq!(
            crate::ErrorKind::Unsupported,
            results[0].as_ref().unwrap_err().kind()
        );
    }

    #[test]
    fn midi2_round_trip_all_voice_opcodes() {
        let group = U4::new(3);
        let channel = U4::new(5);
        let events = vec![
            Event::note_on(group, channel, U7::new(60), Velocity::Midi2(U16::new(0x1234))),
            Event::note_off(group, channel, U7::new(60), Velocity::Midi2(U16::new(0x4321))),
            Event::NoteCc(NoteCc {
                group,
                channel,
                note: U7::new(10),
                controller: PerNoteController::Assignable(U7::new(7)),
                value: U32::new(0xdead_beef),
            }),
            Event::NotePitchBend(NotePitchBend {
                group,
                channel,
                note: U7::new(10),
                value: U32::new(0x8000_0001),
            }),
            Event::NoteManagement(NoteManagement {
                group,
                channel,
                note: U7::new(10),
                detach: true,
                reset: false,
            }),
            Event::ControlChange(ControlChange {
                group,
                channel,
                controller: Controller::ModWheel,
                value: ChanValue::Midi2(U32::new(42)),
            }),
            Event::ProgramChange(ProgramChange {
                group,
                channel,
                program: U7::new(88),
                bank: Some(U14::from_pair(U7::new(1), U7::new(2))),
            }),
            Event::ChannelPressure(ChannelPressure {
                group,
                channel,
                amount: ChanValue::Midi2(U32::new(7)),
            }),
            Event::PitchBend(PitchBend {
                group,
                channel,
                value: BendValue::Midi2(U32::new(0x8000_0000)),
            }),
            Event::Rpn(Rpn {
                group,
                channel,
                parameter: U14::from_pair(U7::new(0), U7::new(6)),
                value: crate::core::ParamValue::Midi2(U32::new(99)),
                change: ParameterChange::Relative,
            }),
            Event::Nrpn(Nrpn {
                group,
                channel,
                parameter: U14::from_pair(U7::new(2), U7::new(33)),
                value: crate::core::ParamValue::Midi2(U32::new(100)),
                change: ParameterChange::Absolute,
            }),
        ];
        for event in events {
            let mut words = Vec::new();
            encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
            let decoded = decode_all(&words);
            assert_eq!(vec![event], decoded);
        }
    }
}
