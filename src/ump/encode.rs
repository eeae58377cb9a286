use crate::core::{
    Event, JrTime, NoteMessage, PerNoteController, UniversalKind, UNIVERSAL_NON_REAL_TIME,
    UNIVERSAL_REAL_TIME,
};
use crate::error::LibResult;
use crate::ump::Protocol;

// MIDI 2.0 channel voice opcodes (the second nibble of the first word)
const OP_PER_NOTE_CC_REGISTERED: u32 = 0x0;
const OP_PER_NOTE_CC_ASSIGNABLE: u32 = 0x1;
const OP_RPN: u32 = 0x2;
const OP_NRPN: u32 = 0x3;
const OP_RPN_RELATIVE: u32 = 0x4;
const OP_NRPN_RELATIVE: u32 = 0x5;
const OP_PER_NOTE_BEND: u32 = 0x6;
const OP_NOTE_OFF: u32 = 0x8;
const OP_NOTE_ON: u32 = 0x9;
const OP_KEY_PRESSURE: u32 = 0xa;
const OP_CONTROL_CHANGE: u32 = 0xb;
const OP_PROGRAM_CHANGE: u32 = 0xc;
const OP_CHANNEL_PRESSURE: u32 = 0xd;
const OP_PITCH_BEND: u32 = 0xe;
const OP_NOTE_MANAGEMENT: u32 = 0xf;

/// Encode an event as UMP words appended to `out`. Channel voice events are rendered as the
/// message type selected by `protocol`, with values scaled between widths as needed. System,
/// system exclusive and utility events encode identically under either protocol.
pub fn encode_ump(event: &Event, protocol: Protocol, out: &mut Vec<u32>) -> crate::Result<()> {
    Ok(encode_inner(event, protocol, out)?)
}

fn encode_inner(event: &Event, protocol: Protocol, out: &mut Vec<u32>) -> LibResult<()> {
    let group = event.group().as_u32();
    match event {
        // utility
        Event::NoOp(_) => out.push(utility_word(group, 0x0, 0)),
        Event::JrClock(JrTime { time, .. }) => out.push(utility_word(group, 0x1, time.as_u32())),
        Event::JrTimestamp(JrTime { time, .. }) => {
            out.push(utility_word(group, 0x2, time.as_u32()))
        }
        // system common and realtime ride in message type 0x1 under both protocols
        Event::TimecodeQuarterFrame(_)
        | Event::SongPositionPointer(_)
        | Event::SongSelect(_)
        | Event::TuneRequest(_)
        | Event::TimingClock(_)
        | Event::Start(_)
        | Event::Continue(_)
        | Event::Stop(_)
        | Event::ActiveSensing(_)
        | Event::SystemReset(_) => {
            let status = event.raw_status_byte().unwrap_or(0) as u32;
            let (data1, data2) = match event.raw_data_bytes() {
                Some(crate::core::DataBytes::Two(a, b)) => (a as u32, b as u32),
                Some(crate::core::DataBytes::One(a)) => (a as u32, 0),
                _ => (0, 0),
            };
            out.push((0x1 << 28) | (group << 24) | (status << 16) | (data1 << 8) | data2);
        }
        // system exclusive
        Event::SysEx7(sysex) => {
            let mut payload = sysex.manufacturer.to_bytes();
            payload.extend_from_slice(&sysex.data);
            encode_sysex7_packets(group, &payload, out);
        }
        Event::UniversalSysEx7(sysex) => {
            let mut payload = vec![
                match sysex.kind {
                    UniversalKind::NonRealTime => UNIVERSAL_NON_REAL_TIME,
                    UniversalKind::RealTime => UNIVERSAL_REAL_TIME,
                },
                sysex.device_id.get(),
                sysex.sub_id1.get(),
                sysex.sub_id2.get(),
            ];
            payload.extend_from_slice(&sysex.data);
            encode_sysex7_packets(group, &payload, out);
        }
        Event::SysEx8(sysex) => {
            let mut payload = sysex.manufacturer.to_bytes();
            payload.extend_from_slice(&sysex.data);
            encode_sysex8_packets(group, sysex.stream_id, &payload, out);
        }
        Event::UniversalSysEx8(sysex) => {
            let mut payload = vec![
                match sysex.kind {
                    UniversalKind::NonRealTime => UNIVERSAL_NON_REAL_TIME,
                    UniversalKind::RealTime => UNIVERSAL_REAL_TIME,
                },
                sysex.device_id.get(),
                sysex.sub_id1.get(),
                sysex.sub_id2.get(),
            ];
            payload.extend_from_slice(&sysex.data);
            encode_sysex8_packets(group, sysex.stream_id, &payload, out);
        }
        Event::Unrecognized(packet) => out.extend_from_slice(&packet.words),
        // channel voice
        _ => match protocol {
            Protocol::Midi1 => encode_midi1_voice(event, out)?,
            Protocol::Midi2 => encode_midi2_voice(event, out)?,
        },
    }
    Ok(())
}

fn utility_word(group: u32, status: u32, value: u32) -> u32 {
    (group << 24) | (status << 20) | (value & 0xffff)
}

/// Render a channel voice event as one or more MIDI-1-in-UMP (message type `0x2`) words.
fn encode_midi1_voice(event: &Event, out: &mut Vec<u32>) -> LibResult<()> {
    // the multi-message forms (RPN transactions, bank select + program change) render as a
    // sequence of MT 0x2 words, mirroring the byte-stream encoder
    let group = event.group().as_u32();
    let mut bytes = Vec::new();
    match crate::midi1::encode(event, &mut bytes) {
        Ok(()) => {}
        Err(_) => unsupported!(format!(
            "{:?} cannot be carried in a MIDI 1.0 UMP packet",
            event.kind()
        )),
    }
    if bytes.first().copied() == Some(0xf0) {
        // not reachable for channel voice, but keep the invariant obvious
        unsupported!("system exclusive does not use message type 0x2");
    }
    let mut ix = 0;
    while ix < bytes.len() {
        let status = bytes[ix] as u32;
        let len = 1 + data_len_for_status(bytes[ix]);
        let data1 = if len > 1 { bytes[ix + 1] as u32 } else { 0 };
        let data2 = if len > 2 { bytes[ix + 2] as u32 } else { 0 };
        out.push((0x2 << 28) | (group << 24) | (status << 16) | (data1 << 8) | data2);
        ix += len;
    }
    Ok(())
}

fn data_len_for_status(status: u8) -> usize {
    match status >> 4 {
        0xc | 0xd => 1,
        _ => 2,
    }
}

/// Render a channel voice event as a MIDI 2.0 channel voice (message type `0x4`) packet.
fn encode_midi2_voice(event: &Event, out: &mut Vec<u32>) -> LibResult<()> {
    let group = event.group().as_u32();
    let channel = match event.channel() {
        Some(channel) => channel.as_u32(),
        None => unsupported!(format!(
            "{:?} is not a channel voice event",
            event.kind()
        )),
    };
    let head = |opcode: u32| (0x4 << 28) | (group << 24) | (opcode << 20) | (channel << 16);
    match event {
        Event::NoteOn(message) | Event::NoteOff(message) => {
            let NoteMessage {
                note,
                velocity,
                attribute,
                ..
            } = message;
            let opcode = if matches!(event, Event::NoteOn(_)) {
                OP_NOTE_ON
            } else {
                OP_NOTE_OFF
            };
            let attr_type = attribute.map(|a| a.type_byte()).unwrap_or(0) as u32;
            let attr_data = attribute.map(|a| a.data().as_u32()).unwrap_or(0);
            out.push(head(opcode) | (note.as_u32() << 8) | attr_type);
            out.push((velocity.midi2().as_u32() << 16) | attr_data);
        }
        Event::NotePressure(message) => {
            out.push(head(OP_KEY_PRESSURE) | (message.note.as_u32() << 8));
            out.push(message.amount.midi2().get());
        }
        Event::NoteCc(message) => {
            let (opcode, index) = match message.controller {
                PerNoteController::Registered(index) => (OP_PER_NOTE_CC_REGISTERED, index),
                PerNoteController::Assignable(index) => (OP_PER_NOTE_CC_ASSIGNABLE, index),
            };
            out.push(head(opcode) | (message.note.as_u32() << 8) | index.as_u32());
            out.push(message.value.get());
        }
        Event::NotePitchBend(message) => {
            out.push(head(OP_PER_NOTE_BEND) | (message.note.as_u32() << 8));
            out.push(message.value.get());
        }
        Event::NoteManagement(message) => {
            let flags = ((message.detach as u32) << 1) | message.reset as u32;
            out.push(head(OP_NOTE_MANAGEMENT) | (message.note.as_u32() << 8) | flags);
            out.push(0);
        }
        Event::ControlChange(message) => {
            out.push(head(OP_CONTROL_CHANGE) | ((message.controller.to_u8() as u32) << 8));
            out.push(message.value.midi2().get());
        }
        Event::ProgramChange(message) => {
            let bank_valid = message.bank.is_some() as u32;
            out.push(head(OP_PROGRAM_CHANGE) | bank_valid);
            let (bank_msb, bank_lsb) = message
                .bank
                .map(|bank| {
                    let (msb, lsb) = bank.into_pair();
                    (msb.as_u32(), lsb.as_u32())
                })
                .unwrap_or((0, 0));
            out.push((message.program.as_u32() << 24) | (bank_msb << 8) | bank_lsb);
        }
        Event::ChannelPressure(message) => {
            out.push(head(OP_CHANNEL_PRESSURE));
            out.push(message.amount.midi2().get());
        }
        Event::PitchBend(message) => {
            out.push(head(OP_PITCH_BEND));
            out.push(message.value.midi2().get());
        }
        Event::Rpn(message) => {
            let opcode = match message.change {
                crate::core::ParameterChange::Absolute => OP_RPN,
                crate::core::ParameterChange::Relative => OP_RPN_RELATIVE,
            };
            let (bank, index) = message.parameter.into_pair();
            out.push(head(opcode) | (bank.as_u32() << 8) | index.as_u32());
            out.push(message.value.midi2().get());
        }
        Event::Nrpn(message) => {
            let opcode = match message.change {
                crate::core::ParameterChange::Absolute => OP_NRPN,
                crate::core::ParameterChange::Relative => OP_NRPN_RELATIVE,
            };
            let (bank, index) = message.parameter.into_pair();
            out.push(head(opcode) | (bank.as_u32() << 8) | index.as_u32());
            out.push(message.value.midi2().get());
        }
        _ => unsupported!(format!(
            "{:?} is not a channel voice event",
            event.kind()
        )),
    }
    Ok(())
}

/// The stream position nibble of a multi-packet system exclusive message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StreamStatus {
    Complete = 0x0,
    Start = 0x1,
    Continue = 0x2,
    End = 0x3,
}

fn chunk_statuses(total_chunks: usize, ix: usize) -> StreamStatus {
    if total_chunks == 1 {
        StreamStatus::Complete
    } else if ix == 0 {
        StreamStatus::Start
    } else if ix + 1 == total_chunks {
        StreamStatus::End
    } else {
        StreamStatus::Continue
    }
}

/// Chunk a 7-bit payload into message type `0x3` packets of up to six bytes each.
fn encode_sysex7_packets(group: u32, payload: &[u8], out: &mut Vec<u32>) {
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![&[]]
    } else {
        payload.chunks(6).collect()
    };
    let total = chunks.len();
    for (ix, chunk) in chunks.iter().enumerate() {
        let status = chunk_statuses(total, ix) as u32;
        let mut bytes = [0u8; 6];
        bytes[..chunk.len()].copy_from_slice(chunk);
        out.push(
            (0x3 << 28)
                | (group << 24)
                | (status << 20)
                | ((chunk.len() as u32) << 16)
                | ((bytes[0] as u32) << 8)
                | bytes[1] as u32,
        );
        out.push(u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]));
    }
}

/// Chunk an 8-bit payload into message type `0x5` packets of up to thirteen bytes each. The
/// stream ID occupies one of the fourteen byte slots, so the declared byte count is the data
/// count plus one.
fn encode_sysex8_packets(group: u32, stream_id: u8, payload: &[u8], out: &mut Vec<u32>) {
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![&[]]
    } else {
        payload.chunks(13).collect()
    };
    let total = chunks.len();
    for (ix, chunk) in chunks.iter().enumerate() {
        let status = chunk_statuses(total, ix) as u32;
        let mut bytes = [0u8; 13];
        bytes[..chunk.len()].copy_from_slice(chunk);
        out.push(
            (0x5 << 28)
                | (group << 24)
                | (status << 20)
                | ((chunk.len() as u32 + 1) << 16)
                | ((stream_id as u32) << 8)
                | bytes[0] as u32,
        );
        out.push(u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]));
        out.push(u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]));
        out.push(u32::from_be_bytes([
            bytes[9], bytes[10], bytes[11], bytes[12],
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Velocity, U16, U4, U7};

    #[test]
    fn midi2_note_on_words() {
        let event = Event::note_on(
            U4::new(1),
            U4::new(1),
            U7::new(0x3c),
            Velocity::Midi2(U16::new(0xc000)),
        );
        let mut words = Vec::new();
        encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
        assert_eq!(vec![0x4191_3c00, 0xc000_0000], words);
    }

    #[test]
    fn midi1_note_on_word() {
        let event = Event::note_on(
            U4::new(0),
            U4::new(1),
            U7::new(60),
            Velocity::Midi1(U7::new(100)),
        );
        let mut words = Vec::new();
        encode_ump(&event, Protocol::Midi1, &mut words).unwrap();
        assert_eq!(vec![0x2091_3c64], words);
    }

    #[test]
    fn system_word_is_protocol_independent() {
        let event = Event::song_select(U4::new(2), U7::new(9));
        for protocol in [Protocol::Midi1, Protocol::Midi2] {
            let mut words = Vec::new();
            encode_ump(&event, protocol, &mut words).unwrap();
            assert_eq!(vec![0x12f3_0900], words);
        }
    }

    #[test]
    fn short_sysex7_is_one_complete_packet() {
        let event = Event::SysEx7(crate::core::SysEx7 {
            group: U4::new(0),
            manufacturer: crate::core::ManufacturerId::standard(0x41).unwrap(),
            data: vec![0x01, 0x02],
        });
        let mut words = Vec::new();
        encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
        assert_eq!(vec![0x3003_4101, 0x0200_0000], words);
    }
}
