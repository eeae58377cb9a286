mod utils;

use midikit::core::{
    ChanValue, Controller, Event, NoteMessage, UniversalKind, Velocity, U16, U4, U7,
};
use midikit::ump::{decode_ump, encode_ump, Protocol};
use utils::enable_logging;

fn decode_all(words: &[u32]) -> Vec<Event> {
    decode_ump(words).collect::<midikit::Result<Vec<_>>>().unwrap()
}

/// A MIDI 2.0 note on: group 1, channel 1, note 60, 16-bit velocity `0xC000`.
#[test]
fn midi2_note_on_scenario() {
    enable_logging();
    let words = [0x4191_3c00, 0xc000_0000];
    let events = decode_all(&words);
    assert_eq!(
        vec![Event::NoteOn(NoteMessage {
            group: U4::new(1),
            channel: U4::new(1),
            note: U7::new(60),
            velocity: Velocity::Midi2(U16::new(0xc000)),
            attribute: None,
        })],
        events
    );
    // re-encoding produces the identical words
    let mut out = Vec::new();
    encode_ump(&events[0], Protocol::Midi2, &mut out).unwrap();
    assert_eq!(words.to_vec(), out);
}

/// Multi-packet sysex7 reassembly, with the sender including the F0/F7 framing bytes in the
/// packet payload.
#[test]
fn sysex7_reassembly_scenario() {
    enable_logging();
    let words = [
        0x3015_f07e, 0x0006_0100, // Start [F0 7E 00 06 01]
        0x3025_0203, 0x0405_0600, // Continue [02 03 04 05 06]
        0x3032_07f7, 0x0000_0000, // End [07 F7]
    ];
    let events = decode_all(&words);
    assert_eq!(1, events.len());
    match &events[0] {
        Event::UniversalSysEx7(sysex) => {
            assert_eq!(UniversalKind::NonRealTime, sysex.kind);
            assert_eq!(0, sysex.device_id.get());
            assert_eq!(6, sysex.sub_id1.get());
            assert_eq!(1, sysex.sub_id2.get());
            assert_eq!((2u8..=7).collect::<Vec<u8>>(), sysex.data);
        }
        other => panic!("expected a universal sysex, got {:?}", other),
    }
}

fn midi1_event_samples() -> Vec<Event> {
    use midikit::core::{BendValue, U14};
    let group = U4::new(0);
    let channel = U4::new(4);
    vec![
        Event::note_on(group, channel, U7::new(60), Velocity::Midi1(U7::new(100))),
        Event::note_off(group, channel, U7::new(60), Velocity::Midi1(U7::new(0))),
        Event::poly_pressure(group, channel, U7::new(60), ChanValue::Midi1(U7::new(70))),
        Event::control_change(
            group,
            channel,
            Controller::DamperPedal,
            ChanValue::Midi1(U7::new(127)),
        ),
        Event::program_change(group, channel, U7::new(12)),
        Event::channel_pressure(group, channel, ChanValue::Midi1(U7::new(33))),
        Event::pitch_bend(group, channel, BendValue::Midi1(U14::new(0x2345))),
        Event::song_position(group, U14::new(0x1234)),
        Event::song_select(group, U7::new(3)),
        Event::quarter_frame(group, 2, 0xa),
        Event::TuneRequest(group),
        Event::TimingClock(group),
        Event::Start(group),
        Event::Continue(group),
        Event::Stop(group),
        Event::ActiveSensing(group),
        Event::SystemReset(group),
    ]
}

/// Protocol-preserving round trip: MIDI 1.0 valued events through message type `0x2`.
#[test]
fn midi1_in_ump_round_trip() {
    enable_logging();
    for event in midi1_event_samples() {
        let mut words = Vec::new();
        encode_ump(&event, Protocol::Midi1, &mut words).unwrap();
        let decoded = decode_all(&words);
        assert_eq!(vec![event], decoded);
    }
}

/// Protocol translation: a MIDI 1.0 valued channel voice event encoded as MIDI 2.0 decodes to
/// the semantically equivalent event under the documented value scaling.
#[test]
fn midi1_to_midi2_translation() {
    enable_logging();
    let event = Event::note_on(
        U4::new(0),
        U4::new(4),
        U7::new(60),
        Velocity::Midi1(U7::new(0x40)),
    );
    let mut words = Vec::new();
    encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
    let decoded = decode_all(&words);
    match &decoded[0] {
        Event::NoteOn(message) => {
            // center maps exactly to center under Min-Center-Max scaling
            assert_eq!(Velocity::Midi2(U16::new(0x8000)), message.velocity);
            assert_eq!(0x40, message.velocity.midi1().get());
        }
        other => panic!("expected a note on, got {:?}", other),
    }
}

/// Utility messages are one-word packets with the status in the third nibble.
#[test]
fn utility_round_trip() {
    enable_logging();
    let events = vec![
        Event::NoOp(U4::new(0)),
        Event::jr_clock(U4::new(5), U16::new(0x1234)),
        Event::jr_timestamp(U4::new(5), U16::new(0xfedc)),
    ];
    for event in events {
        let mut words = Vec::new();
        encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
        assert_eq!(1, words.len());
        assert_eq!(vec![event], decode_all(&words));
    }
}

/// 8-bit sysex carries full bytes and a stream id, chunked into four-word packets.
#[test]
fn sysex8_round_trip() {
    enable_logging();
    let event = Event::SysEx8(midikit::core::SysEx8 {
        group: U4::new(2),
        stream_id: 0x42,
        manufacturer: midikit::core::ManufacturerId::extended(0x00, 0x66).unwrap(),
        data: (0u8..=40).map(|b| b.wrapping_mul(7)).collect(),
    });
    let mut words = Vec::new();
    encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
    assert_eq!(0, words.len() % 4);
    assert_eq!(vec![event], decode_all(&words));
}

/// Sysex7 payloads above one packet reassemble; equality includes the manufacturer id.
#[test]
fn long_sysex7_round_trip() {
    enable_logging();
    let event = Event::SysEx7(midikit::core::SysEx7 {
        group: U4::new(0),
        manufacturer: midikit::core::ManufacturerId::standard(0x43).unwrap(),
        data: (0u8..20).collect(),
    });
    let mut words = Vec::new();
    encode_ump(&event, Protocol::Midi2, &mut words).unwrap();
    assert!(words.len() > 2);
    assert_eq!(vec![event], decode_all(&words));
}
