mod utils;

use midikit::combine::{Cc14, Cc14Combiner, Combined, RpnCombiner};
use midikit::core::{
    ChanValue, Controller, Event, EventKind, ParamValue, ParameterChange, Rpn, Velocity, U14, U4,
    U7,
};
use midikit::filter::{Filter, Predicate};
use midikit::hui::{
    self, HuiDecoder, HuiMessage, HuiRole, StripElement, SurfaceModel, SurfaceNotification,
    VPotDisplay, VPotId,
};
use midikit::mtc::{Direction, MtcDecoder, MtcRate, Timecode, TimecodeSource};
use utils::enable_logging;

/// The 14-bit control change scenario: `B0 01 40` then `B0 21 00` decode as two separate
/// control changes, and the combiner coalesces them into one 14-bit value of `0x2000`.
#[test]
fn cc14_pair_from_wire() {
    enable_logging();
    let bytes = [0xb0u8, 0x01, 0x40, 0xb0, 0x21, 0x00];
    let events: Vec<Event> = midikit::decode_stream(&bytes)
        .collect::<midikit::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(2, events.len());
    assert!(events.iter().all(|e| e.kind() == EventKind::ControlChange));

    let mut combiner = Cc14Combiner::default();
    let mut combined = Vec::new();
    for (ix, event) in events.into_iter().enumerate() {
        combined.extend(combiner.push(event, ix as u64 * 10_000));
    }
    assert_eq!(
        vec![Combined::Cc14(Cc14 {
            group: U4::new(0),
            channel: U4::new(0),
            controller: U7::new(1),
            value: U14::new(0x2000),
        })],
        combined
    );
}

/// An RPN transaction survives the trip onto the wire and back: the encoder renders the
/// four-message form, the stream decoder yields the individual control changes, and the
/// combiner folds them into the original event.
#[test]
fn rpn_transaction_wire_round_trip() {
    enable_logging();
    let original = Event::Rpn(Rpn {
        group: U4::new(0),
        channel: U4::new(5),
        parameter: U14::from_pair(U7::new(0), U7::new(0)),
        value: ParamValue::Midi1(U14::from_pair(U7::new(2), U7::new(0))),
        change: ParameterChange::Absolute,
    });
    let mut bytes = Vec::new();
    midikit::midi1::encode(&original, &mut bytes).unwrap();

    let events: Vec<Event> = midikit::decode_stream(&bytes)
        .collect::<midikit::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(4, events.len());

    let mut combiner = RpnCombiner::default();
    let mut out = Vec::new();
    for (ix, event) in events.into_iter().enumerate() {
        out.extend(combiner.push(event, ix as u64 * 1_000));
    }
    assert_eq!(vec![original], out);
    assert!(combiner.flush().is_none());
}

/// The quarter-frame scenario: eight in-order quarter frames carrying 02:22:34:01 at 30 fps
/// latch the value and emit it with the +2-frame forwards offset.
#[test]
fn mtc_quarter_frame_scenario() {
    enable_logging();
    let mut decoder = MtcDecoder::new();
    // 02:22:34:01, rate code 3 (30 fps non-drop), one nibble per piece
    let nibbles: [u8; 8] = [0x1, 0x0, 0x2, 0x2, 0x6, 0x1, 0x2, 0x6];
    let mut emissions = Vec::new();
    for (piece, nibble) in nibbles.iter().enumerate() {
        let event = Event::quarter_frame(U4::new(0), piece as u8, *nibble);
        if let Some(emission) = decoder.feed(&event) {
            emissions.push(emission);
        }
    }
    assert_eq!(MtcRate::Fps30, decoder.rate());
    assert_eq!(1, emissions.len());
    let emission = &emissions[0];
    assert_eq!(Timecode::new(2, 22, 34, 3), emission.timecode);
    assert_eq!(TimecodeSource::QuarterFrame, emission.source);
    assert_eq!(Direction::Forwards, emission.direction);
    assert_eq!(
        Some(emission.timecode),
        decoder.timecode_cell().get()
    );
}

/// Forwards quarter-frame streams emit non-decreasing timecodes.
#[test]
fn mtc_emission_is_monotonic() {
    enable_logging();
    let mut decoder = MtcDecoder::new();
    let mut emitted = Vec::new();
    for window in 0..6u8 {
        // each eight-piece window carries the timecode of its first frame
        let frames = window * 2;
        let nibbles: [u8; 8] = [frames & 0x0f, frames >> 4, 0, 0, 30 & 0x0f, 30 >> 4, 1, 0x6];
        for (piece, nibble) in nibbles.iter().enumerate() {
            let event = Event::quarter_frame(U4::new(0), piece as u8, *nibble);
            emitted.extend(decoder.feed(&event));
        }
    }
    assert!(emitted.len() > 8);
    for pair in emitted.windows(2) {
        assert!(
            pair[1].timecode >= pair[0].timecode,
            "{} then {}",
            pair[0].timecode,
            pair[1].timecode
        );
    }
}

/// The V-Pot scenario: the host displays `Single(0.5)` on channel 3, the surface-side decoder
/// and model agree on the lit LED, and a replay of the same message reports no change.
#[test]
fn hui_vpot_display_scenario() {
    enable_logging();
    let message = HuiMessage::VPotDisplay {
        vpot: VPotId::Channel(U4::new(3)),
        display: VPotDisplay::single(0.5),
    };
    let events = hui::encode(&message, HuiRole::Host);
    let mut decoder = HuiDecoder::new(HuiRole::Surface);
    let mut model = SurfaceModel::new();
    let mut results = Vec::new();
    for event in &events {
        if let Some(decoded) = decoder.feed(event).unwrap() {
            assert_eq!(message, decoded);
            results.push(model.apply(&decoded));
        }
    }
    assert_eq!(1, results.len());
    assert!(results[0].changed);
    match &results[0].notification {
        SurfaceNotification::ChannelStrip {
            strip: 3,
            element: StripElement::VPotDisplay(display),
        } => {
            // 0.5 is the center of the ring: LED 6 alone
            let leds = display.led_pattern();
            assert!(leds[5]);
            assert_eq!(1, leds.iter().filter(|lit| **lit).count());
        }
        other => panic!("unexpected notification {:?}", other),
    }
    // idempotent replay: same notification, changed = false
    let replay = model.apply(&message);
    assert!(!replay.changed);
    assert_eq!(results[0].notification, replay.notification);
}

/// The host ping and the surface reply cross a decoded link intact.
#[test]
fn hui_ping_handshake() {
    enable_logging();
    let mut surface_decoder = HuiDecoder::new(HuiRole::Surface);
    for event in hui::encode(&HuiMessage::Ping, HuiRole::Host) {
        assert_eq!(
            Some(HuiMessage::Ping),
            surface_decoder.feed(&event).unwrap()
        );
    }
    let mut host_decoder = HuiDecoder::new(HuiRole::Host);
    for event in hui::encode(&HuiMessage::PingReply, HuiRole::Surface) {
        assert_eq!(
            Some(HuiMessage::PingReply),
            host_decoder.feed(&event).unwrap()
        );
    }
}

/// Filtering with the identity filters leaves a decoded stream untouched.
#[test]
fn filter_identity_laws() {
    enable_logging();
    let bytes = [
        0x90u8, 60, 100, // note on
        0xb0, 0x07, 0x40, // channel volume
        0xf8, // timing clock
        0x80, 60, 0, // note off
    ];
    let events: Vec<Event> = midikit::decode_stream(&bytes)
        .collect::<midikit::Result<Vec<_>>>()
        .unwrap();
    let kept: Vec<Event> = Filter::only(Predicate::All).apply(events.clone()).collect();
    assert_eq!(events, kept);
    let kept: Vec<Event> = Filter::drop(Predicate::Kind(midikit::filter::KindSet::new(&[])))
        .apply(events.clone())
        .collect();
    assert_eq!(events, kept);
}

/// Mixed traffic routed by kind: realtime events peel off without disturbing the rest.
#[test]
fn filter_splits_realtime() {
    enable_logging();
    let bytes = [0x90u8, 60, 0xf8, 100, 0xfe, 0xb0, 0x07, 0x40];
    let events: Vec<Event> = midikit::decode_stream(&bytes)
        .collect::<midikit::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(4, events.len());
    let realtime: Vec<Event> = Filter::keep(Predicate::Kind(
        midikit::filter::KindSet::system_realtime(),
    ))
    .apply(events.clone())
    .collect();
    assert_eq!(2, realtime.len());
    let voice: Vec<Event> = Filter::keep(Predicate::Kind(
        midikit::filter::KindSet::channel_voice(),
    ))
    .apply(events)
    .collect();
    assert_eq!(2, voice.len());
    assert_eq!(
        vec![
            Event::note_on(U4::new(0), U4::new(0), U7::new(60), Velocity::Midi1(U7::new(100))),
            Event::control_change(
                U4::new(0),
                U4::new(0),
                Controller::ChannelVolume,
                ChanValue::Midi1(U7::new(0x40)),
            ),
        ],
        voice
    );
}
