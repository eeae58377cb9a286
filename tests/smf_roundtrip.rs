mod utils;

use midikit::core::{ChanValue, Controller, Event, Velocity, U4, U7};
use midikit::file::{
    Chunk, Division, FileEvent, Format, Header, MetaEvent, MicrosecondsPerQuarter, MidiFile,
    QuarterNoteDivision, SysexEvent, SysexEventType, Track, WriteSettings,
};
use midikit::{encode_smf, encode_smf_with, parse_smf, ErrorKind};
use tempfile::TempDir;
use utils::enable_logging;

/// The tempo/time-signature scenario: format 0, one track, 480 ticks per quarter, a tempo of
/// 500,000 microseconds per quarter and a 4/4 time signature.
const TEMPO_TIME_SIG_FILE: &[u8] = &[
    0x4d, 0x54, 0x68, 0x64, // MThd
    0x00, 0x00, 0x00, 0x06, // header length 6
    0x00, 0x00, // format 0
    0x00, 0x01, // one track
    0x01, 0xe0, // 480 ticks per quarter
    0x4d, 0x54, 0x72, 0x6b, // MTrk
    0x00, 0x00, 0x00, 0x13, // 19 bytes of events
    0x00, 0xff, 0x51, 0x03, 0x07, 0xa1, 0x20, // tempo 500,000
    0x00, 0xff, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, // 4/4, 24 clocks, 8 per quarter
    0x00, 0xff, 0x2f, 0x00, // end of track
];

#[test]
fn tempo_time_sig_scenario() {
    enable_logging();
    let file = parse_smf(TEMPO_TIME_SIG_FILE).unwrap();
    assert_eq!(&Format::Single, file.header().format());
    assert_eq!(
        &Division::QuarterNote(QuarterNoteDivision::new(480)),
        file.header().division()
    );
    assert_eq!(1, file.tracks_len());
    let track = file.track(0).unwrap();
    let events: Vec<&FileEvent> = track.events().map(|e| e.event()).collect();
    assert_eq!(3, events.len());
    assert_eq!(
        &FileEvent::Meta(MetaEvent::SetTempo(MicrosecondsPerQuarter::new(500_000))),
        events[0]
    );
    match events[1] {
        FileEvent::Meta(MetaEvent::TimeSignature(ts)) => {
            assert_eq!(4, ts.numerator());
            assert_eq!(midikit::file::DurationName::Quarter, ts.denominator());
            assert_eq!(midikit::file::Clocks::Quarter, ts.click());
        }
        other => panic!("expected a time signature, got {:?}", other),
    }
    assert_eq!(&FileEvent::Meta(MetaEvent::EndOfTrack), events[2]);

    // re-encoding reproduces the input byte for byte
    assert_eq!(TEMPO_TIME_SIG_FILE, encode_smf(&file).unwrap().as_slice());
}

#[test]
fn tempo_map_scans_tempo_events() {
    let file = parse_smf(TEMPO_TIME_SIG_FILE).unwrap();
    let map = file.tempo_map();
    assert_eq!(vec![(0, MicrosecondsPerQuarter::new(500_000))], map);
}

fn note(channel: u8, note_number: u8, velocity: u8) -> FileEvent {
    FileEvent::Midi(Event::note_on(
        U4::new(0),
        U4::new(channel),
        U7::new(note_number),
        Velocity::Midi1(U7::new(velocity)),
    ))
}

fn off(channel: u8, note_number: u8) -> FileEvent {
    FileEvent::Midi(Event::note_off(
        U4::new(0),
        U4::new(channel),
        U7::new(note_number),
        Velocity::Midi1(U7::new(64)),
    ))
}

fn sample_file() -> MidiFile {
    let mut track = Track::default();
    track.set_name("lead");
    track.push_event(
        0,
        FileEvent::Meta(MetaEvent::SetTempo(MicrosecondsPerQuarter::new(600_000))),
    );
    track.push_event(0, note(0, 60, 100));
    track.push_event(480, off(0, 60));
    track.push_event(0, note(0, 64, 90));
    track.push_event(480, off(0, 64));
    track.push_event(
        0,
        FileEvent::Midi(Event::control_change(
            U4::new(0),
            U4::new(0),
            Controller::Pan,
            ChanValue::Midi1(U7::new(32)),
        )),
    );
    track.push_event(
        0,
        FileEvent::Sysex(SysexEvent::new(
            SysexEventType::F0,
            vec![0x43, 0x12, 0x00, 0x07, 0xf7],
        )),
    );
    track.push_event(0, FileEvent::Meta(MetaEvent::EndOfTrack));
    let mut file = MidiFile::new(Header::new(
        Format::Multi,
        Division::QuarterNote(QuarterNoteDivision::new(480)),
    ));
    file.push_track(track);
    file
}

#[test]
fn constructed_file_round_trips() {
    enable_logging();
    let file = sample_file();
    let bytes = encode_smf(&file).unwrap();
    let reloaded = parse_smf(&bytes).unwrap();
    assert_eq!(file, reloaded);
    // and the reloaded file re-encodes identically
    assert_eq!(bytes, encode_smf(&reloaded).unwrap());
}

#[test]
fn running_status_round_trips() {
    enable_logging();
    // a run of same-status messages, where running status actually saves bytes
    let mut track = Track::default();
    for (delta, key) in [(0u32, 60u8), (120, 64), (120, 67), (120, 72)] {
        track.push_event(delta, note(2, key, 96));
    }
    track.push_event(0, FileEvent::Meta(MetaEvent::EndOfTrack));
    let mut file = MidiFile::new(Header::default());
    file.push_track(track);

    let plain = encode_smf(&file).unwrap();
    let compact = encode_smf_with(
        &file,
        WriteSettings {
            running_status: true,
        },
    )
    .unwrap();
    // three of the four status bytes are elided
    assert_eq!(plain.len() - 3, compact.len());
    // both decode to the same file
    assert_eq!(file, parse_smf(&compact).unwrap());
    assert_eq!(file, parse_smf(&plain).unwrap());
}

#[test]
fn unrecognized_chunks_are_preserved() {
    enable_logging();
    let mut file = sample_file();
    file.push_chunk(Chunk::Unrecognized {
        id: *b"XFIH",
        data: vec![0x01, 0x02, 0x03],
    });
    let bytes = encode_smf(&file).unwrap();
    let reloaded = parse_smf(&bytes).unwrap();
    assert_eq!(file, reloaded);
    assert_eq!(bytes, encode_smf(&reloaded).unwrap());
}

#[test]
fn unrecognized_meta_events_are_preserved() {
    enable_logging();
    let mut track = Track::default();
    track.push_event(
        0,
        FileEvent::Meta(MetaEvent::UnrecognizedMeta {
            meta_type: 0x4b,
            data: vec![0xde, 0xad],
        }),
    );
    track.push_event(0, FileEvent::Meta(MetaEvent::EndOfTrack));
    let mut file = MidiFile::new(Header::default());
    file.push_track(track);
    let bytes = encode_smf(&file).unwrap();
    assert_eq!(file, parse_smf(&bytes).unwrap());
}

#[test]
fn missing_end_of_track_is_appended_on_write() {
    enable_logging();
    let mut track = Track::default();
    track.push_event(0, note(0, 60, 100));
    let mut file = MidiFile::new(Header::default());
    file.push_track(track);
    let bytes = encode_smf(&file).unwrap();
    let reloaded = parse_smf(&bytes).unwrap();
    let last = reloaded.track(0).unwrap().events().last().unwrap();
    assert_eq!(&FileEvent::Meta(MetaEvent::EndOfTrack), last.event());
}

#[test]
fn save_and_load() {
    enable_logging();
    let td = TempDir::new().unwrap();
    let path = td.path().join("output.mid");
    let file = sample_file();
    file.save(&path).unwrap();
    let reloaded = MidiFile::load(&path).unwrap();
    assert_eq!(file, reloaded);
}

#[test]
fn short_header_fails() {
    let result = parse_smf(&TEMPO_TIME_SIG_FILE[..10]);
    assert!(result.is_err());
}

#[test]
fn bad_magic_fails() {
    let mut bytes = TEMPO_TIME_SIG_FILE.to_vec();
    bytes[0] = b'X';
    assert!(parse_smf(&bytes).is_err());
}

#[test]
fn truncated_track_fails() {
    let bytes = &TEMPO_TIME_SIG_FILE[..TEMPO_TIME_SIG_FILE.len() - 4];
    assert!(parse_smf(bytes).is_err());
}

#[test]
fn oversized_chunk_is_malformed() {
    let mut bytes = TEMPO_TIME_SIG_FILE.to_vec();
    // declare a track length beyond the default 65,536 byte cap
    bytes[18] = 0x01;
    bytes[19] = 0x00;
    bytes[20] = 0x01;
    bytes[21] = 0x00;
    let err = parse_smf(&bytes).unwrap_err();
    assert_eq!(ErrorKind::Malformed, err.kind());
}

#[test]
fn missing_end_of_track_on_parse_fails() {
    // a track whose declared bytes end without an EndOfTrack event
    let bytes: &[u8] = &[
        0x4d, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x01, 0xe0,
        0x4d, 0x54, 0x72, 0x6b, 0x00, 0x00, 0x00, 0x04, // four bytes of events
        0x00, 0xff, 0x51, 0x03, // a truncated tempo event, no end of track
    ];
    assert!(parse_smf(bytes).is_err());
}
