/*!
`midikit` is a protocol core for MIDI 1.0 and MIDI 2.0. It provides:

- a typed event model ([`core::Event`]) over every channel voice, system and system exclusive
  message of both protocol generations, built on validated numeric types;
- three wire codecs: the MIDI 1.0 byte stream ([`midi1`]), the Universal MIDI Packet
  ([`ump`]), and the Standard MIDI File container ([`file`]);
- an event filter algebra ([`filter`]) and combiners for multi-message MIDI 1.0 idioms
  ([`combine`]);
- two deterministic stream processors: the MIDI Time Code decoder ([`mtc`]) and the HUI
  control-surface codec ([`hui`]).

The crate never performs I/O of its own beyond reading and writing Standard MIDI Files
through `std::io` traits supplied by the caller; realtime transport is someone else's job.

```
use midikit::core::{Event, Velocity, U4, U7};

let event = Event::note_on(
    U4::new(0),
    U4::new(0),
    U7::new(60),
    Velocity::Midi1(U7::new(100)),
);
let mut bytes = Vec::new();
midikit::midi1::encode(&event, &mut bytes).unwrap();
assert_eq!(vec![0x90, 60, 100], bytes);
let decoded: Result<Vec<Event>, _> = midikit::decode_stream(&bytes).collect();
assert_eq!(vec![event], decoded.unwrap());
```
!*/

#![allow(clippy::needless_range_loop)]

#[macro_use]
mod error;
#[macro_use]
mod macros;

mod byte_iter;
mod scribe;

pub mod combine;
pub mod core;
pub mod file;
pub mod filter;
pub mod hui;
pub mod midi1;
pub mod mtc;
pub mod ump;
pub mod vlq;

pub use error::{Error, ErrorKind, Result};

use file::{MidiFile, ParseSettings, WriteSettings};
use std::io::Cursor;

/// Decode a MIDI 1.0 wire byte stream into an iterator of events. See
/// [`midi1::decode_stream`].
pub fn decode_stream(bytes: &[u8]) -> midi1::Midi1Stream<'_> {
    midi1::decode_stream(bytes)
}

/// Decode a stream of Universal MIDI Packet words into an iterator of events. See
/// [`ump::decode_ump`].
pub fn decode_ump(words: &[u32]) -> ump::UmpStream<'_> {
    ump::decode_ump(words)
}

/// Parse a Standard MIDI File from a byte slice.
pub fn parse_smf(bytes: &[u8]) -> Result<MidiFile> {
    MidiFile::read(Cursor::new(bytes))
}

/// [`parse_smf`] with explicit settings.
pub fn parse_smf_with(bytes: &[u8], settings: ParseSettings) -> Result<MidiFile> {
    MidiFile::read_with(Cursor::new(bytes), settings)
}

/// Encode a [`MidiFile`] to bytes.
pub fn encode_smf(file: &MidiFile) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    file.write(&mut bytes)?;
    Ok(bytes)
}

/// [`encode_smf`] with explicit settings.
pub fn encode_smf_with(file: &MidiFile, settings: WriteSettings) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    file.write_with(&mut bytes, settings)?;
    Ok(bytes)
}
