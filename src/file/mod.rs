/*!
The `file` module is for types and concepts strictly related to Standard MIDI *Files*. These
are kept separate from types and concepts that are also used in realtime MIDI (`core`).

A file is a sequence of chunks. The `MThd` header chunk is modelled by [`Header`]; every other
chunk is either an `MTrk` track or an unrecognized chunk which is preserved verbatim so that
`parse` followed by `encode` reproduces the input.
!*/

mod division;
mod header;
mod meta_event;
mod sysex;
mod time_signature;
mod track;
mod track_event;

pub use division::{Division, FrameRate, QuarterNoteDivision, SmpteRate};
pub use header::{Format, Header};
pub use meta_event::{
    KeyAccidentals, KeyMode, KeySignatureValue, MetaEvent, MicrosecondsPerQuarter,
    QuartersPerMinute, SmpteOffsetValue, Text,
};
pub use sysex::{SysexEvent, SysexEventType};
pub use time_signature::{Clocks, DurationName, TimeSignatureValue};
pub use track::Track;
pub use track_event::{FileEvent, TrackEvent};

use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::scribe::{Scribe, ScribeSettings};
use log::{trace, warn};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::{Read, Write};
use std::path::Path;

/// Settings for parsing a MIDI file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ParseSettings {
    /// The largest chunk length the parser will accept. A declared length above this is
    /// treated as malformed rather than trusted, which bounds memory on hostile input.
    pub max_chunk_length: u32,
    /// When true (the default), a `Note On` with velocity zero is normalised to `Note Off`.
    pub translate_zero_velocity_note_on: bool,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            max_chunk_length: 65_536,
            translate_zero_velocity_note_on: true,
        }
    }
}

/// Settings for writing a MIDI file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct WriteSettings {
    /// Elide repeated status bytes (running status). Off by default: the output is larger but
    /// byte-for-byte deterministic against the widest range of other readers.
    pub running_status: bool,
}

/// A chunk of a MIDI file other than the header.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Chunk {
    /// An `MTrk` chunk.
    Track(Track),
    /// Any chunk with an unrecognized ID. "Programs which support several chunk types should
    /// skip over the chunks they do not know" - we keep the bytes so the file round-trips.
    Unrecognized { id: [u8; 4], data: Vec<u8> },
}

/// An in-memory Standard MIDI File.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct MidiFile {
    header: Header,
    chunks: Vec<Chunk>,
}

impl MidiFile {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            chunks: Vec::new(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// The number of `MTrk` chunks.
    pub fn tracks_len(&self) -> usize {
        self.chunks
            .iter()
            .filter(|chunk| matches!(chunk, Chunk::Track(_)))
            .count()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            Chunk::Track(track) => Some(track),
            Chunk::Unrecognized { .. } => None,
        })
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks().nth(index)
    }

    pub fn push_track(&mut self, track: Track) {
        self.chunks.push(Chunk::Track(track));
    }

    pub fn push_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Scan every track for tempo changes. Returns `(tick, tempo)` pairs in the order the
    /// events appear, with ticks accumulated per track. The file layer itself never converts
    /// ticks to wall time; this is the raw material for doing so.
    pub fn tempo_map(&self) -> Vec<(u64, MicrosecondsPerQuarter)> {
        let mut entries = Vec::new();
        for track in self.tracks() {
            let mut tick: u64 = 0;
            for event in track.events() {
                tick += event.delta_time() as u64;
                if let FileEvent::Meta(MetaEvent::SetTempo(tempo)) = event.event() {
                    entries.push((tick, *tempo));
                }
            }
        }
        entries.sort_by_key(|(tick, _)| *tick);
        entries
    }

    pub fn read<R: Read>(r: R) -> crate::Result<Self> {
        Self::read_with(r, ParseSettings::default())
    }

    pub fn read_with<R: Read>(r: R, settings: ParseSettings) -> crate::Result<Self> {
        let iter = ByteIter::new(r.bytes()).context(error::Io { site: site!() })?;
        Ok(Self::read_inner(iter, &settings)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Ok(Self::read_inner(
            ByteIter::new_file(path).context(error::Io { site: site!() })?,
            &ParseSettings::default(),
        )?)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> crate::Result<()> {
        self.write_with(w, WriteSettings::default())
    }

    pub fn write_with<W: Write>(&self, w: &mut W, settings: WriteSettings) -> crate::Result<()> {
        let ntracks = u16::try_from(self.tracks_len())
            .map_err(|_| malformed_e!(0u64, "too many tracks for a 16-bit count"))?;
        let mut scribe = Scribe::new(
            w,
            ScribeSettings {
                running_status: settings.running_status,
            },
        );
        self.header.write(&mut scribe, ntracks)?;
        for chunk in &self.chunks {
            match chunk {
                Chunk::Track(track) => track.write(&mut scribe, settings)?,
                Chunk::Unrecognized { id, data } => {
                    scribe.write_all(id).context(wr!())?;
                    scribe
                        .write_all(&(data.len() as u32).to_be_bytes())
                        .context(wr!())?;
                    scribe.write_all(data).context(wr!())?;
                }
            }
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let mut file = std::fs::File::create(path).context(wr!())?;
        self.write(&mut file)
    }

    fn read_inner<R: Read>(mut iter: ByteIter<R>, settings: &ParseSettings) -> LibResult<Self> {
        trace!("parsing header chunk");
        iter.expect_tag("MThd").context(io!())?;
        let chunk_length = iter.read_u32().context(io!())?;
        // header chunk length is always 6
        if chunk_length != 6 {
            malformed!(iter.position(), "bad header chunk length {}", chunk_length);
        }
        let format_word = iter.read_u16().context(io!())?;
        let num_tracks = iter.read_u16().context(io!())?;
        let division_data = iter.read_u16().context(io!())?;
        let format = Format::from_u16(format_word, iter.position())?;
        let header = Header::new(format, Division::from_u16(division_data, iter.position())?);
        let mut chunks = Vec::new();
        while !iter.is_end() {
            let id = iter.read4().context(io!())?;
            let declared_length = iter.read_u32().context(io!())?;
            if declared_length > settings.max_chunk_length {
                malformed!(
                    iter.position(),
                    "chunk declares {} bytes, more than the {} byte limit",
                    declared_length,
                    settings.max_chunk_length
                );
            }
            if &id == b"MTrk" {
                trace!("parsing track chunk {}", chunks.len());
                chunks.push(Chunk::Track(Track::parse(
                    &mut iter,
                    declared_length,
                    settings,
                )?));
            } else {
                trace!("skipping unrecognized chunk {:?}", id);
                let data = iter.read_n(declared_length as usize).context(io!())?;
                chunks.push(Chunk::Unrecognized { id, data });
            }
        }
        let file = Self { header, chunks };
        if file.tracks_len() != num_tracks as usize {
            warn!(
                "header declares {} tracks but {} were found",
                num_tracks,
                file.tracks_len()
            );
        }
        Ok(file)
    }
}
