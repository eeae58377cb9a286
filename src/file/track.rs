use crate::byte_iter::ByteIter;
use crate::error::LibResult;
use crate::file::{FileEvent, MetaEvent, ParseSettings, Text, TrackEvent, WriteSettings};
use crate::scribe::{Scribe, ScribeSettings};
use log::{debug, trace};
use snafu::ResultExt;
use std::io::{Read, Write};

/// 2.3 - Track Chunks
/// The track chunks (type MTrk) are where actual song data is stored. Each track chunk is
/// simply a stream of MIDI events (and non-MIDI events), preceded by delta-time values.
///
/// Here is the syntax of an MTrk chunk (the + means "one or more": at least one MTrk event
/// must be present):
///
/// `<Track Chunk> = <chunk type><length><MTrk event>+`
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Track {
    events: Vec<TrackEvent>,
}

impl Track {
    /// Returns `true` if the track has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The number of events in the track.
    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    /// Iterator over the events in the track.
    pub fn events(&self) -> impl Iterator<Item = &TrackEvent> {
        self.events.iter()
    }

    /// Add an event to the end.
    pub fn push_event(&mut self, delta_time: u32, event: FileEvent) {
        self.events.push(TrackEvent::new(delta_time, event));
    }

    /// Add event at `index` and shift everything after it.
    pub fn insert_event(&mut self, index: usize, delta_time: u32, event: FileEvent) {
        self.events.insert(index, TrackEvent::new(delta_time, event));
    }

    /// Replace the event at `index`.
    pub fn replace_event(&mut self, index: usize, delta_time: u32, event: FileEvent) {
        self.events[index] = TrackEvent::new(delta_time, event);
    }

    /// Add, or replace, the track name at the beginning of a track.
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        let name = Text::new(name);
        let meta = FileEvent::Meta(MetaEvent::TrackName(name.clone()));
        for (ix, event) in self.events.iter().enumerate() {
            if event.delta_time() != 0 {
                break;
            }
            if let FileEvent::Meta(MetaEvent::TrackName(old)) = event.event() {
                debug!("changing track name from '{}' to '{}'", old, name);
                self.replace_event(ix, 0, meta);
                return;
            }
        }
        self.insert_event(0, 0, meta);
    }

    pub(crate) fn parse<R: Read>(
        iter: &mut ByteIter<R>,
        declared_length: u32,
        settings: &ParseSettings,
    ) -> LibResult<Self> {
        iter.set_size_limit(declared_length as u64);
        // running status does not carry across chunk boundaries
        iter.set_latest_message_byte(None);
        let mut events = Vec::new();
        loop {
            if iter.is_end() {
                malformed!(
                    iter.position(),
                    "end of track bytes reached before EndOfTrack event"
                );
            }
            let event = TrackEvent::parse(iter, settings)?;
            trace!("parsed {:?}", event);
            let is_track_end = event.is_end();
            events.push(event);
            if is_track_end {
                debug!("end of track event");
                if !iter.is_end() {
                    malformed!(
                        iter.position(),
                        "EndOfTrack event before end of track bytes"
                    );
                }
                break;
            }
        }
        iter.clear_size_limit();
        Ok(Self { events })
    }

    pub(crate) fn write<W: Write>(
        &self,
        w: &mut Scribe<W>,
        settings: WriteSettings,
    ) -> LibResult<()> {
        // the chunk length is not knowable until the events are rendered, so render them to a
        // buffer first
        let mut buffer: Vec<u8> = Vec::new();
        let mut track_scribe = Scribe::new(
            &mut buffer,
            ScribeSettings {
                running_status: settings.running_status,
            },
        );
        let mut end_of_track_written = false;
        for event in &self.events {
            event.write(&mut track_scribe)?;
            end_of_track_written = event.is_end();
        }
        if !end_of_track_written {
            debug!("appending a missing EndOfTrack event");
            TrackEvent::new(0, FileEvent::Meta(MetaEvent::EndOfTrack))
                .write(&mut track_scribe)?;
        }
        write!(w, "MTrk").context(wr!())?;
        w.write_all(&(buffer.len() as u32).to_be_bytes())
            .context(wr!())?;
        w.write_all(&buffer).context(wr!())?;
        Ok(())
    }
}
