use crate::byte_iter::ByteIter;
use crate::core::{Event, U14, U4, U7};
use crate::error::LibResult;
use crate::file::{MetaEvent, ParseSettings, SysexEvent};
use crate::scribe::Scribe;
use crate::vlq::Vlq;
use log::trace;
use snafu::ResultExt;
use std::io::{Read, Write};

/// `0xFF`: File Spec: All meta-events begin with FF, then have an event type byte (which is
/// always less than 128)
const FILE_META_EVENT: u8 = 0xff;

/// `0xF0`: File Spec: `F0 <length> <bytes to be transmitted after F0>`
const FILE_SYSEX_F0: u8 = 0xf0;

/// `0xF7`: File Spec: `F7 <length> <all bytes to be transmitted>`
const FILE_SYSEX_F7: u8 = 0xf7;

/// `<event> = <MIDI event> | <sysex event> | <meta-event>`
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum FileEvent {
    /// `<MIDI event>` is any MIDI channel message. Running status is used.
    Midi(Event),
    /// `<sysex event>` is used to specify a MIDI system exclusive message.
    Sysex(SysexEvent),
    /// `<meta-event>` specifies non-MIDI information useful to this format or to sequencers.
    Meta(MetaEvent),
}

impl Default for FileEvent {
    fn default() -> Self {
        FileEvent::Meta(MetaEvent::EndOfTrack)
    }
}

impl FileEvent {
    fn parse<R: Read>(iter: &mut ByteIter<R>, settings: &ParseSettings) -> LibResult<Self> {
        let status_byte = iter.peek_or_die().context(io!())?;
        match status_byte {
            FILE_SYSEX_F0 | FILE_SYSEX_F7 => {
                // a sysex event interrupts running status
                iter.set_latest_message_byte(None);
                Ok(FileEvent::Sysex(SysexEvent::parse(status_byte, iter)?))
            }
            FILE_META_EVENT => {
                trace!("parsing meta event at {}", iter.position());
                iter.set_latest_message_byte(None);
                Ok(FileEvent::Meta(MetaEvent::parse(iter)?))
            }
            _ => {
                trace!("parsing midi message at {}", iter.position());
                Ok(FileEvent::Midi(parse_midi_message(iter, settings)?))
            }
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        match self {
            FileEvent::Midi(event) => write_midi_message(event, w),
            FileEvent::Sysex(sysex) => sysex.write(w),
            FileEvent::Meta(meta) => meta.write(w),
        }
    }
}

/// `<MTrk event> = <delta-time> <event>`
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TrackEvent {
    /// `<delta-time>` is stored as a variable-length quantity. It represents the amount of
    /// time before the following event. If the first event in a track occurs at the very
    /// beginning of a track, or if two events occur simultaneously, a delta-time of zero is
    /// used. Delta-times are always present. Delta-time is in ticks as specified in the
    /// header chunk.
    delta_time: u32,
    event: FileEvent,
}

impl TrackEvent {
    pub fn new(delta_time: u32, event: FileEvent) -> Self {
        Self { delta_time, event }
    }

    pub fn delta_time(&self) -> u32 {
        self.delta_time
    }

    pub fn event(&self) -> &FileEvent {
        &self.event
    }

    /// Returns true if the track event is a [`MetaEvent::EndOfTrack`].
    pub(crate) fn is_end(&self) -> bool {
        matches!(&self.event, FileEvent::Meta(MetaEvent::EndOfTrack))
    }

    pub(crate) fn parse<R: Read>(
        iter: &mut ByteIter<R>,
        settings: &ParseSettings,
    ) -> LibResult<Self> {
        let delta_time = iter.read_vlq_u32().context(io!())?;
        trace!("delta_time {}", delta_time);
        let event = FileEvent::parse(iter, settings)?;
        Ok(Self { delta_time, event })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        let delta = Vlq::new(self.delta_time).to_bytes();
        w.write_all(&delta).context(wr!())?;
        self.event.write(w)
    }
}

/// Parse a channel voice or system message inside a track, honoring running status: if the
/// first byte is a data byte (high bit clear) and a channel voice status was previously seen,
/// that status byte is reused.
fn parse_midi_message<R: Read>(
    iter: &mut ByteIter<R>,
    settings: &ParseSettings,
) -> LibResult<Event> {
    let status = if matches!(iter.peek_or_die().context(io!())?, 0x00..=0x7f) {
        let running_status = match iter.latest_message_byte() {
            Some(byte) => byte,
            None => malformed!(
                iter.position(),
                "data byte with no running status available"
            ),
        };
        trace!("running status byte {:#x}", running_status);
        running_status
    } else {
        let byte = iter.read_or_die().context(io!())?;
        // only channel voice statuses participate in running status
        if byte < 0xf0 {
            iter.set_latest_message_byte(Some(byte));
        } else {
            iter.set_latest_message_byte(None);
        }
        byte
    };
    let group = U4::new(0);
    match status {
        0xf1 | 0xf3 => {
            let data1 = iter.read_or_die().context(io!())?;
            if status == 0xf1 {
                Ok(Event::TimecodeQuarterFrame(
                    crate::core::TimecodeQuarterFrame {
                        group,
                        data_byte: U7::new_truncating(data1),
                    },
                ))
            } else {
                Ok(Event::song_select(group, U7::new_truncating(data1)))
            }
        }
        0xf2 => {
            let lsb = iter.read_or_die().context(io!())?;
            let msb = iter.read_or_die().context(io!())?;
            Ok(Event::song_position(
                group,
                U14::from_pair(U7::new_truncating(msb), U7::new_truncating(lsb)),
            ))
        }
        0xf6 => Ok(Event::TuneRequest(group)),
        0xf8 => Ok(Event::TimingClock(group)),
        0xfa => Ok(Event::Start(group)),
        0xfb => Ok(Event::Continue(group)),
        0xfc => Ok(Event::Stop(group)),
        0xfe => Ok(Event::ActiveSensing(group)),
        0xf0..=0xff => malformed!(iter.position(), "unexpected status byte {:#04x}", status),
        _ => {
            let data1 = iter.read_or_die().context(io!())?;
            let data2 = match status >> 4 {
                0xc | 0xd => 0,
                _ => iter.read_or_die().context(io!())?,
            };
            crate::midi1::channel_voice_from_bytes(
                group,
                status,
                data1,
                data2,
                settings.translate_zero_velocity_note_on,
            )
        }
    }
}

/// Write a MIDI message into a track, going through the scribe so that running status (when
/// enabled) can elide a repeated channel status byte.
fn write_midi_message<W: Write>(event: &Event, w: &mut Scribe<W>) -> LibResult<()> {
    // multi-message events (RPN transactions, bank select before program change) render
    // through the byte-stream encoder, message by message, so the scribe still sees each
    // status byte
    match event {
        Event::Rpn(_) | Event::Nrpn(_) => {
            let mut bytes = Vec::new();
            write_via_stream_encoder(event, &mut bytes)?;
            return write_byte_messages(&bytes, w);
        }
        Event::ProgramChange(pc) if pc.bank.is_some() => {
            let mut bytes = Vec::new();
            write_via_stream_encoder(event, &mut bytes)?;
            return write_byte_messages(&bytes, w);
        }
        _ => {}
    }
    let status = match event.raw_status_byte() {
        Some(status) => status,
        None => unsupported!(format!(
            "{:?} cannot be stored in a MIDI file track",
            event.kind()
        )),
    };
    w.write_status_byte(status)?;
    if let Some(data) = event.raw_data_bytes() {
        let mut bytes = Vec::with_capacity(2);
        data.push_onto(&mut bytes);
        w.write_all(&bytes).context(wr!())?;
    }
    Ok(())
}

fn write_via_stream_encoder(event: &Event, out: &mut Vec<u8>) -> LibResult<()> {
    match crate::midi1::encode(event, out) {
        Ok(()) => Ok(()),
        Err(_) => unsupported!(format!(
            "{:?} cannot be stored in a MIDI file track",
            event.kind()
        )),
    }
}

fn write_byte_messages<W: Write>(bytes: &[u8], w: &mut Scribe<W>) -> LibResult<()> {
    let mut ix = 0;
    while ix < bytes.len() {
        let status = bytes[ix];
        let data_len = match status >> 4 {
            0xc | 0xd => 1,
            _ => 2,
        };
        w.write_status_byte(status)?;
        w.write_all(&bytes[ix + 1..ix + 1 + data_len]).context(wr!())?;
        ix += 1 + data_len;
    }
    Ok(())
}
