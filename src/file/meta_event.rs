use crate::byte_iter::ByteIter;
use crate::core::{U4, U7};
use crate::error::{self, LibResult};
use crate::file::TimeSignatureValue;
use crate::scribe::Scribe;
use crate::vlq::Vlq;
use log::warn;
use snafu::ResultExt;
use std::borrow::Cow;
use std::convert::TryFrom;
use std::io::{Read, Write};
use std::str::from_utf8;

/// Meta events only exist in the MIDI File Spec. Here is what it says about them:
/// A few meta-events are defined herein. It is not required for every program to support every
/// meta-event.
///
/// In the syntax descriptions for each of the meta-events a set of conventions is used to
/// describe parameters of the events. The FF which begins each event, the type of each event,
/// and the lengths of events which do not have a variable amount of data are given directly in
/// hexadecimal. A notation such as dd or se, which consists of two lower-case letters,
/// mnemonically represents an 8-bit value. Four identical lower-case letters such as wwww
/// refer to a 16-bit value, stored most-significant-byte first. Six identical lower-case
/// letters such as tttttt refer to a 24-bit value, stored most-significant-byte first. The
/// notation len refers to the length portion of the meta-event syntax, that is, a number,
/// stored as a variable-length quantity, which specifies how many data bytes follow it in the
/// meta-event.
///
/// In general, meta-events in a track which occur at the same time may occur in any order. If
/// a copyright event is used, it should be placed as early as possible in the file, so it will
/// be noticed easily. Sequence Number and Sequence/Track Name events, if present, must appear
/// at time 0. An end-of-track event must occur as the last event in the track.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum MetaEvent {
    /// `FF 00 02 ssss` (or `FF 00 00`): This optional event, which must occur at the
    /// beginning of a track, before any nonzero delta-times, and before any transmittable
    /// MIDI events, specifies the number of a sequence. In a format 2 MIDI file, it is used to
    /// identify each "pattern". `None` preserves the short zero-length form.
    SequenceNumber(Option<u16>),

    /// `FF 01 len text`: Any amount of text describing anything.
    OtherText(Text),

    /// `FF 02 len text`: Contains a copyright notice as printable ASCII text.
    Copyright(Text),

    /// `FF 03 len text`: If in a format 0 track, or the first track in a format 1 file, the
    /// name of the sequence. Otherwise, the name of the track.
    TrackName(Text),

    /// `FF 04 len text`: A description of the type of instrumentation to be used in that
    /// track.
    InstrumentName(Text),

    /// `FF 05 len text`: A lyric to be sung. Generally, each syllable will be a separate
    /// lyric event which begins at the event's time.
    Lyric(Text),

    /// `FF 06 len text`: Normally in a format 0 track, or the first track in a format 1
    /// file. The name of that point in the sequence, such as a rehearsal letter or section
    /// name ("First Verse", etc.).
    Marker(Text),

    /// `FF 07 len text`: A description of something happening on a film or video screen or
    /// stage at that point in the musical score ("Car crashes into house", "curtain opens",
    /// ...)
    CuePoint(Text),

    /// `FF 08 len text`: The name of the program (i.e. patch) used to play the track.
    ProgramName(Text),

    /// `FF 09 len text`: The name of the MIDI device (port) where the track is routed.
    DeviceName(Text),

    /// `FF 20 01 cc`: The MIDI channel (0-15) contained in this event may be used to
    /// associate a MIDI channel with all events which follow, including System Exclusive and
    /// meta-events. This channel is "effective" until the next normal MIDI event (which
    /// contains a channel) or the next MIDI Channel Prefix meta-event.
    MidiChannelPrefix(U4),

    /// `FF 21 01 pp`: An obsolete but widespread port prefix, naming the output port the
    /// track should be routed to.
    PortPrefix(U7),

    /// `FF 2F 00`: This event is not optional. It is included so that an exact ending point
    /// may be specified for the track, so that it has an exact length, which is necessary for
    /// tracks which are looped or concatenated.
    EndOfTrack,

    /// `FF 51 03 tttttt`: Set Tempo, in microseconds per MIDI quarter-note. This event
    /// indicates a tempo change. Representing tempos as time per beat instead of beat per
    /// time allows absolutely exact long-term synchronization with a time-based sync protocol
    /// such as SMPTE time code or MIDI time code.
    SetTempo(MicrosecondsPerQuarter),

    /// `FF 54 05 hr mn se fr ff`: This event, if present, designates the SMPTE time at which
    /// the track chunk is supposed to start. The hour must be encoded with the SMPTE format,
    /// just as it is in MIDI Time Code. The ff field contains fractional frames, in 100ths of
    /// a frame.
    SmpteOffset(SmpteOffsetValue),

    /// `FF 58 04 nn dd cc bb`: see [`TimeSignatureValue`].
    TimeSignature(TimeSignatureValue),

    /// `FF 59 02 sf mi`:
    /// ```text
    /// sf = -7: 7 flats
    /// sf = -1: 1 flat
    /// sf =  0: key of C
    /// sf =  1: 1 sharp
    /// sf =  7: 7 sharps
    /// -----------------
    /// mi = 0: major key
    /// mi = 1: minor key
    /// ```
    KeySignature(KeySignatureValue),

    /// `FF 60 01 tt`: The XMF patch type prefix, declaring whether the following program
    /// changes select General MIDI 1 (1), General MIDI 2 (2) or XMF extension (0) patches.
    XmfPatchTypePrefix(u8),

    /// `FF 7F len data`: Special requirements for particular sequencers may use this event
    /// type: the first byte or bytes of data is a manufacturer ID. We keep the payload
    /// verbatim.
    SequencerSpecific(Vec<u8>),

    /// Any meta type this library does not recognize, preserved verbatim so that files
    /// round-trip.
    UnrecognizedMeta { meta_type: u8, data: Vec<u8> },
}

impl Default for MetaEvent {
    fn default() -> Self {
        MetaEvent::EndOfTrack
    }
}

pub(crate) const META_SEQUENCE_NUM: u8 = 0x00;
pub(crate) const META_TEXT: u8 = 0x01;
pub(crate) const META_COPYRIGHT: u8 = 0x02;
pub(crate) const META_TRACK_NAME: u8 = 0x03;
pub(crate) const META_INSTR_NAME: u8 = 0x04;
pub(crate) const META_LYRIC: u8 = 0x05;
pub(crate) const META_MARKER: u8 = 0x06;
pub(crate) const META_CUE_POINT: u8 = 0x07;
pub(crate) const META_PROG_NAME: u8 = 0x08;
pub(crate) const META_DEVICE_NAME: u8 = 0x09;
pub(crate) const META_CHAN_PREFIX: u8 = 0x20;
pub(crate) const META_PORT: u8 = 0x21;
pub(crate) const META_END_OF_TRACK: u8 = 0x2f;
pub(crate) const META_SET_TEMPO: u8 = 0x51;
pub(crate) const META_SMTPE_OFFSET: u8 = 0x54;
pub(crate) const META_TIME_SIG: u8 = 0x58;
pub(crate) const META_KEY_SIG: u8 = 0x59;
pub(crate) const META_XMF_PATCH_TYPE: u8 = 0x60;
pub(crate) const META_SEQ_SPECIFIC: u8 = 0x7f;

pub(crate) const LEN_META_CHAN_PREFIX: u8 = 1;
pub(crate) const LEN_META_PORT: u8 = 1;
pub(crate) const LEN_META_END_OF_TRACK: u8 = 0;
pub(crate) const LEN_META_SET_TEMPO: u8 = 3;
pub(crate) const LEN_META_SMTPE_OFFSET: u8 = 5;
pub(crate) const LEN_META_TIME_SIG: u8 = 4;
pub(crate) const LEN_META_KEY_SIG: u8 = 2;
pub(crate) const LEN_META_XMF_PATCH_TYPE: u8 = 1;

impl MetaEvent {
    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_expect(0xff).context(io!())?;
        let meta_type_byte = iter.read_or_die().context(io!())?;
        match meta_type_byte {
            META_SEQUENCE_NUM => Self::parse_sequence_number(iter),
            META_TEXT..=META_DEVICE_NAME => Self::parse_text(iter),
            META_CHAN_PREFIX => {
                iter.read_expect(LEN_META_CHAN_PREFIX).context(io!())?;
                let value = iter.read_or_die().context(io!())?;
                Ok(MetaEvent::MidiChannelPrefix(U4::checked(value)?))
            }
            META_PORT => {
                iter.read_expect(LEN_META_PORT).context(io!())?;
                let value = iter.read_or_die().context(io!())?;
                Ok(MetaEvent::PortPrefix(U7::checked(value)?))
            }
            META_END_OF_TRACK => {
                // after 0x2f we should see 0x00
                iter.read_expect(LEN_META_END_OF_TRACK).context(io!())?;
                Ok(MetaEvent::EndOfTrack)
            }
            META_SET_TEMPO => Ok(MetaEvent::SetTempo(MicrosecondsPerQuarter::parse(iter)?)),
            META_SMTPE_OFFSET => Ok(MetaEvent::SmpteOffset(SmpteOffsetValue::parse(iter)?)),
            META_TIME_SIG => Ok(MetaEvent::TimeSignature(TimeSignatureValue::parse(iter)?)),
            META_KEY_SIG => Ok(MetaEvent::KeySignature(KeySignatureValue::parse(iter)?)),
            META_XMF_PATCH_TYPE => {
                iter.read_expect(LEN_META_XMF_PATCH_TYPE).context(io!())?;
                Ok(MetaEvent::XmfPatchTypePrefix(
                    iter.read_or_die().context(io!())?,
                ))
            }
            META_SEQ_SPECIFIC => {
                let length = iter.read_vlq_u32().context(io!())?;
                Ok(MetaEvent::SequencerSpecific(
                    iter.read_n(length as usize).context(io!())?,
                ))
            }
            _ => {
                let length = iter.read_vlq_u32().context(io!())?;
                let data = iter.read_n(length as usize).context(io!())?;
                Ok(MetaEvent::UnrecognizedMeta {
                    meta_type: meta_type_byte,
                    data,
                })
            }
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        w.write_status_byte(0xff)?;
        match self {
            MetaEvent::SequenceNumber(value) => {
                write_u8!(w, META_SEQUENCE_NUM)?;
                match value {
                    None => write_u8!(w, 0),
                    Some(number) => {
                        write_u8!(w, 2)?;
                        w.write_all(&number.to_be_bytes()).context(wr!())
                    }
                }
            }
            MetaEvent::OtherText(s) => write_text(w, META_TEXT, s),
            MetaEvent::Copyright(s) => write_text(w, META_COPYRIGHT, s),
            MetaEvent::TrackName(s) => write_text(w, META_TRACK_NAME, s),
            MetaEvent::InstrumentName(s) => write_text(w, META_INSTR_NAME, s),
            MetaEvent::Lyric(s) => write_text(w, META_LYRIC, s),
            MetaEvent::Marker(s) => write_text(w, META_MARKER, s),
            MetaEvent::CuePoint(s) => write_text(w, META_CUE_POINT, s),
            MetaEvent::ProgramName(s) => write_text(w, META_PROG_NAME, s),
            MetaEvent::DeviceName(s) => write_text(w, META_DEVICE_NAME, s),
            MetaEvent::MidiChannelPrefix(channel) => {
                write_u8!(w, META_CHAN_PREFIX)?;
                write_u8!(w, LEN_META_CHAN_PREFIX)?;
                write_u8!(w, channel.get())
            }
            MetaEvent::PortPrefix(port) => {
                write_u8!(w, META_PORT)?;
                write_u8!(w, LEN_META_PORT)?;
                write_u8!(w, port.get())
            }
            MetaEvent::EndOfTrack => {
                write_u8!(w, META_END_OF_TRACK)?;
                write_u8!(w, LEN_META_END_OF_TRACK)
            }
            MetaEvent::SetTempo(value) => {
                write_u8!(w, META_SET_TEMPO)?;
                write_u8!(w, LEN_META_SET_TEMPO)?;
                // a big-endian u24: take the low three bytes of the u32
                let bytes = u32::to_be_bytes(value.get());
                w.write_all(&bytes[1..]).context(wr!())
            }
            MetaEvent::SmpteOffset(value) => value.write(w),
            MetaEvent::TimeSignature(value) => value.write(w),
            MetaEvent::KeySignature(value) => value.write(w),
            MetaEvent::XmfPatchTypePrefix(value) => {
                write_u8!(w, META_XMF_PATCH_TYPE)?;
                write_u8!(w, LEN_META_XMF_PATCH_TYPE)?;
                write_u8!(w, *value)
            }
            MetaEvent::SequencerSpecific(data) => {
                write_u8!(w, META_SEQ_SPECIFIC)?;
                write_data(w, data)
            }
            MetaEvent::UnrecognizedMeta { meta_type, data } => {
                write_u8!(w, *meta_type)?;
                write_data(w, data)
            }
        }
    }

    fn parse_sequence_number<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        let length = iter.read_vlq_u32().context(io!())?;
        match length {
            0 => Ok(MetaEvent::SequenceNumber(None)),
            2 => Ok(MetaEvent::SequenceNumber(Some(
                iter.read_u16().context(io!())?,
            ))),
            _ => malformed!(
                iter.position(),
                "sequence number meta event with length {}",
                length
            ),
        }
    }

    pub(crate) fn parse_text<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        // we should be on a type-byte with a value between 0x01 and 0x09 (the text range).
        let text_type = iter.current().ok_or_else(|| {
            malformed_e!(iter.position(), "expected a text meta type byte")
        })?;
        let s = Text::parse(iter)?;
        match text_type {
            META_TEXT => Ok(MetaEvent::OtherText(s)),
            META_COPYRIGHT => Ok(MetaEvent::Copyright(s)),
            META_TRACK_NAME => Ok(MetaEvent::TrackName(s)),
            META_INSTR_NAME => Ok(MetaEvent::InstrumentName(s)),
            META_LYRIC => Ok(MetaEvent::Lyric(s)),
            META_MARKER => Ok(MetaEvent::Marker(s)),
            META_CUE_POINT => Ok(MetaEvent::CuePoint(s)),
            META_PROG_NAME => Ok(MetaEvent::ProgramName(s)),
            META_DEVICE_NAME => Ok(MetaEvent::DeviceName(s)),
            _ => malformed!(iter.position(), "bad text meta type {:#04X}", text_type),
        }
    }
}

fn write_text<W: Write>(w: &mut Scribe<W>, text_type: u8, text: &Text) -> LibResult<()> {
    write_u8!(w, text_type)?;
    text.write(w)
}

fn write_data<W: Write>(w: &mut Scribe<W>, data: &[u8]) -> LibResult<()> {
    let size_u32 =
        u32::try_from(data.len()).map_err(|_| error::StringTooLong { site: site!() }.build())?;
    let size = Vlq::new(size_u32).to_bytes();
    w.write_all(&size).context(wr!())?;
    w.write_all(data).context(wr!())?;
    Ok(())
}

/// The payload of the nine text meta events. The file format stores bare bytes and never
/// declares an encoding, so the bytes are kept exactly as read and written back verbatim; the
/// string views are best-effort UTF-8.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Text {
    bytes: Vec<u8>,
}

impl Text {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self {
            bytes: s.into().into_bytes(),
        }
    }

    /// The payload exactly as it is stored in the file.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the stored bytes are valid UTF-8.
    pub fn is_utf8(&self) -> bool {
        from_utf8(&self.bytes).is_ok()
    }

    /// The text as a string, with any non-UTF-8 sequences replaced.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        let length = iter.read_vlq_u32().context(io!())?;
        let bytes = iter.read_n(length as usize).context(io!())?;
        if from_utf8(&bytes).is_err() {
            warn!("text meta payload is not utf-8, keeping the raw bytes");
        }
        Ok(Self { bytes })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_data(w, &self.bytes)
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.as_str(), f)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self {
            bytes: s.into_bytes(),
        }
    }
}

impl From<Vec<u8>> for Text {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// Caution: lossy when the stored bytes are not UTF-8.
impl From<Text> for String {
    fn from(text: Text) -> Self {
        text.as_str().into_owned()
    }
}

/// The payload of a SMPTE offset meta event. The five bytes are kept as read; the hour byte
/// also carries the frame rate in its top bits (`0rrhhhhh`), just as in MIDI Time Code.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteOffsetValue {
    pub hr: u8,
    pub mn: u8,
    pub se: u8,
    pub fr: u8,
    pub ff: u8,
}

impl SmpteOffsetValue {
    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_expect(LEN_META_SMTPE_OFFSET).context(io!())?;
        let value = Self {
            hr: iter.read_or_die().context(io!())?,
            mn: iter.read_or_die().context(io!())?,
            se: iter.read_or_die().context(io!())?,
            fr: iter.read_or_die().context(io!())?,
            ff: iter.read_or_die().context(io!())?,
        };
        if !value.is_consistent() {
            // some writers emit frame numbers beyond the carried rate; keep the value as-is
            warn!(
                "smpte offset frame {} exceeds the {} fps rate",
                value.fr,
                value.frames_per_second()
            );
        }
        Ok(value)
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_u8!(w, META_SMTPE_OFFSET)?;
        write_u8!(w, LEN_META_SMTPE_OFFSET)?;
        write_u8!(w, self.hr)?;
        write_u8!(w, self.mn)?;
        write_u8!(w, self.se)?;
        write_u8!(w, self.fr)?;
        write_u8!(w, self.ff)?;
        Ok(())
    }

    /// The hour with the rate bits masked off.
    pub fn hours(&self) -> u8 {
        self.hr & 0x1f
    }

    /// The frame rate carried in the hour byte's bits 5-6.
    pub fn frames_per_second(&self) -> u8 {
        match (self.hr >> 5) & 0x03 {
            0 => 24,
            1 => 25,
            _ => 30,
        }
    }

    /// Whether the stored fields are within range for the carried rate. Out-of-range values
    /// are tolerated on parse and written back unchanged; this accessor lets a caller flag
    /// them.
    pub fn is_consistent(&self) -> bool {
        self.hours() <= 23
            && self.mn <= 59
            && self.se <= 59
            && self.fr < self.frames_per_second()
            && self.ff <= 99
    }
}

/// The key signature's accidental count: -7 (seven flats) through 7 (seven sharps).
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct KeyAccidentals(i8);

impl KeyAccidentals {
    /// Silently clamps out-of-range values.
    pub const fn new(value: i8) -> Self {
        if value < -7 {
            Self(-7)
        } else if value > 7 {
            Self(7)
        } else {
            Self(value)
        }
    }

    pub const fn get(&self) -> i8 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum KeyMode {
    Major,
    Minor,
}

impl Default for KeyMode {
    fn default() -> Self {
        KeyMode::Major
    }
}

/// The payload of a key signature meta event.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct KeySignatureValue {
    pub accidentals: KeyAccidentals,
    pub mode: KeyMode,
}

impl KeySignatureValue {
    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_expect(LEN_META_KEY_SIG).context(io!())?;
        let raw_accidentals_byte = iter.read_or_die().context(io!())?;
        Ok(Self {
            accidentals: KeyAccidentals::new(raw_accidentals_byte as i8),
            mode: match iter.read_or_die().context(io!())? {
                1 => KeyMode::Minor,
                _ => KeyMode::Major,
            },
        })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        write_u8!(w, META_KEY_SIG)?;
        write_u8!(w, LEN_META_KEY_SIG)?;
        write_u8!(w, self.accidentals.get() as u8)?;
        write_u8!(w, self.mode as u8)?;
        Ok(())
    }
}

pub(crate) const DEFAULT_MICROSECONDS_PER_QUARTER: u32 = 500_000;
pub(crate) const MAX_24BIT_UINT_VALUE: u32 = 16_777_215;

/// In MIDI, tempos are given as microseconds per quarter note. Tempo microseconds are given by
/// a 3-byte integer, hence the weird upper bound (16,777,215). The default tempo is 120 beats
/// per minute, which is `500_000` microseconds per beat. The minimum value is `1` since `0`
/// microseconds per beat would be an infinitely fast tempo.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct MicrosecondsPerQuarter(u32);

impl MicrosecondsPerQuarter {
    /// Silently clamps the value into `1..=16_777_215`.
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self(1)
        } else if value > MAX_24BIT_UINT_VALUE {
            Self(MAX_24BIT_UINT_VALUE)
        } else {
            Self(value)
        }
    }

    pub const fn get(&self) -> u32 {
        self.0
    }

    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_expect(LEN_META_SET_TEMPO).context(io!())?;
        let bytes = iter.read_n(LEN_META_SET_TEMPO as usize).context(io!())?;
        // bytes is a big-endian u24. fit it into a big-endian u32 then parse it
        let beu32 = [0u8, bytes[0], bytes[1], bytes[2]];
        Ok(MicrosecondsPerQuarter::new(u32::from_be_bytes(beu32)))
    }
}

impl Default for MicrosecondsPerQuarter {
    fn default() -> Self {
        Self(DEFAULT_MICROSECONDS_PER_QUARTER)
    }
}

impl std::fmt::Display for MicrosecondsPerQuarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A more convenient way to specify tempo, not part of the MIDI file spec. This is closer to
/// the way we think of tempo, e.g. "120 Beats per Minute". This type is locked to
/// quarter-notes, so you will have to translate if your "beat" is not a quarter note.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct QuartersPerMinute(u8);

impl QuartersPerMinute {
    /// Silently clamps zero to one.
    pub const fn new(value: u8) -> Self {
        if value == 0 {
            Self(1)
        } else {
            Self(value)
        }
    }

    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl Default for QuartersPerMinute {
    fn default() -> Self {
        Self(120)
    }
}

impl From<QuartersPerMinute> for MicrosecondsPerQuarter {
    fn from(quarters: QuartersPerMinute) -> Self {
        // 1 minute ÷ bpm => minutes per beat, × 60 seconds, × 1,000,000 microseconds
        MicrosecondsPerQuarter::new(60_000_000 / quarters.get() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_conversion() {
        assert_eq!(
            MicrosecondsPerQuarter::new(500_000),
            QuartersPerMinute::new(120).into()
        );
        assert_eq!(
            MicrosecondsPerQuarter::new(652_173),
            QuartersPerMinute::new(92).into()
        );
    }

    #[test]
    fn smpte_offset_rate_bits() {
        // 30 fps (rate code 3), hour 2
        let value = SmpteOffsetValue {
            hr: 0b0110_0010,
            mn: 22,
            se: 34,
            fr: 1,
            ff: 0,
        };
        assert_eq!(2, value.hours());
        assert_eq!(30, value.frames_per_second());
        assert!(value.is_consistent());
        let bad = SmpteOffsetValue {
            fr: 30,
            ..value
        };
        assert!(!bad.is_consistent());
    }

    #[test]
    fn accidentals_clamp() {
        assert_eq!(-7, KeyAccidentals::new(-9).get());
        assert_eq!(7, KeyAccidentals::new(9).get());
        assert_eq!(-2, KeyAccidentals::new(-2).get());
    }
}
