use crate::byte_iter::ByteIter;
use crate::core::{Event, U4};
use crate::error::LibResult;
use crate::scribe::Scribe;
use crate::vlq::Vlq;
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::{Read, Write};

/// `<sysex event>` is used to specify a MIDI system exclusive message, either as one unit or
/// in packets, or as an "escape" to specify any arbitrary bytes to be transmitted. A normal
/// complete system exclusive message is stored as the `F0` form; the `F7` form carries
/// continuation packets or arbitrary escape bytes. The payload is preserved verbatim
/// (including any trailing `F7` terminator) so that files round-trip exactly.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SysexEvent {
    t: SysexEventType,
    data: Vec<u8>,
}

impl SysexEvent {
    pub fn new(t: SysexEventType, data: Vec<u8>) -> Self {
        Self { t, data }
    }

    pub fn event_type(&self) -> SysexEventType {
        self.t
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Interpret this file event as a realtime system exclusive event, when it is a complete
    /// `F0 ... F7` message. Continuation packets and escapes return `None`.
    pub fn to_core_event(&self) -> Option<Event> {
        if self.t != SysexEventType::F0 {
            return None;
        }
        match self.data.split_last() {
            Some((&0xf7, payload)) => {
                crate::midi1::classify_sysex7(U4::new(0), payload, 0).ok()
            }
            _ => None,
        }
    }

    pub(crate) fn parse<R: Read>(first_byte: u8, iter: &mut ByteIter<R>) -> LibResult<Self> {
        iter.read_expect(first_byte).context(io!())?;
        let t = SysexEventType::from_u8(first_byte, iter.position())?;
        let length = iter.read_vlq_u32().context(io!())?;
        let data = iter.read_n(length as usize).context(io!())?;
        Ok(Self { t, data })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        w.write_status_byte(self.t as u8)?;
        let length = u32::try_from(self.data.len())
            .map_err(|_| crate::error::StringTooLong { site: site!() }.build())?;
        w.write_all(&Vlq::new(length).to_bytes()).context(wr!())?;
        w.write_all(&self.data).context(wr!())?;
        Ok(())
    }
}

/// The two forms a system exclusive event can take in a MIDI file.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum SysexEventType {
    /// `F0 <length> <bytes to be transmitted after F0>`
    ///
    /// The length is stored as a variable-length quantity. It specifies the number of bytes
    /// which follow it, not including the F0 or the length itself. For instance, the
    /// transmitted message `F0 43 12 00 07 F7` would be stored in a MIDI File as
    /// `F0 05 43 12 00 07 F7`. It is required to include the `F7` at the end so that the
    /// reader of the MIDI File knows that it has read the entire message.
    F0 = 0xf0,

    /// `F7 <length> <all bytes to be transmitted>`
    ///
    /// Some synthesiser manufacturers specify that their system exclusive messages are to be
    /// transmitted as little packets. Each packet is only part of an entire syntactical
    /// system exclusive message, but the times they are transmitted are important. The F0 and
    /// F7 sysex events may be used together to break up syntactically complete system
    /// exclusive messages into timed packets: an F0 sysex event for the first packet and F7
    /// sysex events for the remainder. The F7 form may also carry any arbitrary escape bytes.
    F7 = 0xf7,
}

impl Default for SysexEventType {
    fn default() -> Self {
        SysexEventType::F0
    }
}

impl SysexEventType {
    fn from_u8(value: u8, offset: u64) -> LibResult<Self> {
        match value {
            0xf0 => Ok(SysexEventType::F0),
            0xf7 => Ok(SysexEventType::F7),
            _ => malformed!(offset, "bad sysex event introducer {:#04x}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventKind, ManufacturerId};
    use std::io::Cursor;

    #[test]
    fn parse_and_convert() {
        // F0 05 43 12 00 07 F7 from the file spec's example
        let bytes = [0xf0u8, 0x05, 0x43, 0x12, 0x00, 0x07, 0xf7];
        let cursor = Cursor::new(bytes);
        let mut iter = ByteIter::new(cursor.bytes()).unwrap();
        let sysex = SysexEvent::parse(0xf0, &mut iter).unwrap();
        assert_eq!(SysexEventType::F0, sysex.event_type());
        assert_eq!(&[0x43, 0x12, 0x00, 0x07, 0xf7], sysex.data());
        let event = sysex.to_core_event().unwrap();
        assert_eq!(EventKind::SysEx7, event.kind());
        match event {
            Event::SysEx7(s) => {
                assert_eq!(ManufacturerId::standard(0x43).unwrap(), s.manufacturer);
                assert_eq!(vec![0x12, 0x00, 0x07], s.data);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn escape_form_has_no_core_event() {
        let sysex = SysexEvent::new(SysexEventType::F7, vec![0x01, 0x02]);
        assert!(sysex.to_core_event().is_none());
    }
}
