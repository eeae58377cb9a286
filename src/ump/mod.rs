/*!
The `ump` module is the Universal MIDI Packet codec. Every packet begins with a 32-bit word
whose most-significant nibble is the message type; the message type alone determines how many
words the packet occupies, so the decoder always consumes exactly one packet and never peeks
beyond it.

| MT  | Words | Semantics                                   |
|-----|-------|---------------------------------------------|
| 0x0 | 1     | Utility (NoOp, JR clock, JR timestamp)      |
| 0x1 | 1     | System common / realtime                    |
| 0x2 | 1     | MIDI 1.0 channel voice                      |
| 0x3 | 2     | 7-bit system exclusive                      |
| 0x4 | 2     | MIDI 2.0 channel voice                      |
| 0x5 | 4     | 8-bit system exclusive and mixed data sets  |
| 0xD | 4     | Flex data (pass-through)                    |
| 0xF | 4     | Stream messages (pass-through)              |

The remaining message types are reserved; their packets pass through as
[`crate::core::Event::Unrecognized`] with the word count the specification reserves for them.
!*/

mod decode;
mod encode;

pub use decode::{decode_ump, decode_ump_with, UmpDecoder, UmpStream};
pub use encode::encode_ump;

/// Which protocol's channel-voice packets to emit: the MIDI 1.0 messages carried in UMP
/// (message type `0x2`) or the MIDI 2.0 channel voice messages (message type `0x4`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Protocol {
    Midi1,
    Midi2,
}

/// Settings for the UMP decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct UmpSettings {
    /// Cap on the bytes buffered per group while reassembling a multi-packet system
    /// exclusive message. Exceeding it is a `Malformed` error and resets that group.
    pub sysex_byte_limit: usize,
    /// When true (the default), a MIDI-1-in-UMP `Note On` with velocity zero is normalised to
    /// `Note Off`. MIDI 2.0 channel voice packets are never translated.
    pub translate_zero_velocity_note_on: bool,
    /// When false, flex data packets (MT `0xD`) produce `Unsupported` instead of passing
    /// through.
    pub flex_data: bool,
    /// When false, stream message packets (MT `0xF`) produce `Unsupported` instead of
    /// passing through.
    pub stream_messages: bool,
}

impl Default for UmpSettings {
    fn default() -> Self {
        Self {
            sysex_byte_limit: 65_536,
            translate_zero_velocity_note_on: true,
            flex_data: true,
            stream_messages: true,
        }
    }
}

/// The number of 32-bit words a packet occupies, determined entirely by its message type
/// nibble.
pub fn word_count(message_type: u8) -> usize {
    const TABLE: [usize; 16] = [1, 1, 1, 2, 2, 4, 1, 1, 2, 2, 2, 3, 3, 4, 4, 4];
    TABLE[(message_type & 0x0f) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_counts() {
        assert_eq!(1, word_count(0x0));
        assert_eq!(1, word_count(0x1));
        assert_eq!(1, word_count(0x2));
        assert_eq!(2, word_count(0x3));
        assert_eq!(2, word_count(0x4));
        assert_eq!(4, word_count(0x5));
        assert_eq!(3, word_count(0xb));
        assert_eq!(4, word_count(0xd));
        assert_eq!(4, word_count(0xf));
    }
}
