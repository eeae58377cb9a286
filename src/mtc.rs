/*!
The `mtc` module decodes MIDI Time Code into SMPTE timecode. Timecode arrives either as eight
interleaved quarter-frame messages, each carrying a 3-bit piece index and one nibble of the
value, or as a single full-frame universal system exclusive message.

The eight quarter-frame pieces encode, in order: frames LSB, frames MSB, seconds LSB, seconds
MSB, minutes LSB, minutes MSB, hours LSB, and the rate bits together with the hours MSB. Eight
quarter frames span exactly two frames of timecode, so a freshly assembled value is two frames
behind the transport; the decoder compensates with a ±2-frame offset in the direction of
travel.

The decoder never returns errors: input it cannot use is ignored, and the register bank heals
itself as soon as eight in-order quarter frames arrive again.
!*/

use crate::core::{Event, TimecodeQuarterFrame, UniversalKind, UniversalSysEx7};
use log::trace;
use std::sync::{Arc, Mutex};

/// The four frame rates MIDI Time Code can carry, as the 2-bit code in piece 7 and in the
/// full-frame hour byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MtcRate {
    Fps24,
    Fps25,
    /// 29.97 fps drop-frame.
    Fps29_97Drop,
    Fps30,
}

impl MtcRate {
    fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => MtcRate::Fps24,
            1 => MtcRate::Fps25,
            2 => MtcRate::Fps29_97Drop,
            _ => MtcRate::Fps30,
        }
    }

    /// The nominal frame count per second (drop-frame counts 30 nominal frames).
    pub fn fps(&self) -> u8 {
        match self {
            MtcRate::Fps24 => 24,
            MtcRate::Fps25 => 25,
            MtcRate::Fps29_97Drop | MtcRate::Fps30 => 30,
        }
    }

    fn is_drop(&self) -> bool {
        matches!(self, MtcRate::Fps29_97Drop)
    }

    /// The local rate that carries this MTC rate unchanged.
    pub fn direct_equivalent(&self) -> TimecodeRate {
        match self {
            MtcRate::Fps24 => TimecodeRate::Fps24,
            MtcRate::Fps25 => TimecodeRate::Fps25,
            MtcRate::Fps29_97Drop => TimecodeRate::Fps29_97Drop,
            MtcRate::Fps30 => TimecodeRate::Fps30,
        }
    }
}

/// A local timecode rate. MTC itself only transmits the four base rates; the doubled family
/// is reachable by scaling when the base rate matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TimecodeRate {
    Fps24,
    Fps25,
    Fps29_97Drop,
    Fps30,
    Fps48,
    Fps50,
    Fps59_94Drop,
    Fps60,
}

impl TimecodeRate {
    /// The MTC base rate this local rate scales from, and the frame multiplier.
    pub fn base(&self) -> (MtcRate, u8) {
        match self {
            TimecodeRate::Fps24 => (MtcRate::Fps24, 1),
            TimecodeRate::Fps25 => (MtcRate::Fps25, 1),
            TimecodeRate::Fps29_97Drop => (MtcRate::Fps29_97Drop, 1),
            TimecodeRate::Fps30 => (MtcRate::Fps30, 1),
            TimecodeRate::Fps48 => (MtcRate::Fps24, 2),
            TimecodeRate::Fps50 => (MtcRate::Fps25, 2),
            TimecodeRate::Fps59_94Drop => (MtcRate::Fps29_97Drop, 2),
            TimecodeRate::Fps60 => (MtcRate::Fps30, 2),
        }
    }

    /// Whether this local rate can represent `rate` by frame-count scaling.
    pub fn is_compatible(&self, rate: MtcRate) -> bool {
        self.base().0 == rate
    }
}

/// An SMPTE timecode value. `subframes` is always expressed in hundredths of a frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub subframes: u8,
}

impl Timecode {
    pub fn new(hours: u8, minutes: u8, seconds: u8, frames: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
            subframes: 0,
        }
    }

    fn same_frame(&self, other: &Timecode) -> bool {
        self.hours == other.hours
            && self.minutes == other.minutes
            && self.seconds == other.seconds
            && self.frames == other.frames
    }
}

impl std::fmt::Display for Timecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.frames, self.subframes
        )
    }
}

/// The direction of the incoming quarter-frame stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Forwards,
    Backwards,
    Ambiguous,
}

/// Where an emitted timecode came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TimecodeSource {
    QuarterFrame,
    FullFrame,
}

/// One emission from the decoder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MtcEmission {
    pub timecode: Timecode,
    /// The local rate the timecode is expressed at.
    pub rate: TimecodeRate,
    pub source: TimecodeSource,
    pub direction: Direction,
    /// Whether the whole-frame part advanced since the previous emission.
    pub frame_changed: bool,
}

/// A shared, cloneable snapshot of the most recent timecode. The decoder refreshes it on
/// every emission; any number of reader threads may poll it.
#[derive(Clone, Debug, Default)]
pub struct TimecodeCell {
    inner: Arc<Mutex<Option<Timecode>>>,
}

impl TimecodeCell {
    /// The most recently emitted timecode, or `None` before the first emission.
    pub fn get(&self) -> Option<Timecode> {
        *self.inner.lock().expect("timecode cell poisoned")
    }

    fn set(&self, value: Option<Timecode>) {
        *self.inner.lock().expect("timecode cell poisoned") = value;
    }
}

/// The MTC decoder state machine.
#[derive(Debug)]
pub struct MtcDecoder {
    /// One nibble register per quarter-frame piece.
    registers: [u8; 8],
    /// Bitmask of pieces received since the last buffer reset.
    received: u8,
    last_piece: Option<u8>,
    direction: Direction,
    rate: MtcRate,
    local_rate: Option<TimecodeRate>,
    /// Whole-timecode snapshot latched from the registers, at the MTC rate.
    captured: Option<Timecode>,
    /// Quarter frames elapsed since the snapshot, signed by direction.
    delta_quarter_frames: i64,
    last_emitted: Option<Timecode>,
    cell: TimecodeCell,
}

impl Default for MtcDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MtcDecoder {
    pub fn new() -> Self {
        Self {
            registers: [0; 8],
            received: 0,
            last_piece: None,
            direction: Direction::Ambiguous,
            rate: MtcRate::Fps30,
            local_rate: None,
            captured: None,
            delta_quarter_frames: 0,
            last_emitted: None,
            cell: TimecodeCell::default(),
        }
    }

    /// Configure a local target rate. When it is compatible with the incoming MTC rate,
    /// emitted frames and subframes are scaled onto it; otherwise emissions fall back to the
    /// MTC rate's direct equivalent.
    pub fn set_local_rate(&mut self, rate: Option<TimecodeRate>) {
        self.local_rate = rate;
    }

    /// The most recently detected MTC rate.
    pub fn rate(&self) -> MtcRate {
        self.rate
    }

    /// The detected stream direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// A cloneable handle other threads can poll for the latest timecode.
    pub fn timecode_cell(&self) -> TimecodeCell {
        self.cell.clone()
    }

    /// Clear the quarter-frame registers and the snapshot. The rate and the last emitted
    /// timecode are kept.
    pub fn reset_qf_buffer(&mut self) {
        self.registers = [0; 8];
        self.received = 0;
        self.last_piece = None;
        self.captured = None;
        self.delta_quarter_frames = 0;
    }

    /// Zero the timecode outputs without clearing the detected rate.
    pub fn reset_timecode_values(&mut self) {
        self.captured = None;
        self.delta_quarter_frames = 0;
        self.last_emitted = None;
        self.cell.set(None);
    }

    /// Feed any event. Quarter frames and MTC full-frame system exclusives advance the state
    /// machine; everything else is ignored.
    pub fn feed(&mut self, event: &Event) -> Option<MtcEmission> {
        match event {
            Event::TimecodeQuarterFrame(qf) => self.feed_quarter_frame(*qf),
            Event::UniversalSysEx7(sysex) => self.feed_full_frame(sysex),
            _ => None,
        }
    }

    /// Feed one quarter frame.
    pub fn feed_quarter_frame(&mut self, qf: TimecodeQuarterFrame) -> Option<MtcEmission> {
        let piece = qf.piece();
        let nibble = qf.nibble();
        trace!("quarter frame piece {} nibble {:#x}", piece, nibble);
        if let Some(last) = self.last_piece {
            self.direction = if piece == (last + 1) % 8 {
                Direction::Forwards
            } else if piece == (last + 7) % 8 {
                Direction::Backwards
            } else {
                Direction::Ambiguous
            };
        }
        self.last_piece = Some(piece);
        self.registers[piece as usize] = nibble;
        self.received |= 1 << piece;
        if piece == 7 {
            self.rate = MtcRate::from_code(nibble >> 1);
        }
        if self.captured.is_some() {
            match self.direction {
                Direction::Forwards => self.delta_quarter_frames += 1,
                Direction::Backwards => self.delta_quarter_frames -= 1,
                Direction::Ambiguous => {}
            }
        }
        let complete = self.received == 0xff;
        // latch a snapshot when the bank first fills, and again at each sync piece
        if complete && (self.captured.is_none() || piece == 0) {
            if let Some(assembled) = self.assemble() {
                self.captured = Some(assembled);
                self.delta_quarter_frames = 0;
            }
        }
        self.emit_quarter_frame()
    }

    /// Feed a full-frame message (`F0 7F <dev> 01 01 hh mm ss ff F7`). Quarter frames may
    /// resume afterwards; the register bank restarts so the next snapshot latches only from
    /// nibbles received after the jump, while the piece ordering and direction state survive.
    pub fn feed_full_frame(&mut self, sysex: &UniversalSysEx7) -> Option<MtcEmission> {
        if sysex.kind != UniversalKind::RealTime
            || sysex.sub_id1.get() != 0x01
            || sysex.sub_id2.get() != 0x01
            || sysex.data.len() < 4
        {
            return None;
        }
        let hour_byte = sysex.data[0];
        self.rate = MtcRate::from_code(hour_byte >> 5);
        let timecode = Timecode::new(
            hour_byte & 0x1f,
            sysex.data[1],
            sysex.data[2],
            sysex.data[3],
        );
        self.registers = [0; 8];
        self.received = 0;
        self.captured = None;
        self.delta_quarter_frames = 0;
        let (scaled, rate) = self.to_local(timecode, 0);
        Some(self.finish_emission(scaled, rate, TimecodeSource::FullFrame))
    }

    fn assemble(&self) -> Option<Timecode> {
        let frames = self.registers[0] | ((self.registers[1] & 0x01) << 4);
        let seconds = self.registers[2] | ((self.registers[3] & 0x03) << 4);
        let minutes = self.registers[4] | ((self.registers[5] & 0x03) << 4);
        let hours = self.registers[6] | ((self.registers[7] & 0x01) << 4);
        // ignore assemblies that are not a valid timecode; the bank heals as pieces repeat
        if frames >= self.rate.fps() || seconds > 59 || minutes > 59 || hours > 23 {
            return None;
        }
        Some(Timecode::new(hours, minutes, seconds, frames))
    }

    fn emit_quarter_frame(&mut self) -> Option<MtcEmission> {
        let captured = self.captured?;
        let forwards = self.direction != Direction::Backwards;
        // compensate for the two-frame latency of the eight-piece window, plus the whole
        // frames that have elapsed since the snapshot
        let window_offset = if forwards { 2 } else { -2 };
        let elapsed_frames = self.delta_quarter_frames.div_euclid(4);
        let adjusted = add_frames(captured, window_offset + elapsed_frames, self.rate);
        let subframes = (self.delta_quarter_frames.rem_euclid(4) * 25) as u8;
        let (scaled, rate) = self.to_local(adjusted, subframes);
        Some(self.finish_emission(scaled, rate, TimecodeSource::QuarterFrame))
    }

    /// Express a timecode at the configured local rate, scaling frame counts when the local
    /// rate is a multiple of the MTC rate.
    fn to_local(&self, timecode: Timecode, subframes: u8) -> (Timecode, TimecodeRate) {
        match self.local_rate {
            Some(local) if local.is_compatible(self.rate) => {
                let (_, multiplier) = local.base();
                let multiplier = multiplier as u16;
                let scaled_frames =
                    timecode.frames as u16 * multiplier + subframes as u16 * multiplier / 100;
                let scaled_subframes = (subframes as u16 * multiplier) % 100;
                (
                    Timecode {
                        frames: scaled_frames as u8,
                        subframes: scaled_subframes as u8,
                        ..timecode
                    },
                    local,
                )
            }
            _ => (
                Timecode {
                    subframes,
                    ..timecode
                },
                self.rate.direct_equivalent(),
            ),
        }
    }

    fn finish_emission(
        &mut self,
        timecode: Timecode,
        rate: TimecodeRate,
        source: TimecodeSource,
    ) -> MtcEmission {
        let frame_changed = match &self.last_emitted {
            Some(last) => !last.same_frame(&timecode),
            None => true,
        };
        self.last_emitted = Some(timecode);
        self.cell.set(Some(timecode));
        MtcEmission {
            timecode,
            rate,
            source,
            direction: self.direction,
            frame_changed,
        }
    }
}

/// Add a signed number of frames to a timecode, wrapping modulo 24 hours and honoring
/// drop-frame counting (frame numbers 0 and 1 do not exist at the start of any minute that is
/// not a multiple of ten).
fn add_frames(timecode: Timecode, delta: i64, rate: MtcRate) -> Timecode {
    let total = timecode_to_frame_number(timecode, rate) + delta;
    let day = frames_per_day(rate);
    frame_number_to_timecode(total.rem_euclid(day), rate)
}

fn frames_per_day(rate: MtcRate) -> i64 {
    let nominal = 24 * 3600 * rate.fps() as i64;
    if rate.is_drop() {
        // two frames dropped per minute, except every tenth minute
        nominal - 24 * (60 - 6) * 2
    } else {
        nominal
    }
}

fn timecode_to_frame_number(timecode: Timecode, rate: MtcRate) -> i64 {
    let fps = rate.fps() as i64;
    let total_minutes = timecode.hours as i64 * 60 + timecode.minutes as i64;
    let nominal = ((timecode.hours as i64 * 3600
        + timecode.minutes as i64 * 60
        + timecode.seconds as i64)
        * fps)
        + timecode.frames as i64;
    if rate.is_drop() {
        nominal - 2 * (total_minutes - total_minutes / 10)
    } else {
        nominal
    }
}

fn frame_number_to_timecode(frame_number: i64, rate: MtcRate) -> Timecode {
    let fps = rate.fps() as i64;
    let mut frame = frame_number;
    if rate.is_drop() {
        // reinsert the dropped frame numbers, then decode as if non-drop
        const FRAMES_PER_10_MINUTES: i64 = 17_982;
        const FRAMES_PER_MINUTE: i64 = 1_798;
        let ten_minute_blocks = frame / FRAMES_PER_10_MINUTES;
        let remainder = frame % FRAMES_PER_10_MINUTES;
        let extra_minutes = if remainder < 2 {
            0
        } else {
            (remainder - 2) / FRAMES_PER_MINUTE
        };
        frame += 18 * ten_minute_blocks + 2 * extra_minutes;
    }
    Timecode::new(
        ((frame / (3600 * fps)) % 24) as u8,
        ((frame / (60 * fps)) % 60) as u8,
        ((frame / fps) % 60) as u8,
        (frame % fps) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{U4, U7};

    /// The eight quarter-frame data bytes for a timecode at the given rate code.
    fn quarter_frames(timecode: Timecode, rate_code: u8) -> [u8; 8] {
        let nibbles = [
            timecode.frames & 0x0f,
            (timecode.frames >> 4) & 0x01,
            timecode.seconds & 0x0f,
            (timecode.seconds >> 4) & 0x03,
            timecode.minutes & 0x0f,
            (timecode.minutes >> 4) & 0x03,
            timecode.hours & 0x0f,
            ((timecode.hours >> 4) & 0x01) | (rate_code << 1),
        ];
        let mut bytes = [0u8; 8];
        for (piece, nibble) in nibbles.iter().enumerate() {
            bytes[piece] = ((piece as u8) << 4) | nibble;
        }
        bytes
    }

    fn feed_bytes(decoder: &mut MtcDecoder, bytes: &[u8]) -> Vec<MtcEmission> {
        bytes
            .iter()
            .filter_map(|&byte| {
                decoder.feed_quarter_frame(TimecodeQuarterFrame {
                    group: U4::new(0),
                    data_byte: U7::new(byte),
                })
            })
            .collect()
    }

    #[test]
    fn eight_quarter_frames_latch_and_emit_with_offset() {
        let mut decoder = MtcDecoder::new();
        let bytes = quarter_frames(Timecode::new(2, 22, 34, 1), 0b11);
        let emissions = feed_bytes(&mut decoder, &bytes);
        assert_eq!(MtcRate::Fps30, decoder.rate());
        assert_eq!(1, emissions.len());
        let emission = &emissions[0];
        assert_eq!(Timecode::new(2, 22, 34, 3), emission.timecode);
        assert_eq!(TimecodeSource::QuarterFrame, emission.source);
        assert_eq!(Direction::Forwards, emission.direction);
        assert!(emission.frame_changed);
    }

    #[test]
    fn emission_is_monotonic_forwards() {
        let mut decoder = MtcDecoder::new();
        let mut emitted = Vec::new();
        // four consecutive two-frame windows
        for window in 0..4u8 {
            let timecode = Timecode::new(1, 0, 0, window * 2);
            emitted.extend(feed_bytes(&mut decoder, &quarter_frames(timecode, 0b11)));
        }
        assert!(!emitted.is_empty());
        for pair in emitted.windows(2) {
            assert!(
                pair[1].timecode >= pair[0].timecode,
                "{} then {}",
                pair[0].timecode,
                pair[1].timecode
            );
        }
    }

    #[test]
    fn direction_inference() {
        let mut decoder = MtcDecoder::new();
        let bytes = quarter_frames(Timecode::new(0, 0, 5, 0), 0b11);
        feed_bytes(&mut decoder, &bytes);
        assert_eq!(Direction::Forwards, decoder.direction());

        // replay the pieces in descending order
        let mut reversed = bytes;
        reversed.reverse();
        feed_bytes(&mut decoder, &reversed[1..]);
        assert_eq!(Direction::Backwards, decoder.direction());
    }

    #[test]
    fn full_frame_snaps_immediately() {
        let mut decoder = MtcDecoder::new();
        let sysex = UniversalSysEx7 {
            group: U4::new(0),
            kind: UniversalKind::RealTime,
            device_id: U7::new(0x7f),
            sub_id1: U7::new(0x01),
            sub_id2: U7::new(0x01),
            // 25 fps (code 01), 10:20:30:12
            data: vec![(0b01 << 5) | 10, 20, 30, 12],
        };
        let emission = decoder.feed(&Event::UniversalSysEx7(sysex)).unwrap();
        assert_eq!(Timecode::new(10, 20, 30, 12), emission.timecode);
        assert_eq!(TimecodeSource::FullFrame, emission.source);
        assert_eq!(MtcRate::Fps25, decoder.rate());
        assert_eq!(
            Some(Timecode::new(10, 20, 30, 12)),
            decoder.timecode_cell().get()
        );
    }

    #[test]
    fn full_frame_restarts_the_register_bank() {
        let mut decoder = MtcDecoder::new();
        feed_bytes(&mut decoder, &quarter_frames(Timecode::new(1, 0, 0, 0), 0b11));
        let sysex = UniversalSysEx7 {
            group: U4::new(0),
            kind: UniversalKind::RealTime,
            device_id: U7::new(0x7f),
            sub_id1: U7::new(0x01),
            sub_id2: U7::new(0x01),
            // 25 fps (code 01), 10:20:30:12
            data: vec![(0b01 << 5) | 10, 20, 30, 12],
        };
        decoder.feed(&Event::UniversalSysEx7(sysex)).unwrap();
        // half a window of fresh pieces must not emit from the stale pre-jump nibbles
        let bytes = quarter_frames(Timecode::new(10, 20, 30, 14), 0b01);
        let emissions = feed_bytes(&mut decoder, &bytes[..4]);
        assert!(emissions.is_empty());
        // the remaining pieces complete the bank and emission resumes
        let emissions = feed_bytes(&mut decoder, &bytes[4..]);
        assert_eq!(1, emissions.len());
        assert_eq!(Timecode::new(10, 20, 30, 16), emissions[0].timecode);
    }

    #[test]
    fn local_rate_scaling_doubles_frames() {
        let mut decoder = MtcDecoder::new();
        decoder.set_local_rate(Some(TimecodeRate::Fps60));
        let bytes = quarter_frames(Timecode::new(0, 0, 10, 5), 0b11);
        let emissions = feed_bytes(&mut decoder, &bytes);
        // (5 + 2 offset) * 2 = 14 at 60 fps
        assert_eq!(Timecode::new(0, 0, 10, 14), emissions[0].timecode);
        assert_eq!(TimecodeRate::Fps60, emissions[0].rate);
    }

    #[test]
    fn incompatible_local_rate_falls_back() {
        let mut decoder = MtcDecoder::new();
        decoder.set_local_rate(Some(TimecodeRate::Fps50));
        let bytes = quarter_frames(Timecode::new(0, 0, 10, 5), 0b11); // 30 fps stream
        let emissions = feed_bytes(&mut decoder, &bytes);
        assert_eq!(TimecodeRate::Fps30, emissions[0].rate);
        assert_eq!(Timecode::new(0, 0, 10, 7), emissions[0].timecode);
    }

    #[test]
    fn drop_frame_arithmetic_skips_first_two_frames() {
        // 00:00:59:29 + 1 frame lands on 00:01:00:02 in drop-frame
        let next = add_frames(Timecode::new(0, 0, 59, 29), 1, MtcRate::Fps29_97Drop);
        assert_eq!(Timecode::new(0, 1, 0, 2), next);
        // but a tenth minute keeps its frames
        let next = add_frames(Timecode::new(0, 9, 59, 29), 1, MtcRate::Fps29_97Drop);
        assert_eq!(Timecode::new(0, 10, 0, 0), next);
    }

    #[test]
    fn wrap_modulo_24_hours() {
        let next = add_frames(Timecode::new(23, 59, 59, 29), 1, MtcRate::Fps30);
        assert_eq!(Timecode::new(0, 0, 0, 0), next);
    }

    #[test]
    fn reset_clears_registers() {
        let mut decoder = MtcDecoder::new();
        let bytes = quarter_frames(Timecode::new(3, 2, 1, 0), 0b11);
        feed_bytes(&mut decoder, &bytes);
        decoder.reset_qf_buffer();
        // half a window is not enough to emit again
        let emissions = feed_bytes(&mut decoder, &bytes[..4]);
        assert!(emissions.is_empty());
    }
}
