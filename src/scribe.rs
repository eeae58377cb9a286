use crate::error::LibResult;
use snafu::ResultExt;
use std::io::Write;

#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub(crate) struct ScribeSettings {
    pub(crate) running_status: bool,
}

/// A wrapper for any `Write` that understands the MIDI status byte taxonomy. Channel voice
/// statuses (below `0xF0`) participate in running status: with the setting enabled, a repeat
/// of the most recently written channel status is elided. System statuses, the sysex
/// introducers and the `0xFF` meta introducer always hit the wire and break the run, so the
/// next channel message re-states its status.
pub(crate) struct Scribe<W: Write> {
    w: W,
    settings: ScribeSettings,
    last_channel_status: Option<u8>,
}

impl<W: Write> Write for Scribe<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.w.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.w.flush()
    }
}

impl<W: Write> Scribe<W> {
    pub(crate) fn new(w: W, settings: ScribeSettings) -> Self {
        Self {
            w,
            settings,
            last_channel_status: None,
        }
    }

    /// Write a status byte, classified as above. Returns without writing only when running
    /// status is enabled and `status` repeats the previous channel voice status.
    pub(crate) fn write_status_byte(&mut self, status: u8) -> LibResult<()> {
        if status >= 0xf0 {
            self.last_channel_status = None;
            return write_u8!(self.w, status);
        }
        if self.settings.running_status && self.last_channel_status == Some(status) {
            return Ok(());
        }
        write_u8!(self.w, status)?;
        self.last_channel_status = Some(status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scribe(running_status: bool) -> Scribe<Vec<u8>> {
        Scribe::new(Vec::new(), ScribeSettings { running_status })
    }

    #[test]
    fn repeated_channel_status_is_elided() {
        let mut w = scribe(true);
        w.write_status_byte(0x92).unwrap();
        w.write_status_byte(0x92).unwrap();
        w.write_status_byte(0x93).unwrap();
        assert_eq!(vec![0x92, 0x93], w.w);
    }

    #[test]
    fn system_status_breaks_the_run() {
        let mut w = scribe(true);
        w.write_status_byte(0x92).unwrap();
        w.write_status_byte(0xff).unwrap();
        w.write_status_byte(0x92).unwrap();
        assert_eq!(vec![0x92, 0xff, 0x92], w.w);
    }

    #[test]
    fn disabled_setting_always_writes() {
        let mut w = scribe(false);
        w.write_status_byte(0x92).unwrap();
        w.write_status_byte(0x92).unwrap();
        assert_eq!(vec![0x92, 0x92], w.w);
    }
}
