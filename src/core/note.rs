/*!
The `note` module maps between MIDI note numbers and scientific pitch names. Note 60 is middle
C, written `C4`, so the full range runs from `C-1` (note 0) to `G9` (note 127).
!*/

use crate::core::U7;

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// The pitch name of a note number, e.g. `"C4"` for 60, `"F#-1"` for 6. Sharps are used for
/// the black keys.
pub fn note_name(note: U7) -> String {
    let semitone = (note.get() % 12) as usize;
    let octave = (note.get() / 12) as i8 - 1;
    format!("{}{}", NAMES[semitone], octave)
}

/// Parse a pitch name back into a note number. Accepts the names produced by [`note_name`]
/// plus flats (`Db4`) and is case-insensitive on the letter. Returns `None` for anything that
/// does not land on 0 to 127.
pub fn note_number(name: &str) -> Option<U7> {
    let bytes = name.as_bytes();
    let letter = bytes.first()?.to_ascii_uppercase();
    let mut semitone: i32 = match letter {
        b'C' => 0,
        b'D' => 2,
        b'E' => 4,
        b'F' => 5,
        b'G' => 7,
        b'A' => 9,
        b'B' => 11,
        _ => return None,
    };
    let mut rest = &name[1..];
    if let Some(accidental) = rest.as_bytes().first() {
        match accidental {
            b'#' => {
                semitone += 1;
                rest = &rest[1..];
            }
            b'b' => {
                semitone -= 1;
                rest = &rest[1..];
            }
            _ => {}
        }
    }
    let octave: i32 = rest.parse().ok()?;
    let number = (octave + 1) * 12 + semitone;
    if !(0..=127).contains(&number) {
        return None;
    }
    U7::try_new(number as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!("C4", note_name(U7::new(60)));
        assert_eq!("A4", note_name(U7::new(69)));
        assert_eq!("C-1", note_name(U7::new(0)));
        assert_eq!("G9", note_name(U7::new(127)));
        assert_eq!("A#2", note_name(U7::new(46)));
    }

    #[test]
    fn numbers() {
        assert_eq!(Some(U7::new(60)), note_number("C4"));
        assert_eq!(Some(U7::new(61)), note_number("C#4"));
        assert_eq!(Some(U7::new(61)), note_number("Db4"));
        assert_eq!(Some(U7::new(0)), note_number("C-1"));
        assert_eq!(Some(U7::new(127)), note_number("g9"));
        assert_eq!(None, note_number("H2"));
        assert_eq!(None, note_number("G#9"));
        assert_eq!(None, note_number(""));
    }

    #[test]
    fn round_trip() {
        for n in 0..=127u8 {
            let note = U7::new(n);
            assert_eq!(Some(note), note_number(&note_name(note)));
        }
    }
}
