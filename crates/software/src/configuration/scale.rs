use crate::Error;
use wmidi::Note;

/// Number of scale degrees a [`Scale`] maps, one per decimal digit.
pub const SCALE_DEGREES: usize = 10;

/// Major scale intervals, in half steps above the root, extended past the octave so that every digit has a degree.
pub const MAJOR: [u8; SCALE_DEGREES] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16];

/// Quantizer which maps a decimal digit to a [`Note`] constrained to a scale built on a root note.
#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    root: Note,
    offsets: [u8; SCALE_DEGREES],
}

impl Scale {
    /// Constructs a [`Scale`], making sure every degree is a valid MIDI note.
    pub fn new(root: Note, offsets: [u8; SCALE_DEGREES]) -> Result<Self, Error> {
        for offset in offsets {
            u8::from(root)
                .checked_add(offset)
                .and_then(|n| Note::try_from(n).ok())
                .ok_or(Error::NoteOutOfRange)?;
        }
        Ok(Self { root, offsets })
    }

    /// Getter.
    pub fn root(&self) -> Note {
        self.root
    }

    /// Getter.
    pub fn offsets(&self) -> &[u8; SCALE_DEGREES] {
        &self.offsets
    }

    /// Returns the [`Note`] for a digit, i.e., the root raised by the digit's scale degree.
    ///
    /// Digits above 9 are rejected rather than wrapped or clamped.
    pub fn quantize(&self, digit: u8) -> Result<Note, Error> {
        let offset = self
            .offsets
            .get(usize::from(digit))
            .ok_or(Error::DigitOutOfRange(digit))?;
        u8::from(self.root)
            .checked_add(*offset)
            .and_then(|n| Note::try_from(n).ok())
            .ok_or(Error::NoteOutOfRange)
    }
}

impl Default for Scale {
    /// Major scale rooted on middle C (C4, MIDI note 60).
    fn default() -> Self {
        Self {
            root: Note::C4,
            offsets: MAJOR,
        }
    }
}
