//! Provides [`NoteSequence`], the runtime form of a decoded code: an ordered list of notes and a cursor pointing at
//! the current step.

use crate::{Error, InvalidCode};
use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// Maximum number of steps in a [`NoteSequence`].
pub const SEQUENCE_CAPACITY: usize = 16;

/// An ordered list of notes with a cursor on the current step.
///
/// The cursor always sits in `0..len()` unless the sequence is empty, in which case it stays at zero and never moves.
/// Advancing past the last step wraps around to the first.
///
/// Internally, this struct uses the [`U7`] type because [`tinyvec`] requires that `Items` implement [`Default`].
/// Public interfaces deal in the related [`Note`] type instead.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoteSequence {
    notes: ArrayVec<[U7; SEQUENCE_CAPACITY]>,
    index: usize,
}

#[cfg(feature = "defmt")]
impl defmt::Format for NoteSequence {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "NoteSequence {{ notes: [");
        for (i, &note) in self.notes.iter().enumerate() {
            if i == 0 {
                defmt::write!(fmt, " ");
            } else {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{} ({})", Note::from(note).to_str(), u8::from(note));
        }
        defmt::write!(fmt, " ], index: {} }}", self.index);
    }
}

impl NoteSequence {
    /// Construct an empty [`NoteSequence`]. Empty sequences are inert: they have no current note and never advance.
    pub fn new() -> Self {
        Self {
            notes: array_vec!(),
            index: 0,
        }
    }

    /// Construct a [`NoteSequence`] from a slice of [`Note`]s, positioned on the first one.
    pub fn from_notes(notes: &[Note]) -> Result<Self, Error> {
        if notes.len() > SEQUENCE_CAPACITY {
            return Err(InvalidCode::LengthExceedsCapacity {
                length: notes.len(),
                capacity: SEQUENCE_CAPACITY,
            }
            .into());
        }
        let mut sequence = Self::new();
        for &note in notes {
            sequence.push(note);
        }
        Ok(sequence)
    }

    /// Append a step. Input beyond capacity is ignored; callers are expected to have validated length beforehand.
    pub(crate) fn push(&mut self, note: Note) {
        if self.notes.len() != self.notes.capacity() {
            self.notes.push(U7::from_u8_lossy(note as u8));
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Determine if the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Position of the current step.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the [`Note`] of the current step, or `None` if the sequence is empty.
    pub fn current(&self) -> Option<Note> {
        self.notes.get(self.index).map(|&n| Note::from(n))
    }

    /// Moves the cursor to the next step, wrapping around after the last, and returns the new current [`Note`].
    ///
    /// Does nothing to an empty sequence.
    pub fn advance(&mut self) -> Option<Note> {
        if self.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.notes.len();
        self.current()
    }

    /// Moves the cursor back to the first step.
    pub fn rewind(&mut self) {
        self.index = 0;
    }

    /// Returns an [`Iterator`] over the steps, in order.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.notes.iter().map(|&n| Note::from(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arpeggio() -> NoteSequence {
        NoteSequence::from_notes(&[Note::C4, Note::E4, Note::G4]).unwrap()
    }

    #[test]
    fn new() {
        let expected = NoteSequence {
            notes: array_vec!(),
            index: 0,
        };
        assert_eq!(expected, NoteSequence::new(), "Expected left but got right");
        assert_eq!(
            NoteSequence::default(),
            NoteSequence::new(),
            "Expected left but got right"
        );
    }

    #[test]
    fn from_notes_rejects_overflow() {
        let notes = [Note::C4; SEQUENCE_CAPACITY + 1];
        assert!(NoteSequence::from_notes(&notes).is_err());
        assert!(NoteSequence::from_notes(&notes[..SEQUENCE_CAPACITY]).is_ok());
    }

    #[test]
    fn push_ignores_rather_than_overflow() {
        let mut sequence = NoteSequence::from_notes(&[Note::C4; SEQUENCE_CAPACITY]).unwrap();
        sequence.push(Note::D4);
        assert_eq!(SEQUENCE_CAPACITY, sequence.len(), "Expected length not to change");
        assert!(sequence.iter().all(|n| n == Note::C4));
    }

    #[test]
    fn current() {
        assert_eq!(Some(Note::C4), arpeggio().current(), "Expected left but got right");
        assert_eq!(None, NoteSequence::new().current(), "Expected left but got right");
    }

    #[test]
    fn advance_wraps() {
        let mut sequence = arpeggio();
        assert_eq!(Some(Note::E4), sequence.advance());
        assert_eq!(Some(Note::G4), sequence.advance());
        assert_eq!(2, sequence.index(), "Expected left but got right");
        assert_eq!(Some(Note::C4), sequence.advance());
        assert_eq!(0, sequence.index(), "Expected left but got right");
    }

    #[test]
    fn advance_many_stays_in_bounds() {
        let mut sequence = arpeggio();
        for k in 1..=50 {
            sequence.advance();
            assert_eq!(k % 3, sequence.index(), "Expected left but got right");
        }
    }

    #[test]
    fn advance_empty_is_noop() {
        let mut sequence = NoteSequence::new();
        assert_eq!(None, sequence.advance());
        assert_eq!(0, sequence.index(), "Expected left but got right");
    }

    #[test]
    fn rewind() {
        let mut sequence = arpeggio();
        sequence.advance();
        sequence.rewind();
        assert_eq!(0, sequence.index(), "Expected left but got right");
    }

    #[test]
    fn iter() {
        let sequence = arpeggio();
        let mut iter = sequence.iter();
        assert_eq!(Some(Note::C4), iter.next());
        assert_eq!(Some(Note::E4), iter.next());
        assert_eq!(Some(Note::G4), iter.next());
        assert_eq!(None, iter.next());
    }
}
