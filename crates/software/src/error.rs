//! Errors raised while validating configuration and decoding codes.
//!
//! All failures happen up front, at construction or decode time. Once a [`NoteSequence`][crate::sequence::NoteSequence]
//! exists, stepping through it cannot fail.

use core::fmt;

/// Everything that can go wrong in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The code could not be turned into a sequence; see [`InvalidCode`] for the cause.
    InvalidCode(InvalidCode),
    /// The code is well formed, but its check digit is zero, so it describes a sequence without any steps.
    EmptySequence,
    /// A digit outside of 0-9 was handed to the quantizer.
    DigitOutOfRange(u8),
    /// A scale degree would land above the highest MIDI note.
    NoteOutOfRange,
    /// The DAC resolution (in bits) is outside of 1-16.
    InvalidResolution(u8),
}

/// Reasons a code is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidCode {
    /// Codes need a two digit prefix plus at least a check digit.
    TooShort {
        /// Number of characters received.
        len: usize,
    },
    /// The code has more digits than can be stored.
    TooLong {
        /// Number of characters received.
        len: usize,
    },
    /// A character other than `0`-`9` was found.
    NonDigit {
        /// Zero-based position of the offending character.
        position: usize,
    },
    /// The check digit asks for more steps than a sequence can hold.
    LengthExceedsCapacity {
        /// Length requested by the check digit.
        length: usize,
        /// Maximum number of steps in a sequence.
        capacity: usize,
    },
    /// The body of the code does not have enough digits ahead of the check digit to fill the sequence.
    MissingDigits {
        /// Number of leading digits the check digit asks for.
        required: usize,
        /// Number of digits available ahead of the check digit.
        available: usize,
    },
}

impl From<InvalidCode> for Error {
    fn from(value: InvalidCode) -> Self {
        Self::InvalidCode(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCode(reason) => write!(f, "invalid code: {reason}"),
            Self::EmptySequence => f.write_str("check digit is 0; the sequence would be empty"),
            Self::DigitOutOfRange(digit) => write!(f, "digit {digit} cannot be quantized"),
            Self::NoteOutOfRange => f.write_str("scale reaches above the highest MIDI note"),
            Self::InvalidResolution(bits) => write!(f, "unsupported DAC resolution of {bits} bits"),
        }
    }
}

impl fmt::Display for InvalidCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "{len} characters is too short"),
            Self::TooLong { len } => write!(f, "{len} characters is too long"),
            Self::NonDigit { position } => write!(f, "non-digit character at position {position}"),
            Self::LengthExceedsCapacity { length, capacity } => {
                write!(f, "length {length} exceeds capacity of {capacity} steps")
            }
            Self::MissingDigits {
                required,
                available,
            } => write!(f, "{required} digits required but only {available} available"),
        }
    }
}

impl core::error::Error for Error {}

impl core::error::Error for InvalidCode {}
