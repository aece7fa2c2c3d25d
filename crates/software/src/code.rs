//! Provides the [`Code`] type, a validated barcode-style string of digits, and [`decode`], which turns a code into a
//! [`NoteSequence`].
//!
//! Codes are read the way retail barcodes are laid out: a two digit prefix (the country code of an EAN-13, for example)
//! which is ignored, followed by the body. The last digit of the body, normally the check digit, sets the length of the
//! sequence; the leading digits of the body, one per step, are quantized into notes.

use crate::{
    Error, InvalidCode,
    configuration::Scale,
    sequence::{NoteSequence, SEQUENCE_CAPACITY},
};
use core::{fmt, str::FromStr};
use tinyvec::ArrayVec;

/// Number of digits in the prefix which is stripped before decoding.
pub const PREFIX_LEN: usize = 2;

/// Maximum number of digits a [`Code`] may have. Comfortably fits EAN-13, UPC-A and ITF-14 codes.
pub const CODE_CAPACITY: usize = 32;

/// An immutable string of decimal digits, at least long enough to hold a prefix and a check digit.
///
/// Digits are stored as their numeric values (0-9), not as ASCII.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Code {
    digits: ArrayVec<[u8; CODE_CAPACITY]>,
}

impl Code {
    /// Parses and validates a [`Code`].
    pub fn parse(code: &str) -> Result<Self, Error> {
        let len = code.len();
        if len < PREFIX_LEN + 1 {
            return Err(InvalidCode::TooShort { len }.into());
        }
        if len > CODE_CAPACITY {
            return Err(InvalidCode::TooLong { len }.into());
        }

        let mut digits = ArrayVec::new();
        for (position, byte) in code.bytes().enumerate() {
            if !byte.is_ascii_digit() {
                return Err(InvalidCode::NonDigit { position }.into());
            }
            digits.push(byte - b'0');
        }
        Ok(Self { digits })
    }

    /// All digits, prefix included.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// The digits which are ignored during decoding.
    pub fn prefix(&self) -> &[u8] {
        &self.digits[..PREFIX_LEN]
    }

    /// Everything after the prefix, check digit included.
    pub fn body(&self) -> &[u8] {
        &self.digits[PREFIX_LEN..]
    }

    /// The last digit, which sets the length of the decoded sequence.
    pub fn check_digit(&self) -> u8 {
        // parsing guarantees at least one digit follows the prefix
        self.digits[self.digits.len() - 1]
    }

    /// Decodes this code using the given [`Scale`]. See [`decode`].
    pub fn decode(&self, scale: &Scale) -> Result<NoteSequence, Error> {
        decode(self, scale)
    }
}

impl FromStr for Code {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in self.digits.iter() {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Code {
    fn format(&self, fmt: defmt::Formatter) {
        for digit in self.digits.iter() {
            defmt::write!(fmt, "{}", digit);
        }
    }
}

/// Turns a [`Code`] into a [`NoteSequence`] positioned on its first step.
///
/// The check digit sets the sequence length; each of that many leading body digits is quantized with `scale`.
/// Codes whose body cannot supply enough digits ahead of the check digit are rejected rather than padded or truncated,
/// as are codes whose check digit is zero, since they would describe a sequence without steps.
///
/// Decoding is pure: the same code and scale always produce the same sequence.
pub fn decode(code: &Code, scale: &Scale) -> Result<NoteSequence, Error> {
    let body = code.body();
    let length = usize::from(code.check_digit());

    if length == 0 {
        return Err(Error::EmptySequence);
    }
    if length > SEQUENCE_CAPACITY {
        return Err(InvalidCode::LengthExceedsCapacity {
            length,
            capacity: SEQUENCE_CAPACITY,
        }
        .into());
    }
    // the check digit itself never doubles as a step
    let available = body.len() - 1;
    if available < length {
        return Err(InvalidCode::MissingDigits {
            required: length,
            available,
        }
        .into());
    }

    let mut sequence = NoteSequence::new();
    for &digit in &body[..length] {
        sequence.push(scale.quantize(digit)?);
    }
    debug!("Decoded {} into {}", code, sequence);
    Ok(sequence)
}
