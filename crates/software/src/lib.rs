//! This crate contains architecture-agnostic logic for MR. READER, a small step sequencer which reads a barcode-style
//! numeric code, derives a pattern of notes from its digits, and plays that pattern back as
//! [MIDI](https://midi.org/midi-1-0) and as [CV/gate](https://en.wikipedia.org/wiki/CV/gate).
//!
//! The pipeline runs leaves first: a [`Code`][code::Code] is decoded into a [`NoteSequence`][sequence::NoteSequence]
//! by way of the [`Scale`][configuration::Scale] quantizer; the [`StepEngine`][step::StepEngine] advances through the
//! sequence whenever a [`Trigger`][step::Trigger] arrives, emitting note and control voltage events to the output
//! sinks in [`io`]. The [`Sequencer`][sequencer::Sequencer] ties two such tracks together and exposes a read-only
//! [`Snapshot`][display::Snapshot] for whatever display is attached.

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

pub mod code;
pub mod configuration;
pub mod display;
pub mod error;
pub mod io;
pub mod sequence;
pub mod sequencer;
pub mod step;

pub use error::{Error, InvalidCode};

#[cfg(test)]
mod test_support;
