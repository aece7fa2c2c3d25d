//! Recording sinks shared by the unit tests.

extern crate std;

use crate::{
    io::{CvSink, MidiSink},
    sequencer::TrackId,
};
use std::vec::Vec;
use wmidi::{MidiMessage, Note};

/// Collects every MIDI message it is sent.
#[derive(Debug, Default)]
pub struct Recorder {
    pub messages: Vec<MidiMessage<'static>>,
}

impl Recorder {
    /// Returns the messages as `(is_note_on, note)` pairs, which keeps assertions short.
    pub fn notes(&self) -> Vec<(bool, Note)> {
        self.messages
            .iter()
            .filter_map(|msg| match msg {
                MidiMessage::NoteOn(_, note, _) => Some((true, *note)),
                MidiMessage::NoteOff(_, note, _) => Some((false, *note)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MidiSink for Recorder {
    fn send(&mut self, message: MidiMessage<'static>) {
        self.messages.push(message);
    }
}

/// Collects every control voltage it is sent.
#[derive(Debug, Default)]
pub struct RecordingCv {
    pub values: Vec<(TrackId, u16)>,
}

impl CvSink for RecordingCv {
    fn set(&mut self, track: TrackId, value: u16) {
        self.values.push((track, value));
    }
}
