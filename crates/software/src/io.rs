//! This module provides traits for the sequencer's outputs (MIDI and CV) along with [`Emitter`], which binds them to a
//! single track.
//!
//! Every MIDI event is broadcast to all registered links. Two sinks can be combined into one by placing them in a
//! tuple, which forwards each message to the first and then to the second; nesting tuples registers more.

use crate::{configuration::ControlVoltage, sequencer::TrackId};
use wmidi::{Channel, MidiMessage, Note, Velocity};

/// A trait for anything which accepts outgoing MIDI messages, e.g., a serial DIN port or a USB-MIDI endpoint.
pub trait MidiSink {
    /// Sends (or queues) a single message.
    fn send(&mut self, message: MidiMessage<'static>);
}

impl<T: MidiSink + ?Sized> MidiSink for &mut T {
    fn send(&mut self, message: MidiMessage<'static>) {
        (**self).send(message);
    }
}

impl<A: MidiSink, B: MidiSink> MidiSink for (A, B) {
    fn send(&mut self, message: MidiMessage<'static>) {
        self.0.send(message.clone());
        self.1.send(message);
    }
}

/// A trait for anything which sets a track's control voltage, e.g., one channel of a DAC.
pub trait CvSink {
    /// Sets the control voltage of `track`, expressed as a DAC value.
    fn set(&mut self, track: TrackId, value: u16);
}

impl<T: CvSink + ?Sized> CvSink for &mut T {
    fn set(&mut self, track: TrackId, value: u16) {
        (**self).set(track, value);
    }
}

/// Binds the output sinks to one track and to the settings needed to build events for it.
pub struct Emitter<'a, M, C> {
    midi: &'a mut M,
    cv: &'a mut C,
    track: TrackId,
    channel: Channel,
    velocity: Velocity,
    control_voltage: &'a ControlVoltage,
}

impl<'a, M: MidiSink, C: CvSink> Emitter<'a, M, C> {
    /// Constructs an [`Emitter`].
    pub fn new(
        midi: &'a mut M,
        cv: &'a mut C,
        track: TrackId,
        channel: Channel,
        velocity: Velocity,
        control_voltage: &'a ControlVoltage,
    ) -> Self {
        Self {
            midi,
            cv,
            track,
            channel,
            velocity,
            control_voltage,
        }
    }

    /// The track events are emitted for.
    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Sends a NoteOn to every MIDI link.
    pub fn note_on(&mut self, note: Note) {
        trace!("{} NoteOn {}", self.track, note.to_str());
        self.midi
            .send(MidiMessage::NoteOn(self.channel, note, self.velocity));
    }

    /// Sends a NoteOff to every MIDI link.
    pub fn note_off(&mut self, note: Note) {
        trace!("{} NoteOff {}", self.track, note.to_str());
        self.midi
            .send(MidiMessage::NoteOff(self.channel, note, self.velocity));
    }

    /// Sets the track's control voltage to the pitch of `note`.
    pub fn pitch(&mut self, note: Note) {
        let value = self.control_voltage.note_to_code(note);
        trace!("{} CV {} for {}", self.track, value, note.to_str());
        self.cv.set(self.track, value);
    }

    /// Drops the track's control voltage to zero.
    pub fn rest(&mut self) {
        trace!("{} CV 0", self.track);
        self.cv.set(self.track, 0);
    }
}

/// Wraps a channel voice message in a USB-MIDI Event Packet on cable 0.
///
/// Returns `None` for messages that don't fit the three byte payload of a single packet (e.g., SysEx).
pub fn usb_midi_packet(message: &MidiMessage<'_>) -> Option<[u8; 4]> {
    let mut packet = [0_u8; 4];
    match message.copy_to_slice(&mut packet[1..]) {
        Ok(3) => {
            // for channel voice messages the Code Index Number is the upper nibble of the status byte
            packet[0] = packet[1] >> 4;
            Some(packet)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Recorder, RecordingCv};
    use wmidi::U7;

    const VELOCITY: Velocity = U7::from_u8_lossy(127);

    #[test]
    fn tuple_broadcasts_in_order() {
        let mut wired = Recorder::default();
        let mut wireless = Recorder::default();
        {
            let mut both = (&mut wired, &mut wireless);
            both.send(MidiMessage::NoteOn(Channel::Ch1, Note::C4, VELOCITY));
            both.send(MidiMessage::NoteOff(Channel::Ch1, Note::C4, VELOCITY));
        }
        assert_eq!(wired.messages, wireless.messages, "Expected left but got right");
        assert_eq!(2, wired.messages.len(), "Expected left but got right");
    }

    #[test]
    fn usb_packets() {
        assert_eq!(
            Some([0x09, 0x90, 60, 127]),
            usb_midi_packet(&MidiMessage::NoteOn(Channel::Ch1, Note::C4, VELOCITY)),
            "Expected left but got right"
        );
        assert_eq!(
            Some([0x08, 0x82, 76, 127]),
            usb_midi_packet(&MidiMessage::NoteOff(Channel::Ch3, Note::E5, VELOCITY)),
            "Expected left but got right"
        );
        assert_eq!(
            None,
            usb_midi_packet(&MidiMessage::TimingClock),
            "Expected left but got right"
        );
    }

    #[test]
    fn emitter_builds_messages() {
        let mut midi = Recorder::default();
        let mut cv = RecordingCv::default();
        let control_voltage = ControlVoltage::default();
        let mut emitter = Emitter::new(
            &mut midi,
            &mut cv,
            TrackId::Second,
            Channel::Ch3,
            VELOCITY,
            &control_voltage,
        );
        emitter.note_on(Note::C5);
        emitter.pitch(Note::C5);
        emitter.note_off(Note::C5);
        emitter.rest();

        assert_eq!(
            [
                MidiMessage::NoteOn(Channel::Ch3, Note::C5, VELOCITY),
                MidiMessage::NoteOff(Channel::Ch3, Note::C5, VELOCITY),
            ]
            .as_slice(),
            midi.messages.as_slice(),
            "Expected left but got right"
        );
        assert_eq!(
            [(TrackId::Second, 1241), (TrackId::Second, 0)].as_slice(),
            cv.values.as_slice(),
            "Expected left but got right"
        );
    }
}
