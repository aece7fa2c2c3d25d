//! The step engine: moves a [`NoteSequence`] from step to step in response to [`Trigger`]s and emits the matching
//! note and control voltage events.
//!
//! Two trigger models are supported, one per [`TriggerMode`][crate::configuration::TriggerMode]:
//!
//! - **Free-running.** Each [`Trigger::Tick`] turns off the current note, advances, and turns on the next note, all at
//!   once. There is no rest between steps.
//! - **Gate.** The engine is a two state machine. A rising gate turns the current note on and holds it; a falling
//!   gate turns it off, rests the control voltage, and advances, so the next pitch is only heard on the next rising
//!   gate. Repeated levels without a change do nothing.
//!
//! | State      | Gate | Action                                       | Next       |
//! |------------|------|----------------------------------------------|------------|
//! | Idle       | low  | none                                         | Idle       |
//! | Idle       | high | note on, CV to pitch                         | Sustaining |
//! | Sustaining | high | none                                         | Sustaining |
//! | Sustaining | low  | note off, CV to zero, advance                | Idle       |
//!
//! Empty sequences never produce events and never move.

use crate::{
    io::{CvSink, Emitter, MidiSink},
    sequence::NoteSequence,
};
use wmidi::Note;

/// Level of a gate signal, as reported by a debounced input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateState {
    /// The current step should sound.
    High,
    /// The current step should be released.
    Low,
}

impl From<bool> for GateState {
    fn from(is_high: bool) -> Self {
        if is_high { Self::High } else { Self::Low }
    }
}

/// Something that happened at the trigger source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// A clock tick, for free-running mode.
    Tick,
    /// The gate level seen on the latest poll, for gate mode.
    Gate(GateState),
}

/// Whether a note is currently held, and if so, which.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Sustain {
    /// Nothing is sounding.
    #[default]
    Idle,
    /// The given note was turned on and has not been turned off yet.
    Sustaining(Note),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Sustain {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(fmt, "Idle"),
            Self::Sustaining(note) => defmt::write!(fmt, "Sustaining({})", note.to_str()),
        }
    }
}

/// Per-track state of the step engine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepEngine {
    sustain: Sustain,
}

impl StepEngine {
    /// Constructs an idle [`StepEngine`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Getter.
    pub fn sustain(&self) -> Sustain {
        self.sustain
    }

    /// Returns `true` if a note is being held.
    pub fn is_sustaining(&self) -> bool {
        matches!(self.sustain, Sustain::Sustaining(_))
    }

    /// Handles one clock tick in free-running mode.
    ///
    /// The note-off always refers to the step the cursor is on before advancing, even on the very first tick when
    /// nothing has been turned on yet.
    pub fn tick<M: MidiSink, C: CvSink>(
        &mut self,
        sequence: &mut NoteSequence,
        out: &mut Emitter<'_, M, C>,
    ) {
        let Some(current) = sequence.current() else {
            return;
        };
        out.note_off(current);
        let Some(next) = sequence.advance() else {
            return;
        };
        out.note_on(next);
        out.pitch(next);
        self.sustain = Sustain::Sustaining(next);
        debug!("{} stepped to {}", out.track(), sequence.index());
    }

    /// Handles one poll of the gate in gate mode.
    pub fn gate<M: MidiSink, C: CvSink>(
        &mut self,
        level: GateState,
        sequence: &mut NoteSequence,
        out: &mut Emitter<'_, M, C>,
    ) {
        let Some(current) = sequence.current() else {
            return;
        };
        match (self.sustain, level) {
            (Sustain::Idle, GateState::High) => {
                out.note_on(current);
                out.pitch(current);
                self.sustain = Sustain::Sustaining(current);
            }
            (Sustain::Sustaining(held), GateState::Low) => {
                out.note_off(held);
                out.rest();
                sequence.advance();
                self.sustain = Sustain::Idle;
                debug!("{} stepped to {}", out.track(), sequence.index());
            }
            // held high or resting low
            _ => {}
        }
    }

    /// Applies a [`Trigger`], ignoring those that belong to the other trigger model.
    pub fn trigger<M: MidiSink, C: CvSink>(
        &mut self,
        trigger: Trigger,
        free_running: bool,
        sequence: &mut NoteSequence,
        out: &mut Emitter<'_, M, C>,
    ) {
        match (trigger, free_running) {
            (Trigger::Tick, true) => self.tick(sequence, out),
            (Trigger::Gate(level), false) => self.gate(level, sequence, out),
            _ => {}
        }
    }

    /// Turns off whatever note is being held, without moving the cursor. Used before the sequence is replaced or the
    /// track is silenced.
    pub fn release<M: MidiSink, C: CvSink>(&mut self, out: &mut Emitter<'_, M, C>) {
        if let Sustain::Sustaining(held) = self.sustain {
            out.note_off(held);
            out.rest();
            self.sustain = Sustain::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::ControlVoltage,
        sequencer::TrackId,
        test_support::{Recorder, RecordingCv},
    };
    use wmidi::{Channel, MidiMessage, U7};

    const VELOCITY: U7 = U7::from_u8_lossy(127);

    /// The sequence decoded from 4969757161615 with the default scale.
    fn sequence() -> NoteSequence {
        NoteSequence::from_notes(&[Note::B4, Note::E5, Note::C5, Note::A4, Note::C5]).unwrap()
    }

    struct Rig {
        midi: Recorder,
        cv: RecordingCv,
        control_voltage: ControlVoltage,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                midi: Recorder::default(),
                cv: RecordingCv::default(),
                control_voltage: ControlVoltage::default(),
            }
        }

        fn emitter(&mut self) -> Emitter<'_, Recorder, RecordingCv> {
            Emitter::new(
                &mut self.midi,
                &mut self.cv,
                TrackId::First,
                Channel::Ch1,
                VELOCITY,
                &self.control_voltage,
            )
        }
    }

    mod free_running {
        use super::*;

        #[test]
        fn single_tick() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();

            engine.tick(&mut sequence, &mut rig.emitter());

            assert_eq!(
                [
                    MidiMessage::NoteOff(Channel::Ch1, Note::B4, VELOCITY),
                    MidiMessage::NoteOn(Channel::Ch1, Note::E5, VELOCITY),
                ]
                .as_slice(),
                rig.midi.messages.as_slice(),
                "Expected left but got right"
            );
            assert_eq!(1, sequence.index(), "Expected left but got right");
            assert_eq!(
                Sustain::Sustaining(Note::E5),
                engine.sustain(),
                "Expected left but got right"
            );
        }

        #[test]
        fn ticks_pair_off_before_on() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();
            let notes: [Note; 5] = [Note::B4, Note::E5, Note::C5, Note::A4, Note::C5];

            let ticks = 12;
            for _ in 0..ticks {
                engine.tick(&mut sequence, &mut rig.emitter());
            }

            assert_eq!(ticks % 5, sequence.index(), "Expected left but got right");
            let events = rig.midi.notes();
            assert_eq!(ticks * 2, events.len(), "Expected left but got right");
            for (k, pair) in events.chunks(2).enumerate() {
                assert_eq!(
                    [(false, notes[k % 5]), (true, notes[(k + 1) % 5])].as_slice(),
                    pair,
                    "Tick {} should pair left but got right",
                    k
                );
            }
        }

        #[test]
        fn tick_sets_pitch() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();

            engine.tick(&mut sequence, &mut rig.emitter());

            let expected = ControlVoltage::default().note_to_code(Note::E5);
            assert_eq!(
                [(TrackId::First, expected)].as_slice(),
                rig.cv.values.as_slice(),
                "Expected left but got right"
            );
        }

        #[test]
        fn empty_sequence_is_inert() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = NoteSequence::new();

            engine.tick(&mut sequence, &mut rig.emitter());

            assert!(rig.midi.messages.is_empty());
            assert!(rig.cv.values.is_empty());
            assert_eq!(0, sequence.index(), "Expected left but got right");
        }

        #[test]
        fn single_step_sequence_repeats() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = NoteSequence::from_notes(&[Note::D4]).unwrap();

            engine.tick(&mut sequence, &mut rig.emitter());

            assert_eq!(
                [(false, Note::D4), (true, Note::D4)].as_slice(),
                rig.midi.notes().as_slice(),
                "Expected left but got right"
            );
            assert_eq!(0, sequence.index(), "Expected left but got right");
        }
    }

    mod gate {
        use super::*;

        #[test]
        fn full_cycle() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();

            engine.gate(GateState::High, &mut sequence, &mut rig.emitter());
            assert_eq!(
                [(true, Note::B4)].as_slice(),
                rig.midi.notes().as_slice(),
                "Rising edge should turn on the current note"
            );
            assert_eq!(0, sequence.index(), "Index should not move while held");
            assert!(engine.is_sustaining());

            engine.gate(GateState::Low, &mut sequence, &mut rig.emitter());
            assert_eq!(
                [(true, Note::B4), (false, Note::B4)].as_slice(),
                rig.midi.notes().as_slice(),
                "Falling edge should turn off the held note"
            );
            assert_eq!(1, sequence.index(), "Expected left but got right");
            assert!(!engine.is_sustaining());

            let on = ControlVoltage::default().note_to_code(Note::B4);
            assert_eq!(
                [(TrackId::First, on), (TrackId::First, 0)].as_slice(),
                rig.cv.values.as_slice(),
                "Expected left but got right"
            );
        }

        #[test]
        fn held_gate_does_not_retrigger() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();

            for _ in 0..5 {
                engine.gate(GateState::High, &mut sequence, &mut rig.emitter());
            }

            assert_eq!(1, rig.midi.messages.len(), "Expected left but got right");
            assert_eq!(0, sequence.index(), "Expected left but got right");
        }

        #[test]
        fn resting_gate_does_nothing() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();

            for _ in 0..5 {
                engine.gate(GateState::Low, &mut sequence, &mut rig.emitter());
            }

            assert!(rig.midi.messages.is_empty());
            assert!(rig.cv.values.is_empty());
            assert_eq!(0, sequence.index(), "Expected left but got right");
        }

        #[test]
        fn cycles_wrap() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = sequence();

            for _ in 0..7 {
                engine.gate(GateState::High, &mut sequence, &mut rig.emitter());
                engine.gate(GateState::Low, &mut sequence, &mut rig.emitter());
            }

            assert_eq!(2, sequence.index(), "Expected left but got right");
            assert_eq!(14, rig.midi.messages.len(), "Expected left but got right");
        }

        #[test]
        fn empty_sequence_is_inert() {
            let mut rig = Rig::new();
            let mut engine = StepEngine::new();
            let mut sequence = NoteSequence::new();

            engine.gate(GateState::High, &mut sequence, &mut rig.emitter());
            engine.gate(GateState::Low, &mut sequence, &mut rig.emitter());

            assert!(rig.midi.messages.is_empty());
            assert!(!engine.is_sustaining());
        }
    }

    #[test]
    fn trigger_ignores_other_model() {
        let mut rig = Rig::new();
        let mut engine = StepEngine::new();
        let mut sequence = sequence();

        engine.trigger(
            Trigger::Gate(GateState::High),
            true,
            &mut sequence,
            &mut rig.emitter(),
        );
        engine.trigger(Trigger::Tick, false, &mut sequence, &mut rig.emitter());

        assert!(rig.midi.messages.is_empty());
        assert_eq!(0, sequence.index(), "Expected left but got right");
    }

    #[test]
    fn release_turns_off_held_note() {
        let mut rig = Rig::new();
        let mut engine = StepEngine::new();
        let mut sequence = sequence();

        engine.gate(GateState::High, &mut sequence, &mut rig.emitter());
        engine.release(&mut rig.emitter());
        engine.release(&mut rig.emitter());

        assert_eq!(
            [(true, Note::B4), (false, Note::B4)].as_slice(),
            rig.midi.notes().as_slice(),
            "Expected left but got right"
        );
        assert_eq!(0, sequence.index(), "Release should not advance");
    }

    #[test]
    fn gate_state_from_bool() {
        assert_eq!(GateState::High, GateState::from(true));
        assert_eq!(GateState::Low, GateState::from(false));
    }
}
