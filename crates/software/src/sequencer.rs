//! Provides [`Sequencer`], the single context object owning the configuration and all mutable sequencing state.
//!
//! The sequencer is the only writer of step positions and sustain flags. Everything else (displays, status LEDs)
//! observes it through [`Sequencer::snapshot`], which copies out a consistent view of every track.

use crate::{
    Error,
    code::Code,
    configuration::{Config, TrackSelection, TriggerMode},
    display::{Snapshot, TrackSnapshot},
    io::{CvSink, Emitter, MidiSink},
    sequence::NoteSequence,
    step::{StepEngine, Trigger},
};

/// Number of independent tracks.
pub const TRACK_COUNT: usize = 2;

/// Identifies one of the sequencer's tracks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackId {
    /// The first track; drives DAC channel 1.
    First,
    /// The second track; drives DAC channel 2.
    Second,
}

impl TrackId {
    /// Every track, in order.
    pub const ALL: [TrackId; TRACK_COUNT] = [TrackId::First, TrackId::Second];

    /// Position of the track, for indexing.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One decoded code and the engine stepping through it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Track {
    code: Option<Code>,
    sequence: NoteSequence,
    engine: StepEngine,
}

/// Owns the [`Config`] and both tracks, and routes triggers and output events between them.
pub struct Sequencer {
    config: Config,
    selection: TrackSelection,
    tracks: [Track; TRACK_COUNT],
}

impl Sequencer {
    /// Constructs a [`Sequencer`] with both tracks enabled but empty; nothing sounds until a code is loaded.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            selection: TrackSelection::default(),
            tracks: Default::default(),
        }
    }

    /// Getter.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Getter.
    pub fn selection(&self) -> TrackSelection {
        self.selection
    }

    /// The sequence loaded on a track.
    pub fn sequence(&self, track: TrackId) -> &NoteSequence {
        &self.tracks[track.index()].sequence
    }

    /// Decodes `code` and puts it on `track`, starting from its first step.
    ///
    /// A note still held on the track is released first so that it does not hang. If decoding fails, the error is
    /// returned and the track keeps playing what it had.
    pub fn load<M: MidiSink, C: CvSink>(
        &mut self,
        track: TrackId,
        code: Code,
        midi: &mut M,
        cv: &mut C,
    ) -> Result<(), Error> {
        let sequence = match code.decode(&self.config.scale) {
            Ok(sequence) => sequence,
            Err(e) => {
                warn!("Rejected code {} for {}: {}", code, track, e);
                return Err(e);
            }
        };

        let Self { config, tracks, .. } = self;
        let slot = &mut tracks[track.index()];
        slot.engine.release(&mut emitter(config, track, midi, cv));
        slot.code = Some(code);
        slot.sequence = sequence;
        info!("Loaded {} on {} ({} steps)", code, track, sequence.len());
        Ok(())
    }

    /// Applies a [`Trigger`] to every enabled track, as when a single clock or gate drives them all.
    ///
    /// Triggers which don't belong to the configured [`TriggerMode`] are ignored.
    pub fn step<M: MidiSink, C: CvSink>(&mut self, trigger: Trigger, midi: &mut M, cv: &mut C) {
        for track in TrackId::ALL {
            self.step_track(track, trigger, midi, cv);
        }
    }

    /// Applies a [`Trigger`] to one track, as when each track has a trigger source of its own. Disabled tracks ignore
    /// it.
    pub fn step_track<M: MidiSink, C: CvSink>(
        &mut self,
        track: TrackId,
        trigger: Trigger,
        midi: &mut M,
        cv: &mut C,
    ) {
        if !self.selection.is_enabled(track) {
            return;
        }
        let free_running = self.config.trigger_mode == TriggerMode::FreeRunning;
        let Self { config, tracks, .. } = self;
        let slot = &mut tracks[track.index()];
        slot.engine.trigger(
            trigger,
            free_running,
            &mut slot.sequence,
            &mut emitter(config, track, midi, cv),
        );
    }

    /// Changes which tracks respond to triggers. Tracks being disabled release any note they hold.
    pub fn select<M: MidiSink, C: CvSink>(
        &mut self,
        selection: TrackSelection,
        midi: &mut M,
        cv: &mut C,
    ) {
        info!("Track selection: {}", selection);
        let Self { config, tracks, .. } = self;
        for track in TrackId::ALL {
            if !selection.is_enabled(track) {
                tracks[track.index()]
                    .engine
                    .release(&mut emitter(config, track, midi, cv));
            }
        }
        self.selection = selection;
    }

    /// Releases every held note, e.g., before the device stops sequencing.
    pub fn release_all<M: MidiSink, C: CvSink>(&mut self, midi: &mut M, cv: &mut C) {
        let Self { config, tracks, .. } = self;
        for track in TrackId::ALL {
            tracks[track.index()]
                .engine
                .release(&mut emitter(config, track, midi, cv));
        }
    }

    /// Copies out the state of every track for display.
    pub fn snapshot(&self) -> Snapshot {
        let tracks = TrackId::ALL.map(|track| {
            let slot = &self.tracks[track.index()];
            TrackSnapshot {
                code: slot.code,
                sequence: slot.sequence,
                enabled: self.selection.is_enabled(track),
                sustaining: slot.engine.is_sustaining(),
            }
        });
        Snapshot { tracks }
    }
}

fn emitter<'a, M: MidiSink, C: CvSink>(
    config: &'a Config,
    track: TrackId,
    midi: &'a mut M,
    cv: &'a mut C,
) -> Emitter<'a, M, C> {
    Emitter::new(
        midi,
        cv,
        track,
        config.channel,
        config.velocity,
        &config.control_voltage,
    )
}
