//! Read-only views of the sequencer for whatever display is attached, and a limiter keeping refreshes to a bounded
//! rate.
//!
//! Rendering itself (fonts, pixels, bus traffic) belongs to the [`DisplayProjector`] implementation.

use crate::{
    code::Code,
    sequence::NoteSequence,
    sequencer::{TRACK_COUNT, TrackId},
};
use embassy_time::{Duration, Instant};
use wmidi::Note;

/// The state of a single track at the moment the [`Snapshot`] was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSnapshot {
    /// The code the track was loaded from, if any.
    pub code: Option<Code>,
    /// Steps and current position.
    pub sequence: NoteSequence,
    /// Whether the track responds to triggers.
    pub enabled: bool,
    /// Whether a note is being held.
    pub sustaining: bool,
}

impl TrackSnapshot {
    /// Number of steps.
    pub fn size(&self) -> usize {
        self.sequence.len()
    }

    /// Position of the current step.
    pub fn index(&self) -> usize {
        self.sequence.index()
    }

    /// Returns an [`Iterator`] over the steps, in order.
    pub fn notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.sequence.iter()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TrackSnapshot {
    fn format(&self, fmt: defmt::Formatter) {
        match self.code {
            Some(code) => defmt::write!(fmt, "code {}", code),
            None => defmt::write!(fmt, "no code"),
        }
        defmt::write!(
            fmt,
            ", step {}/{}, {}, {}, {}",
            self.index() + 1,
            self.size(),
            if self.enabled { "enabled" } else { "disabled" },
            if self.sustaining { "sounding" } else { "resting" },
            self.sequence
        );
    }
}

/// A consistent copy of every track, taken in one go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// One entry per track, indexed by [`TrackId::index`].
    pub tracks: [TrackSnapshot; TRACK_COUNT],
}

impl Snapshot {
    /// Getter.
    pub fn track(&self, track: TrackId) -> &TrackSnapshot {
        &self.tracks[track.index()]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Snapshot {
    fn format(&self, fmt: defmt::Formatter) {
        for track in TrackId::ALL {
            defmt::write!(fmt, "[{}: {}] ", track, self.track(track));
        }
    }
}

/// A trait for rendering [`Snapshot`]s.
pub trait DisplayProjector {
    /// Draws the given state. Called no more often than the configured display period.
    fn project(&mut self, snapshot: &Snapshot);
}

/// Enforces a minimum period between refreshes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    period: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    /// Constructs a [`RateLimiter`] which lets the first refresh through immediately.
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Claims a refresh at `now` if at least one period has passed since the last one. Otherwise returns the
    /// [`Instant`] at which the next refresh becomes permissible.
    pub fn try_acquire_at(&mut self, now: Instant) -> Result<(), Instant> {
        match self.last {
            Some(last) if now < last + self.period => Err(last + self.period),
            _ => {
                self.last = Some(now);
                Ok(())
            }
        }
    }

    /// Same as [`try_acquire_at`][Self::try_acquire_at], using the current time.
    pub fn try_acquire(&mut self) -> Result<(), Instant> {
        self.try_acquire_at(Instant::now())
    }
}
