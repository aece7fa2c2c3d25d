use crate::sequencer::TrackId;
use num_derive::{FromPrimitive, ToPrimitive};

/// Determines which tracks respond to triggers. Disabled tracks keep their position and sit silent.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackSelection {
    /// Both tracks play.
    #[default]
    Both,
    /// Only the first track plays.
    FirstOnly,
    /// Only the second track plays.
    SecondOnly,
}

impl TrackSelection {
    /// Returns `true` if the given track should respond to triggers.
    pub fn is_enabled(&self, track: TrackId) -> bool {
        match (self, track) {
            (Self::Both, _) => true,
            (Self::FirstOnly, TrackId::First) => true,
            (Self::SecondOnly, TrackId::Second) => true,
            _ => false,
        }
    }
}

impl super::CycleConfig for TrackSelection {}
