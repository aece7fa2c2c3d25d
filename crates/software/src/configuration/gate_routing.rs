use num_derive::{FromPrimitive, ToPrimitive};

/// Determines which gate input drives which track when the sequencer runs in
/// [`TriggerMode::Gate`][super::TriggerMode::Gate].
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateRouting {
    /// A single gate steps every enabled track in lockstep.
    #[default]
    Shared,
    /// Each track listens to a gate of its own.
    PerTrack,
}
impl super::CycleConfig for GateRouting {}
