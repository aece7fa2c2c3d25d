use num_derive::{FromPrimitive, ToPrimitive};

/// Determines what moves the sequencer from one step to the next.
#[derive(Debug, Default, Copy, Clone, ToPrimitive, FromPrimitive, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerMode {
    /// Steps advance on every tick of a fixed-period clock. Each tick turns off the current note and immediately turns on
    /// the next one, so there is no rest between steps.
    #[default]
    FreeRunning,
    /// Steps follow an external gate. The current note sounds for as long as the gate is held high; releasing the gate
    /// turns the note off and moves on, so note duration is up to whoever drives the gate.
    Gate,
}
impl super::CycleConfig for TriggerMode {}
