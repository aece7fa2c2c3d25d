//! This module contains both the static settings loaded once at startup and the user-selectable settings (implemented as
//! enums), along with traits to make them easier to work with in code.

mod control_voltage;
pub use control_voltage::*;

mod gate_routing;
pub use gate_routing::*;

mod scale;
pub use scale::*;

mod track_selection;
pub use track_selection::*;

mod trigger_mode;
pub use trigger_mode::*;

use embassy_time::Duration;
use num_traits::{FromPrimitive, ToPrimitive};
use wmidi::{Channel, U7, Velocity};

/// A trait which allows infinite cycling of an enum's variants.
///
/// Useful for pushbutton user interfaces, allowing presses to advance from the current to the next variant,
/// cycling back to the beginning when all variants have been exhausted.
pub trait CycleConfig {
    /// Return the next variant, cycling back to the beginning as needed.
    fn cycle(self) -> Self
    where
        Self: FromPrimitive + ToPrimitive + Sized,
    {
        let index = self
            .to_u8()
            .expect("enum variants should be castable to u8");
        match <Self as FromPrimitive>::from_u8(index + 1) {
            Some(new_selection) => new_selection,
            None => FromPrimitive::from_u8(0).expect("enum should not be empty"),
        }
    }
}

/// Velocity used for every note event. Fixed at the maximum, matching what the device has always sent.
pub const VELOCITY: Velocity = U7::from_u8_lossy(127);

/// Everything the sequencer needs to know about its surroundings, loaded once at startup.
///
/// None of these change while the device runs; the one setting a performer can change on the fly,
/// [`TrackSelection`], is owned by the [`Sequencer`][crate::sequencer::Sequencer] instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Quantizer turning code digits into notes.
    pub scale: Scale,
    /// Conversion from notes to DAC values.
    pub control_voltage: ControlVoltage,
    /// MIDI channel on which note events are sent.
    pub channel: Channel,
    /// Velocity of note-on and note-off events.
    pub velocity: Velocity,
    /// Whether steps advance on a clock or follow an external gate.
    pub trigger_mode: TriggerMode,
    /// In [`TriggerMode::Gate`], whether both tracks listen to one gate or each to its own.
    pub gate_routing: GateRouting,
    /// Interval between steps in [`TriggerMode::FreeRunning`].
    pub step_period: Duration,
    /// Minimum interval between display refreshes.
    pub display_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: Scale::default(),
            control_voltage: ControlVoltage::default(),
            channel: Channel::Ch1,
            velocity: VELOCITY,
            trigger_mode: TriggerMode::default(),
            gate_routing: GateRouting::default(),
            step_period: Duration::from_millis(500),
            // roughly 30 frames per second
            display_period: Duration::from_millis(33),
        }
    }
}
