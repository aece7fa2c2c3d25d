//! The control loop: the only task that touches the [`Sequencer`].

use crate::{
    code_selection::CODE_CHANGE, control_voltage::DacSink, display::SnapshotSender, midi,
    track_selection::TrackSelectionReceiver,
};
use defmt::info;
use embassy_futures::select::{Either3, select3};
use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};
use mr_reader_lib::{
    configuration::{GateRouting, TriggerMode},
    sequencer::{Sequencer, TrackId},
    step::{GateState, Trigger},
};

/// How often gate inputs are sampled. Pulses shorter than this may go unnoticed.
const GATE_POLL_PERIOD: Duration = Duration::from_millis(1);

/// Gate inputs, one per track.
pub struct Gates {
    inputs: [Input<'static>; 2],
}

impl Gates {
    pub fn new(first: Input<'static>, second: Input<'static>) -> Self {
        Self {
            inputs: [first, second],
        }
    }

    fn level(&self, track: TrackId) -> GateState {
        GateState::from(self.inputs[track.index()].is_high())
    }
}

/// Task responsible for stepping the sequence.
///
/// Depending on the configured [`TriggerMode`], it either steps on a fixed clock or polls the gate inputs. In
/// between, it takes in code changes and track selection changes. After anything that could have changed, it
/// publishes a fresh snapshot for the display.
#[embassy_executor::task]
pub async fn sequencer(
    mut sequencer: Sequencer,
    mut cv: DacSink,
    gates: Gates,
    mut track_selection: TrackSelectionReceiver<'static>,
    snapshot: SnapshotSender<'static>,
) -> ! {
    let mut midi = midi::links();
    let trigger_mode = sequencer.config().trigger_mode;
    let gate_routing = sequencer.config().gate_routing;
    let mut ticker = Ticker::every(match trigger_mode {
        TriggerMode::FreeRunning => sequencer.config().step_period,
        TriggerMode::Gate => GATE_POLL_PERIOD,
    });
    info!("Sequencing in {} mode", trigger_mode);

    let mut published = sequencer.snapshot();
    snapshot.send(published);

    loop {
        match select3(ticker.next(), CODE_CHANGE.wait(), track_selection.changed()).await {
            Either3::First(_) => match (trigger_mode, gate_routing) {
                (TriggerMode::FreeRunning, _) => {
                    sequencer.step(Trigger::Tick, &mut midi, &mut cv);
                }
                (TriggerMode::Gate, GateRouting::Shared) => {
                    let level = gates.level(TrackId::First);
                    sequencer.step(Trigger::Gate(level), &mut midi, &mut cv);
                }
                (TriggerMode::Gate, GateRouting::PerTrack) => {
                    for track in TrackId::ALL {
                        let level = gates.level(track);
                        sequencer.step_track(track, Trigger::Gate(level), &mut midi, &mut cv);
                    }
                }
            },
            Either3::Second(code) => {
                // a rejected code is logged by the sequencer and leaves the track as it was
                let _ = sequencer.load(TrackId::First, code, &mut midi, &mut cv);
            }
            Either3::Third(selection) => {
                sequencer.select(selection, &mut midi, &mut cv);
            }
        }

        let current = sequencer.snapshot();
        if current != published {
            published = current;
            snapshot.send(published);
        }
    }
}
