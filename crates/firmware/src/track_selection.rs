//! Tasks and types related to choosing which tracks play.

use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{Receiver, Sender, Watch},
};
use mr_reader_lib::{
    configuration::{CycleConfig, TrackSelection},
    sequencer::TrackId,
};

const TRACK_SELECTION_RECEIVER_CNT: usize = 1;
/// Syncs the [track selection](`TrackSelection`) across tasks.
pub static TRACK_SELECTION_SYNC: Watch<
    CriticalSectionRawMutex,
    TrackSelection,
    TRACK_SELECTION_RECEIVER_CNT,
> = Watch::new_with(TrackSelection::Both);
pub type TrackSelectionSender<'a> =
    Sender<'a, CriticalSectionRawMutex, TrackSelection, TRACK_SELECTION_RECEIVER_CNT>;
pub type TrackSelectionReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, TrackSelection, TRACK_SELECTION_RECEIVER_CNT>;

/// Handles button presses, cycling through the [`TrackSelection`] configurations.
///
/// One LED per track shows whether the track is enabled.
#[embassy_executor::task]
pub async fn select_tracks(
    mut button: ExtiInput<'static>,
    mut leds: [Output<'static>; 2],
    track_selection: TrackSelectionSender<'static>,
) -> ! {
    let mut selection = track_selection
        .try_get()
        .expect("Track selection state should never be uninitialized");
    loop {
        for track in TrackId::ALL {
            let led = &mut leds[track.index()];
            if selection.is_enabled(track) {
                led.set_high();
            } else {
                led.set_low();
            }
        }

        button.wait_for_falling_edge().await;
        selection = selection.cycle();
        track_selection.send(selection);
    }
}
