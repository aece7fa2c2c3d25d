//! Tasks and types related to changing the code the first track plays.

use defmt::{info, warn};
use embassy_stm32::exti::ExtiInput;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use mr_reader_lib::code::Code;

/// Codes the device can play. The first is loaded on the first track at startup, the second on the second track.
pub const PRESET_CODES: [&str; 4] = [
    "4969757161616",
    "4901234567894",
    "4549980123457",
    "4969757161615",
];

/// Notifies the sequencer of a new code for the first track.
pub static CODE_CHANGE: Signal<CriticalSectionRawMutex, Code> = Signal::new();

/// Handles button presses, moving the first track on to the next preset code.
#[embassy_executor::task]
pub async fn select_code(mut button: ExtiInput<'static>) -> ! {
    let mut preset = 0;
    loop {
        button.wait_for_rising_edge().await;
        preset = (preset + 1) % PRESET_CODES.len();

        match Code::parse(PRESET_CODES[preset]) {
            Ok(code) => {
                info!("Selected preset {}: {}", preset, code);
                CODE_CHANGE.signal(code);
            }
            Err(e) => warn!("Preset {} is not a valid code: {}", preset, e),
        }
    }
}
