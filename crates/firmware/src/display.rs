//! Tasks and types related to showing the sequencer's state.

use defmt::info;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{Receiver, Sender, Watch},
};
use embassy_time::{Duration, Timer};
use mr_reader_lib::display::{DisplayProjector, RateLimiter, Snapshot};

const SNAPSHOT_RECEIVER_CNT: usize = 1;
/// Publishes the sequencer's state to observers.
pub static SNAPSHOT_SYNC: Watch<CriticalSectionRawMutex, Snapshot, SNAPSHOT_RECEIVER_CNT> =
    Watch::new();
pub type SnapshotSender<'a> = Sender<'a, CriticalSectionRawMutex, Snapshot, SNAPSHOT_RECEIVER_CNT>;
pub type SnapshotReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, Snapshot, SNAPSHOT_RECEIVER_CNT>;

/// A [`DisplayProjector`] which renders to the debug probe as text. Stands in for a screen until one is wired up.
pub struct LogProjector;

impl DisplayProjector for LogProjector {
    fn project(&mut self, snapshot: &Snapshot) {
        info!("{}", snapshot);
    }
}

/// Task responsible for refreshing the display whenever the sequencer's state changes, but no more often than
/// `period` allows.
#[embassy_executor::task]
pub async fn display(mut snapshots: SnapshotReceiver<'static>, period: Duration) -> ! {
    let mut projector = LogProjector;
    let mut limiter = RateLimiter::new(period);
    loop {
        let _ = snapshots.changed().await;
        if let Err(next) = limiter.try_acquire() {
            Timer::at(next).await;
            let _ = limiter.try_acquire();
        }
        // the state may have moved on while waiting; show the freshest
        if let Some(snapshot) = snapshots.try_get() {
            projector.project(&snapshot);
        }
    }
}
