//! Background workers.
//!
//! Two loops keep a rack honest without external triggers: a converge sweep
//! that re-converges every registered app, and an idle sweep that puts
//! quiet apps to sleep. Errors are logged and the loops keep going; a
//! cancelled token stops a loop at the next select point.

use crate::converge::Converger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Spawns the periodic converge sweep.
///
/// The first tick fires immediately so a freshly started process converges
/// its rack without waiting a full interval.
pub fn spawn_converge_worker(
    converger: Arc<Converger>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = converger.converge_all().await {
                        warn!("converge sweep failed: {e}");
                    }
                }
            }
        }
    })
}

/// Spawns the periodic idle sweep.
pub fn spawn_idle_worker(
    converger: Arc<Converger>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = converger.idle().await {
                        warn!("idle sweep failed: {e}");
                    }
                }
            }
        }
    })
}
