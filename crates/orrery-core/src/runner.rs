//! Periodic tick tasks.
//!
//! Each hosted engine gets its own tokio task that advances it by the
//! measured wall-clock time since the previous tick. Missed ticks are
//! skipped rather than replayed in a burst, so a stalled runtime produces
//! one larger step instead of many small ones.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::device::Simulated;

/// Spawn the tick loop for one engine.
///
/// The task runs until the returned handle is aborted. The engine lock is
/// taken once per tick and never held across an await point.
pub fn spawn_ticker<E: Simulated>(
    label: impl Into<String>,
    engine: Arc<Mutex<E>>,
    period: Duration,
) -> JoinHandle<()> {
    let label = label.into();
    tokio::spawn(async move {
        info!(device = %label, period_ms = period.as_millis(), "tick runner started");

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick of an interval completes immediately.
        interval.tick().await;
        let mut last = Instant::now();

        loop {
            interval.tick().await;
            let now = Instant::now();
            let elapsed = now.saturating_duration_since(last);
            last = now;

            engine.lock().advance(elapsed);

            if elapsed > period.saturating_mul(2) {
                debug!(device = %label, elapsed_ms = elapsed.as_millis(), "tick ran late");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orrery_dome::{Dome, DomeConfig};

    use super::*;

    #[tokio::test]
    async fn ticker_moves_the_engine() {
        let engine = Arc::new(Mutex::new(Dome::new(DomeConfig::default()).unwrap()));
        engine.lock().slew_to_azimuth(200.0).unwrap();

        let handle = spawn_ticker("dome/0", Arc::clone(&engine), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        let azimuth = engine.lock().azimuth();
        assert!(azimuth > 180.0, "dome did not move: {azimuth}");
        assert!(azimuth <= 200.0);
    }

    #[tokio::test]
    async fn aborted_ticker_stops() {
        let engine = Arc::new(Mutex::new(Dome::new(DomeConfig::default()).unwrap()));
        let handle = spawn_ticker("dome/0", Arc::clone(&engine), Duration::from_millis(10));
        handle.abort();
        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());

        engine.lock().rotate(true).unwrap();
        let before = engine.lock().azimuth();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!((engine.lock().azimuth() - before).abs() < f64::EPSILON);
    }
}
