use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::domain::TimeLeft;

/// Shortest tick period accepted by [`spawn_countdown`].
pub const MIN_PERIOD: Duration = Duration::from_millis(10);

/// One published countdown value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownTick {
    pub time_left: TimeLeft,
    /// Set only once the deadline has actually passed. `time_left` already
    /// reads zero during the final sub-second.
    pub expired: bool,
}

impl CountdownTick {
    fn from_remaining(remaining: Duration) -> Self {
        Self {
            time_left: TimeLeft::from_duration(remaining),
            expired: remaining.is_zero(),
        }
    }
}

/// A running flash-sale countdown.
///
/// `receiver` always holds the latest [`CountdownTick`]. No tick has
/// `expired` set while time remains; the first tick that does is final, after
/// which the task ends and `changed()` starts returning errors.
pub struct Countdown {
    pub receiver: watch::Receiver<CountdownTick>,
    pub handle: JoinHandle<()>,
}

impl Countdown {
    pub fn current(&self) -> CountdownTick {
        *self.receiver.borrow()
    }

    /// Waits until the sale is over.
    pub async fn finished(self) -> Result<(), JoinError> {
        self.handle.await.map_err(|e| {
            error!(error = %e, "Countdown task failed");
            e
        })
    }
}

/// Starts ticking every `period` until `end`. Periods below [`MIN_PERIOD`]
/// are raised to it.
///
/// The deadline is fixed against the monotonic clock at spawn time, so wall
/// clock adjustments do not stretch or shrink a running countdown.
#[instrument(skip(period))]
pub fn spawn_countdown(end: DateTime<Utc>, period: Duration) -> Countdown {
    let period = if period < MIN_PERIOD {
        warn!(?period, min = ?MIN_PERIOD, "Countdown period too short, clamping");
        MIN_PERIOD
    } else {
        period
    };

    let remaining = (end - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    let deadline = Instant::now() + remaining;
    let (sender, receiver) = watch::channel(CountdownTick::from_remaining(remaining));

    let handle = tokio::spawn(
        async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let tick = CountdownTick::from_remaining(
                    deadline.saturating_duration_since(Instant::now()),
                );
                sender.send_replace(tick);
                if tick.expired {
                    info!("Flash sale ended");
                    break;
                }
                debug!(time_left = %tick.time_left, "Tick");
            }
        }
        .instrument(tracing::debug_span!("flash_sale_countdown")),
    );

    Countdown { receiver, handle }
}
