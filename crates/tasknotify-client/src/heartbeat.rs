//! Liveness pings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use tasknotify_protocols::{ClientFrame, now_millis};

/// Heartbeat timer bound to one open socket.
///
/// Created when a socket opens and dropped when it closes. Live timers are
/// counted in a shared gauge so a leaked or duplicated timer is observable.
pub struct Heartbeat {
    interval: Interval,
    gauge: Arc<AtomicUsize>,
}

impl Heartbeat {
    /// Start a heartbeat whose first tick is one full `period` from now.
    pub fn start(period: Duration, gauge: Arc<AtomicUsize>) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        gauge.fetch_add(1, Ordering::SeqCst);
        Self { interval, gauge }
    }

    /// Wait for the next tick and build the ping to send.
    pub async fn tick(&mut self) -> ClientFrame {
        self.interval.tick().await;
        ClientFrame::ping(now_millis())
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.gauge.fetch_sub(1, Ordering::SeqCst);
    }
}
