#![cfg(feature = "std")]

use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

/// Cancellable periodic timer driving discovery announcements.
///
/// While stopped, [`Announcer::tick`] never resolves, so it can sit in a
/// `select!` alongside the channel without firing.
pub struct Announcer {
    period: Duration,
    timer: Option<Interval>,
}

impl Announcer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            timer: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the timer. The first tick fires immediately. Restarting an armed
    /// announcer resets its phase.
    pub fn start(&mut self) {
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        log::debug!("[Announcer] started, every {:?}", self.period);
    }

    /// Disarm the timer. Idempotent.
    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            log::debug!("[Announcer] stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Wait for the next period. Pends forever while stopped.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
