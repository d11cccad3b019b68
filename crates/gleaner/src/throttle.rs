//! Fixed delay between remote operations.
//!
//! Both remote services rate-limit, so the pipeline pauses after every search and every fetch.
//! [`Throttle::none`] turns the pause off for tests.

use super::*;

/// Default pause between remote operations.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// A named, configurable inter-operation delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
  /// How long [`Throttle::pause`] sleeps.
  delay: Duration,
}

impl Default for Throttle {
  fn default() -> Self { Self { delay: DEFAULT_DELAY } }
}

impl Throttle {
  /// A throttle that sleeps for `delay`.
  pub fn new(delay: Duration) -> Self { Self { delay } }

  /// A throttle that never sleeps.
  pub fn none() -> Self { Self { delay: Duration::ZERO } }

  /// The configured delay.
  pub fn delay(&self) -> Duration { self.delay }

  /// Sleeps for the configured delay; returns immediately when it is zero.
  pub async fn pause(&self) {
    if !self.delay.is_zero() {
      trace!("Throttling for {:?}", self.delay);
      tokio::time::sleep(self.delay).await;
    }
  }
}
