use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::TimeSource;
use crate::{Error, Result};

/// Sonyflake epoch: Monday, September 1, 2014 00:00:00 UTC
pub const SONYFLAKE_EPOCH: Duration = Duration::from_millis(1_409_529_600_000);

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A wall-clock time source aligned to a fixed epoch.
///
/// Every call reads `SystemTime::now()`, so adjustments to the host clock
/// are visible to the generator. A reading earlier than the epoch saturates
/// to zero, which the generator reports as a clock regression once it has
/// issued anything.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a clock aligned to [`SONYFLAKE_EPOCH`].
    fn default() -> Self {
        Self {
            epoch: SONYFLAKE_EPOCH,
        }
    }
}

impl SystemClock {
    /// Constructs a clock using `epoch` (a [`Duration`] since 1970-01-01 UTC)
    /// as t = 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochInFuture`] if the current system time is
    /// earlier than `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use ferroflake::{SONYFLAKE_EPOCH, SystemClock, TimeSource};
    ///
    /// let clock = SystemClock::with_epoch(SONYFLAKE_EPOCH).unwrap();
    /// assert!(clock.current_millis() > 0);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        if unix_now() < epoch {
            return Err(Error::EpochInFuture);
        }
        Ok(Self { epoch })
    }

    pub fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let elapsed = unix_now().saturating_sub(self.epoch).as_millis();
        u64::try_from(elapsed).unwrap_or(u64::MAX)
    }
}

fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}
