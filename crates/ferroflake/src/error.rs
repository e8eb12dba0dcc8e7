/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `ferroflake` can emit.
///
/// Generation errors ([`Error::TimeOverflow`], [`Error::ClockRegression`])
/// are returned as values so that callers can map them onto their own
/// protocol responses. The remaining variants are raised while building a
/// generator or resolving the machine ID and are meant to stop startup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No network interface yielded a usable, non-loopback IPv4 address.
    #[error("no usable IPv4 address found to derive a machine id")]
    NoAddressFound,

    /// The elapsed time no longer fits into the time unit field.
    ///
    /// This is permanent: once a generator observes it, every later call on
    /// that generator fails with the same error.
    #[error("time unit overflowed the id time field")]
    TimeOverflow,

    /// The clock reported a time unit older than the last one issued.
    ///
    /// The generator refuses to emit IDs until the clock catches up again.
    #[error("clock moved backwards: now at time unit {now}, last issued {last}")]
    ClockRegression {
        /// Time unit reported by the clock on this call.
        now: u64,
        /// Time unit of the most recently issued ID.
        last: u64,
    },

    /// The tick duration is zero or not a whole number of milliseconds.
    #[error("tick duration must be a non-zero whole number of milliseconds")]
    InvalidTick,

    /// The configured epoch lies after the current system time.
    #[error("epoch is later than the current system time")]
    EpochInFuture,

    /// The generator lock was poisoned by a panicking thread.
    ///
    /// Mutexes from `parking_lot` do not poison, so this variant is only
    /// available without the `parking-lot` feature.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
