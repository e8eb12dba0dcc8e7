use core::time::Duration;

use crate::SonyflakeId;

/// Represents the result of a single attempt to generate an ID.
///
/// - [`IdGenStatus::Ready`] indicates a new ID was generated.
/// - [`IdGenStatus::Pending`] means the sequence for the current time unit is
///   exhausted and no ID can be issued until the next tick starts.
///
/// This allows non-blocking generation loops: the caller decides whether to
/// sleep the thread, await a timer, or spin.
///
/// # Example
///
/// ```
/// use ferroflake::{IdGenStatus, IdGenerator, LockIdGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_000
///     }
/// }
///
/// let generator = LockIdGenerator::new(7, FixedTime);
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => assert_eq!(id.machine_id(), 7),
///     IdGenStatus::Pending { yield_for } => println!("back off for {yield_for:?}"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SonyflakeId,
    },
    /// The sequence is exhausted for the current time unit.
    Pending {
        /// Time left until the next tick boundary. Never longer than one
        /// tick.
        yield_for: Duration,
    },
}
