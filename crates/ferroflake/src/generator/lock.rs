use core::{cmp::Ordering as CmpOrdering, time::Duration};

use portable_atomic::{AtomicBool, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, Result, SonyflakeId,
    generator::{IdGenStatus, IdGenerator, Mutex},
    time::{SystemClock, TimeSource},
};

/// Default tick: 10 milliseconds per time unit.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// A lock-based Sonyflake ID generator suitable for multi-threaded
/// environments.
///
/// The last issued ID lives behind a [`Mutex`]; each call holds the lock for
/// a single read of the clock and one state update, never across a sleep.
/// Share one instance through an `Arc` to serve many threads or tasks.
///
/// ## Guarantees
/// - IDs from one instance are strictly increasing in issue order
/// - The sequence restarts at zero in every new time unit
/// - A clock moving backwards is reported, never papered over
/// - Running out of time bits is permanent for the instance
///
/// [`Mutex`]: crate::generator::Mutex
pub struct LockIdGenerator<T = SystemClock>
where
    T: TimeSource,
{
    state: Mutex<Option<SonyflakeId>>,
    overflowed: AtomicBool,
    machine_id: u16,
    tick_millis: u64,
    time: T,
}

impl<T> LockIdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new generator for `machine_id` using the [`DEFAULT_TICK`].
    ///
    /// # Parameters
    ///
    /// - `machine_id`: A unique identifier for the node generating IDs. This
    ///   value is encoded into every generated ID.
    /// - `time`: A [`TimeSource`] returning milliseconds since the epoch.
    ///
    /// # Example
    /// ```
    /// use ferroflake::{IdGenerator, LockIdGenerator, SystemClock};
    ///
    /// let generator = LockIdGenerator::new(0x0102, SystemClock::default());
    /// let id = generator.next_id().unwrap();
    /// assert_eq!(id.machine_id(), 0x0102);
    /// ```
    pub fn new(machine_id: u16, time: T) -> Self {
        Self {
            state: Mutex::new(None),
            overflowed: AtomicBool::new(false),
            machine_id,
            tick_millis: DEFAULT_TICK.as_millis() as u64,
            time,
        }
    }

    /// Creates a new generator with a custom tick duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTick`] unless `tick` is a non-zero whole
    /// number of milliseconds.
    pub fn with_tick(machine_id: u16, time: T, tick: Duration) -> Result<Self> {
        let millis = u64::try_from(tick.as_millis()).map_err(|_| Error::InvalidTick)?;
        if millis == 0 || tick.subsec_nanos() % 1_000_000 != 0 {
            return Err(Error::InvalidTick);
        }
        let mut generator = Self::new(machine_id, time);
        generator.tick_millis = millis;
        Ok(generator)
    }

    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Attempts to generate the next ID.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The sequence is exhausted;
    ///   retry after `yield_for`
    ///
    /// # Errors
    /// - [`Error::TimeOverflow`] if the time unit no longer fits, now or on
    ///   any earlier call
    /// - [`Error::ClockRegression`] if the clock is behind the last issued ID
    /// - [`Error::LockPoisoned`] without the `parking-lot` feature, if another
    ///   thread panicked while holding the lock
    ///
    /// # Example
    /// ```
    /// use ferroflake::{IdGenStatus, LockIdGenerator, SystemClock};
    ///
    /// let generator = LockIdGenerator::new(1, SystemClock::default());
    /// let id = loop {
    ///     match generator.try_poll_id() {
    ///         Ok(IdGenStatus::Ready { id }) => break id,
    ///         Ok(IdGenStatus::Pending { yield_for }) => std::thread::sleep(yield_for),
    ///         Err(e) => panic!("generator error: {e}"),
    ///     }
    /// };
    /// assert_eq!(id.sequence(), 0);
    /// ```
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        if self.overflowed.load(Ordering::Acquire) {
            return Err(Error::TimeOverflow);
        }

        let mut last = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // A caller that overflowed may have released the lock after we
        // passed the check above.
        if self.overflowed.load(Ordering::Acquire) {
            return Err(Error::TimeOverflow);
        }

        // The clock is read under the lock so callers observe it in the same
        // order they update the state.
        let millis = self.time.current_millis();
        let now = millis / self.tick_millis;

        let next = match *last {
            None => self.first_of(now)?,
            Some(id) => match now.cmp(&id.time_unit()) {
                CmpOrdering::Greater => self.first_of(now)?,
                CmpOrdering::Equal if id.has_sequence_room() => id.increment_sequence(),
                CmpOrdering::Equal => {
                    return Ok(IdGenStatus::Pending {
                        yield_for: self.until_next_tick(millis),
                    });
                }
                CmpOrdering::Less => return Err(Self::cold_clock_behind(now, id.time_unit())),
            },
        };

        *last = Some(next);
        Ok(IdGenStatus::Ready { id: next })
    }

    fn first_of(&self, time_unit: u64) -> Result<SonyflakeId> {
        if time_unit > SonyflakeId::max_time_unit() {
            self.overflowed.store(true, Ordering::Release);
            #[cfg(feature = "tracing")]
            tracing::error!(time_unit, "time unit overflowed, generator disabled");
            return Err(Error::TimeOverflow);
        }
        Ok(SonyflakeId::from_components(time_unit, 0, self.machine_id))
    }

    fn until_next_tick(&self, millis: u64) -> Duration {
        let into_tick = millis % self.tick_millis;
        Duration::from_millis(self.tick_millis - into_tick)
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backwards");
        Error::ClockRegression { now, last }
    }
}

impl<T> IdGenerator for LockIdGenerator<T>
where
    T: TimeSource,
{
    fn machine_id(&self) -> u16 {
        self.machine_id()
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_poll_id()
    }
}
