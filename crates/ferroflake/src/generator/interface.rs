use crate::{IdGenStatus, Result, SonyflakeId};

/// A minimal interface for generating Sonyflake IDs.
pub trait IdGenerator {
    /// The machine ID embedded in every ID this generator issues.
    fn machine_id(&self) -> u16;

    /// Attempts to generate the next ID without blocking.
    ///
    /// The returned [`IdGenStatus`] contains either:
    /// - the newly generated ID, or
    /// - how long to wait before the sequence is available again.
    ///
    /// # Errors
    ///
    /// - [`Error::TimeOverflow`] once the time field is exhausted
    /// - [`Error::ClockRegression`] if the clock went backwards
    ///
    /// [`Error::TimeOverflow`]: crate::Error::TimeOverflow
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    fn try_poll_id(&self) -> Result<IdGenStatus>;

    /// Generates the next ID, sleeping the current thread while the sequence
    /// for the current tick is exhausted.
    ///
    /// Sleeping happens outside any internal lock, and each sleep lasts at
    /// most one tick.
    ///
    /// # Errors
    ///
    /// Same as [`IdGenerator::try_poll_id`].
    fn next_id(&self) -> Result<SonyflakeId> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => std::thread::sleep(yield_for),
            }
        }
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for std::sync::Arc<G> {
    fn machine_id(&self) -> u16 {
        (**self).machine_id()
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        (**self).try_poll_id()
    }
}
