use core::future::Future;

use super::SleepProvider;
use crate::{
    Result, SonyflakeId,
    generator::{IdGenStatus, IdGenerator},
};

/// Extension trait for asynchronously generating IDs.
///
/// Instead of blocking the thread while the sequence for the current tick is
/// exhausted, the returned future sleeps through the [`SleepProvider`] and
/// retries. No lock is held while it sleeps.
pub trait IdGeneratorAsyncExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// This future may return an error if the generator encounters one.
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SonyflakeId>> + Send
    where
        S: SleepProvider;
}

impl<G> IdGeneratorAsyncExt for G
where
    G: IdGenerator + Sync,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SonyflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id()? {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_for } => yield_for,
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
