use core::{future::Future, time::Duration};

use crate::{
    Result, SonyflakeId,
    futures::{IdGeneratorAsyncExt, SleepProvider},
    generator::IdGenerator,
};

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(dur)
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This strategy avoids timer-based delays by yielding to the scheduler
/// immediately. It trades tighter polling loops (and more CPU) for lower
/// latency right at the tick boundary.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}

/// Extension trait for asynchronously generating IDs on the
/// [`tokio`](https://docs.rs/tokio) runtime with [`TokioSleep`].
pub trait IdGeneratorAsyncTokioExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying generator fails.
    fn try_next_id_async(&self) -> impl Future<Output = Result<SonyflakeId>> + Send;
}

impl<G> IdGeneratorAsyncTokioExt for G
where
    G: IdGenerator + Sync,
{
    fn try_next_id_async(&self) -> impl Future<Output = Result<SonyflakeId>> + Send {
        <Self as IdGeneratorAsyncExt>::try_next_id_async::<TokioSleep>(self)
    }
}
