use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// This keeps the async generation loop independent of any one runtime.
pub trait SleepProvider {
    /// Returns a future that completes after roughly `dur`.
    ///
    /// The future is `Send` so a generating task can move between worker
    /// threads while it waits.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
