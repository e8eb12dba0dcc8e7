/// A source of wall-clock time measured from a fixed epoch.
///
/// The generator divides this value by its tick duration to get the time
/// unit embedded in each ID. Implementations are free to move backwards (a
/// wall clock adjusted by NTP does); the generator detects that and reports
/// [`Error::ClockRegression`].
///
/// # Example
///
/// ```
/// use ferroflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
pub trait TimeSource {
    /// Returns the milliseconds elapsed since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
