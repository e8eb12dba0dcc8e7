use ferroflake::{IdGenerator, LockIdGenerator, SystemClock};

/// The generator the binary shares between both front-ends.
pub type Generator = LockIdGenerator<SystemClock>;

/// A generator that can be shared across tokio tasks.
///
/// Both front-ends are generic over this so tests can drive them with a
/// generator on a mock clock.
pub trait SharedGenerator: IdGenerator + Send + Sync + 'static {}

impl<G> SharedGenerator for G where G: IdGenerator + Send + Sync + 'static {}
