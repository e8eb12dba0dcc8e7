mod codec;
mod sonyflake;

pub use codec::*;
pub use sonyflake::*;
