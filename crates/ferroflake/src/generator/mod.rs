mod interface;
mod lock;
mod mutex;
mod status;

pub use interface::*;
pub use lock::*;
pub use mutex::*;
pub use status::*;
