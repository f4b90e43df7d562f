pub mod clock;
mod core;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use core::TtlStore;
pub use types::*;
