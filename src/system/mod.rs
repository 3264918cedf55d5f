pub mod collector;
pub mod fake;
pub mod platform;
pub mod snapshot;

pub use collector::{Host, SystemHost, sample};
pub use platform::LiveCounter;
pub use snapshot::{CpuTimes, Snapshot};
