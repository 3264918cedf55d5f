//! Checks are recurring units of work: configured once, then run on every
//! collection cycle by an external scheduler.

pub mod cpu;
pub mod registry;

use crate::error::{ConfigurationError, RunError};
use crate::sender::MetricSender;

pub use cpu::CpuCheck;
pub use registry::{CHECKS, CheckEntry, list_checks, resolve_check};

pub trait Check: Send {
    fn name(&self) -> &'static str;

    /// Validates the instance configuration and acquires whatever handles the
    /// check reads from. Must succeed before [`Check::run`].
    fn configure(&mut self, instance: &toml::Table) -> Result<(), ConfigurationError>;

    /// Collects one cycle of metrics and commits them on `sender`.
    fn run(&mut self, sender: &mut dyn MetricSender) -> Result<(), RunError>;
}
