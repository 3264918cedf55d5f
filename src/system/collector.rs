use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

use crate::error::{CounterUnavailable, SampleError};

use super::platform::{self, LiveCounter};
use super::snapshot::{CpuTimes, Snapshot};

/// Source of the raw counters a CPU check reads.
pub trait Host: Send {
    /// Number of logical CPUs, or `None` when host metadata is unavailable.
    fn logical_cpu_count(&self) -> Option<usize>;
    fn cpu_times(&mut self) -> Result<CpuTimes, SampleError>;
    fn open_interrupt_counter(&mut self) -> Result<Box<dyn LiveCounter>, CounterUnavailable>;
}

/// The machine the process runs on.
#[derive(Debug, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    fn logical_cpu_count(&self) -> Option<usize> {
        let sys =
            System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
        match sys.cpus().len() {
            0 => None,
            n => Some(n),
        }
    }

    fn cpu_times(&mut self) -> Result<CpuTimes, SampleError> {
        platform::cpu_times()
    }

    fn open_interrupt_counter(&mut self) -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
        platform::open_interrupt_counter()
    }
}

/// Captures one snapshot of the cumulative counters.
pub fn sample<H: Host + ?Sized>(host: &mut H, logical_cpus: usize) -> Result<Snapshot, SampleError> {
    if logical_cpus == 0 {
        return Err(SampleError::Empty);
    }

    let times = host.cpu_times()?;
    for (name, value) in times.fields() {
        if !value.is_finite() || value < 0.0 {
            return Err(SampleError::InvalidValue { name, value });
        }
    }

    debug!(
        user = times.user,
        system = times.system,
        idle = times.idle,
        logical_cpus,
        "sampled cpu times"
    );
    Ok(Snapshot::new(times, logical_cpus))
}
