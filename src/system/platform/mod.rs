use crate::error::{CounterUnavailable, SampleError};

use super::snapshot::CpuTimes;

/// Name reported for the interrupt-time live counter.
pub const INTERRUPT_COUNTER: &str = "% Interrupt Time";

/// A counter that already reports a percentage, read without differencing
/// by the caller.
pub trait LiveCounter: Send {
    /// `Ok(None)` means the counter is healthy but has nothing new to report
    /// yet, e.g. no time elapsed since the previous read.
    fn value(&mut self) -> Result<Option<f64>, CounterUnavailable>;
}

pub trait PlatformCounters {
    /// Cumulative CPU times since boot, aggregated across all logical CPUs.
    fn cpu_times() -> Result<CpuTimes, SampleError>;
    fn open_interrupt_counter() -> Result<Box<dyn LiveCounter>, CounterUnavailable>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
use unsupported as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn cpu_times() -> Result<CpuTimes, SampleError> {
    platform_impl::Platform::cpu_times()
}

pub fn open_interrupt_counter() -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
    platform_impl::Platform::open_interrupt_counter()
}
