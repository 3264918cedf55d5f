use crate::error::{CounterUnavailable, SampleError};
use crate::system::snapshot::CpuTimes;

use super::{INTERRUPT_COUNTER, LiveCounter, PlatformCounters};

pub struct Platform;

impl PlatformCounters for Platform {
    fn cpu_times() -> Result<CpuTimes, SampleError> {
        Err(SampleError::Unsupported)
    }

    fn open_interrupt_counter() -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
        Err(CounterUnavailable::new(
            INTERRUPT_COUNTER,
            "not supported on this platform",
        ))
    }
}
