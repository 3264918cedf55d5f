use crate::error::{CounterUnavailable, SampleError};
use crate::system::snapshot::CpuTimes;

use super::{INTERRUPT_COUNTER, LiveCounter, PlatformCounters};

pub struct Platform;

impl PlatformCounters for Platform {
    #[allow(deprecated)]
    fn cpu_times() -> Result<CpuTimes, SampleError> {
        let mut info = unsafe { std::mem::zeroed::<libc::host_cpu_load_info>() };
        let mut count = libc::HOST_CPU_LOAD_INFO_COUNT;
        let ret = unsafe {
            libc::host_statistics64(
                libc::mach_host_self(),
                libc::HOST_CPU_LOAD_INFO,
                &mut info as *mut _ as libc::host_info64_t,
                &mut count,
            )
        };
        if ret != libc::KERN_SUCCESS {
            return Err(SampleError::Parse(format!(
                "host_statistics64 returned {ret}"
            )));
        }

        let ticks = |state: libc::c_int| info.cpu_ticks[state as usize] as f64;
        // Mach reports idle separately from system time
        Ok(CpuTimes {
            user: ticks(libc::CPU_STATE_USER) + ticks(libc::CPU_STATE_NICE),
            system: ticks(libc::CPU_STATE_SYSTEM),
            idle: ticks(libc::CPU_STATE_IDLE),
            ..CpuTimes::default()
        })
    }

    fn open_interrupt_counter() -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
        Err(CounterUnavailable::new(
            INTERRUPT_COUNTER,
            "interrupt time is not exposed by the Mach host statistics",
        ))
    }
}
