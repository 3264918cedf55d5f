use crate::error::{CounterUnavailable, SampleError};
use crate::system::snapshot::CpuTimes;

use super::{INTERRUPT_COUNTER, LiveCounter, PlatformCounters};

use windows_sys::Win32::{
    Foundation::FILETIME,
    System::Performance::{
        PDH_FMT_COUNTERVALUE, PDH_FMT_DOUBLE, PDH_HCOUNTER, PDH_HQUERY, PdhAddEnglishCounterW,
        PdhCloseQuery, PdhCollectQueryData, PdhGetFormattedCounterValue, PdhOpenQueryW,
    },
    System::Threading::GetSystemTimes,
};

const INTERRUPT_COUNTER_PATH: &str = r"\Processor(_Total)\% Interrupt Time";
const ERROR_SUCCESS: u32 = 0;

pub struct Platform;

impl PlatformCounters for Platform {
    fn cpu_times() -> Result<CpuTimes, SampleError> {
        let mut idle = unsafe { std::mem::zeroed::<FILETIME>() };
        let mut kernel = unsafe { std::mem::zeroed::<FILETIME>() };
        let mut user = unsafe { std::mem::zeroed::<FILETIME>() };
        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return Err(SampleError::Io(std::io::Error::last_os_error()));
        }
        // kernel time as reported by GetSystemTimes includes idle time
        Ok(CpuTimes::from_kernel_times(
            filetime_ticks(&idle),
            filetime_ticks(&kernel),
            filetime_ticks(&user),
        ))
    }

    fn open_interrupt_counter() -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
        Ok(Box::new(PdhCounter::open(INTERRUPT_COUNTER_PATH)?))
    }
}

fn filetime_ticks(ft: &FILETIME) -> f64 {
    (((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64) as f64
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// A single-counter PDH query, open for the lifetime of the owning check.
struct PdhCounter {
    query: PDH_HQUERY,
    counter: PDH_HCOUNTER,
}

// PDH query handles are not tied to the thread that opened them.
unsafe impl Send for PdhCounter {}

impl PdhCounter {
    fn open(path: &str) -> Result<Self, CounterUnavailable> {
        let mut query = unsafe { std::mem::zeroed::<PDH_HQUERY>() };
        let status = unsafe { PdhOpenQueryW(std::ptr::null(), 0, &mut query) };
        if status != ERROR_SUCCESS {
            return Err(pdh_error("PdhOpenQueryW", status));
        }

        let mut counter = unsafe { std::mem::zeroed::<PDH_HCOUNTER>() };
        let path = wide(path);
        let status = unsafe { PdhAddEnglishCounterW(query, path.as_ptr(), 0, &mut counter) };
        if status != ERROR_SUCCESS {
            unsafe { PdhCloseQuery(query) };
            return Err(pdh_error("PdhAddEnglishCounterW", status));
        }

        // rate counters need a first collection before they can be formatted
        let status = unsafe { PdhCollectQueryData(query) };
        if status != ERROR_SUCCESS {
            unsafe { PdhCloseQuery(query) };
            return Err(pdh_error("PdhCollectQueryData", status));
        }

        Ok(PdhCounter { query, counter })
    }
}

impl LiveCounter for PdhCounter {
    fn value(&mut self) -> Result<Option<f64>, CounterUnavailable> {
        let status = unsafe { PdhCollectQueryData(self.query) };
        if status != ERROR_SUCCESS {
            return Err(pdh_error("PdhCollectQueryData", status));
        }

        let mut value = unsafe { std::mem::zeroed::<PDH_FMT_COUNTERVALUE>() };
        let status = unsafe {
            PdhGetFormattedCounterValue(
                self.counter,
                PDH_FMT_DOUBLE,
                std::ptr::null_mut(),
                &mut value,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(pdh_error("PdhGetFormattedCounterValue", status));
        }
        Ok(Some(unsafe { value.Anonymous.doubleValue }))
    }
}

impl Drop for PdhCounter {
    fn drop(&mut self) {
        unsafe { PdhCloseQuery(self.query) };
    }
}

fn pdh_error(call: &str, status: u32) -> CounterUnavailable {
    CounterUnavailable::new(INTERRUPT_COUNTER, format!("{call} failed with 0x{status:08x}"))
}
