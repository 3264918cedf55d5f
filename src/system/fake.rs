use std::collections::VecDeque;

use crate::error::{CounterUnavailable, SampleError};

use super::collector::Host;
use super::platform::{INTERRUPT_COUNTER, LiveCounter};
use super::snapshot::CpuTimes;

/// Scripted host used in tests and benches: each `cpu_times` call pops the
/// next scripted reading, and an exhausted script reads as empty.
pub struct FakeHost {
    logical_cpus: Option<usize>,
    script: VecDeque<Result<CpuTimes, SampleError>>,
    interrupt: Option<VecDeque<Result<Option<f64>, CounterUnavailable>>>,
}

impl FakeHost {
    pub fn new(logical_cpus: usize, script: Vec<Result<CpuTimes, SampleError>>) -> Self {
        Self {
            logical_cpus: Some(logical_cpus),
            script: script.into(),
            interrupt: None,
        }
    }

    /// Host whose metadata does not report a CPU count.
    pub fn without_cpu_count(mut self) -> Self {
        self.logical_cpus = None;
        self
    }

    /// Makes the interrupt counter openable, returning `values` in order.
    pub fn with_interrupt(self, values: Vec<Result<f64, CounterUnavailable>>) -> Self {
        self.with_interrupt_readings(values.into_iter().map(|v| v.map(Some)).collect())
    }

    /// Like `with_interrupt`, but readings may also be `Ok(None)`.
    pub fn with_interrupt_readings(
        mut self,
        readings: Vec<Result<Option<f64>, CounterUnavailable>>,
    ) -> Self {
        self.interrupt = Some(readings.into());
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Host for FakeHost {
    fn logical_cpu_count(&self) -> Option<usize> {
        self.logical_cpus
    }

    fn cpu_times(&mut self) -> Result<CpuTimes, SampleError> {
        self.script.pop_front().unwrap_or(Err(SampleError::Empty))
    }

    fn open_interrupt_counter(&mut self) -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
        match self.interrupt.take() {
            Some(values) => Ok(Box::new(FakeCounter { values })),
            None => Err(CounterUnavailable::new(
                INTERRUPT_COUNTER,
                "counter not scripted",
            )),
        }
    }
}

struct FakeCounter {
    values: VecDeque<Result<Option<f64>, CounterUnavailable>>,
}

impl LiveCounter for FakeCounter {
    fn value(&mut self) -> Result<Option<f64>, CounterUnavailable> {
        self.values
            .pop_front()
            .unwrap_or_else(|| Err(CounterUnavailable::new(INTERRUPT_COUNTER, "script exhausted")))
    }
}
