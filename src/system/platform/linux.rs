use crate::error::{CounterUnavailable, SampleError};
use crate::system::snapshot::CpuTimes;

use super::{INTERRUPT_COUNTER, LiveCounter, PlatformCounters};

const PROC_STAT: &str = "/proc/stat";

pub struct Platform;

impl PlatformCounters for Platform {
    fn cpu_times() -> Result<CpuTimes, SampleError> {
        let contents = std::fs::read_to_string(PROC_STAT)?;
        Ok(parse_proc_stat(&contents)?.cpu_times())
    }

    fn open_interrupt_counter() -> Result<Box<dyn LiveCounter>, CounterUnavailable> {
        let stat = read_proc_stat().map_err(|e| CounterUnavailable::new(INTERRUPT_COUNTER, e))?;
        Ok(Box::new(InterruptCounter { last: stat }))
    }
}

/// Aggregate `cpu` line of `/proc/stat`, in USER_HZ ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ProcStat {
    user: f64,
    nice: f64,
    system: f64,
    idle: f64,
    iowait: f64,
    irq: f64,
    softirq: f64,
    steal: f64,
    guest: f64,
    guest_nice: f64,
}

impl ProcStat {
    fn cpu_times(&self) -> CpuTimes {
        // user and nice already include guest and guest_nice
        let guest = self.guest + self.guest_nice;
        let user = (self.user + self.nice - guest).max(0.0);
        CpuTimes {
            user,
            system: self.system + self.irq + self.softirq,
            idle: self.idle,
            iowait: self.iowait,
            stolen: self.steal,
            guest,
        }
    }

    fn interrupt(&self) -> f64 {
        self.irq + self.softirq
    }

    fn total(&self) -> f64 {
        self.cpu_times().total()
    }
}

fn parse_proc_stat(contents: &str) -> Result<ProcStat, SampleError> {
    let line = contents
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or(SampleError::Empty)?;

    let values = line
        .split_whitespace()
        .skip(1)
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| SampleError::Parse(format!("bad value `{v}` in `{line}`")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // user nice system idle are present on every kernel we care about
    if values.len() < 4 {
        return Err(SampleError::Parse(format!("too few fields in `{line}`")));
    }
    let field = |i: usize| values.get(i).copied().unwrap_or(0.0);

    Ok(ProcStat {
        user: field(0),
        nice: field(1),
        system: field(2),
        idle: field(3),
        iowait: field(4),
        irq: field(5),
        softirq: field(6),
        steal: field(7),
        guest: field(8),
        guest_nice: field(9),
    })
}

fn read_proc_stat() -> Result<ProcStat, String> {
    let contents = std::fs::read_to_string(PROC_STAT).map_err(|e| e.to_string())?;
    parse_proc_stat(&contents).map_err(|e| e.to_string())
}

/// Share of elapsed CPU time spent servicing hard and soft interrupts since
/// the previous read.
struct InterruptCounter {
    last: ProcStat,
}

impl InterruptCounter {
    fn advance(&mut self, current: ProcStat) -> Result<Option<f64>, CounterUnavailable> {
        let previous = std::mem::replace(&mut self.last, current);
        let elapsed = current.total() - previous.total();
        if elapsed == 0.0 {
            return Ok(None);
        }
        if elapsed < 0.0 {
            return Err(CounterUnavailable::new(
                INTERRUPT_COUNTER,
                "tick counters went backwards since previous read",
            ));
        }
        let interrupt = (current.interrupt() - previous.interrupt()).max(0.0);
        Ok(Some(interrupt / elapsed * 100.0))
    }
}

impl LiveCounter for InterruptCounter {
    fn value(&mut self) -> Result<Option<f64>, CounterUnavailable> {
        let current = read_proc_stat().map_err(|e| CounterUnavailable::new(INTERRUPT_COUNTER, e))?;
        self.advance(current)
    }
}
