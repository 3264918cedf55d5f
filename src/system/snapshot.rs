use tracing::warn;

/// Cumulative CPU time per category, aggregated across all logical CPUs.
///
/// Categories are disjoint: summing them gives the total elapsed ticks.
/// Units are whatever the platform counts in (100ns on Windows, USER_HZ on
/// Linux, scheduler ticks on macOS); only ratios are ever reported.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: f64,
    pub stolen: f64,
    pub guest: f64,
}

impl CpuTimes {
    /// Builds times from a kernel/user/idle triple where the kernel figure
    /// already includes idle time. System time is `kernel - idle`, floored at
    /// zero when the counters disagree.
    pub fn from_kernel_times(idle: f64, kernel: f64, user: f64) -> Self {
        let system = if kernel < idle {
            warn!(
                kernel,
                idle, "kernel time below idle time, flooring system time at 0"
            );
            0.0
        } else {
            kernel - idle
        };

        CpuTimes {
            user,
            system,
            idle,
            ..CpuTimes::default()
        }
    }

    pub fn total(&self) -> f64 {
        self.user + self.system + self.idle + self.iowait + self.stolen + self.guest
    }

    pub(crate) fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("user", self.user),
            ("system", self.system),
            ("idle", self.idle),
            ("iowait", self.iowait),
            ("stolen", self.stolen),
            ("guest", self.guest),
        ]
    }
}

/// A point-in-time reading of the cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub times: CpuTimes,
    pub logical_cpus: usize,
}

impl Snapshot {
    pub fn new(times: CpuTimes, logical_cpus: usize) -> Self {
        Snapshot {
            times,
            logical_cpus,
        }
    }

    /// Elapsed time normalized to a single logical CPU.
    pub fn cycles(&self) -> f64 {
        self.times.total() / self.logical_cpus as f64
    }
}
