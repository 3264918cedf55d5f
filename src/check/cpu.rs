use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::{ConfigurationError, CounterUnavailable, RateError, RunError};
use crate::rates::compute_rates;
use crate::sender::MetricSender;
use crate::system::{Host, LiveCounter, Snapshot, SystemHost, sample};

use super::Check;
use super::registry::{CHECKS, CheckEntry};

pub const CPU_CHECK_NAME: &str = "cpu";
pub const INTERRUPT_METRIC: &str = "system.cpu.interrupt";

#[linkme::distributed_slice(CHECKS)]
static CPU_CHECK: CheckEntry = CheckEntry {
    name: CPU_CHECK_NAME,
    description: "Per-category CPU time percentages from cumulative OS counters",
    factory: cpu_factory,
};

fn cpu_factory() -> Box<dyn Check> {
    Box::new(CpuCheck::new())
}

/// The CPU check takes no options; any key is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CpuCheckConfig {}

/// State carried between runs. Created by `configure`, mutated only by
/// `run`, dropped with the check (which releases the live counter).
struct CheckState {
    logical_cpus: usize,
    interrupt: Result<Box<dyn LiveCounter>, CounterUnavailable>,
    last: Option<Snapshot>,
}

pub struct CpuCheck<H: Host = SystemHost> {
    host: H,
    state: Option<CheckState>,
}

impl CpuCheck<SystemHost> {
    pub fn new() -> Self {
        Self::with_host(SystemHost)
    }
}

impl Default for CpuCheck<SystemHost> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> CpuCheck<H> {
    pub fn with_host(host: H) -> Self {
        CpuCheck { host, state: None }
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    /// Snapshot the next run will diff against.
    pub fn baseline(&self) -> Option<&Snapshot> {
        self.state.as_ref().and_then(|s| s.last.as_ref())
    }

    /// Per-CPU cycle count of the baseline.
    pub fn last_cycles(&self) -> Option<f64> {
        self.baseline().map(Snapshot::cycles)
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> Check for CpuCheck<H> {
    fn name(&self) -> &'static str {
        CPU_CHECK_NAME
    }

    fn configure(&mut self, instance: &toml::Table) -> Result<(), ConfigurationError> {
        if self.state.is_some() {
            return Err(ConfigurationError::AlreadyConfigured(CPU_CHECK_NAME));
        }

        let _config: CpuCheckConfig = toml::Value::Table(instance.clone()).try_into()?;

        let logical_cpus = self
            .host
            .logical_cpu_count()
            .filter(|&n| n > 0)
            .ok_or(ConfigurationError::LogicalCpuCount)?;

        let interrupt = self.host.open_interrupt_counter();
        if let Err(e) = &interrupt {
            warn!(error = %e, "{INTERRUPT_METRIC} will not be reported");
        }

        debug!(logical_cpus, "cpu check configured");
        self.state = Some(CheckState {
            logical_cpus,
            interrupt,
            last: None,
        });
        Ok(())
    }

    fn run(&mut self, sender: &mut dyn MetricSender) -> Result<(), RunError> {
        let state = self
            .state
            .as_mut()
            .ok_or(RunError::NotConfigured(CPU_CHECK_NAME))?;

        let current = match sample(&mut self.host, state.logical_cpus) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "cpu check could not retrieve cpu stats");
                return Err(e.into());
            }
        };

        let mut batch: Vec<(&'static str, f64)> = Vec::with_capacity(7);

        if let Some(prev) = &state.last {
            match compute_rates(prev, &current) {
                Ok(rates) => {
                    for category in &rates.floored {
                        warn!(
                            metric = category.metric_name(),
                            "cpu counter went backwards, reporting 0"
                        );
                    }
                    batch.extend(rates.gauges());
                }
                Err(e @ RateError::InsufficientElapsedTime { .. }) => {
                    debug!(error = %e, "skipping cpu rates this cycle")
                }
                Err(e) => warn!(error = %e, "skipping cpu rates this cycle"),
            }
        }

        match &mut state.interrupt {
            Ok(counter) => match counter.value() {
                Ok(Some(value)) => batch.push((INTERRUPT_METRIC, value)),
                Ok(None) => debug!("interrupt counter has no new value yet"),
                Err(e) => warn!(error = %e, "error getting interrupt counter value"),
            },
            Err(e) => debug!(error = %e, "interrupt counter not open"),
        }

        for (name, value) in &batch {
            sender.gauge(name, *value, &[]);
        }
        let committed = sender.commit();

        // the baseline always moves forward once sampling succeeded
        state.last = Some(current);

        committed?;
        Ok(())
    }
}
