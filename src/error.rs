//! Error types shared by the sampler, the rate engine and the check lifecycle.

use std::path::PathBuf;

use thiserror::Error;

/// Configure failed; the check stays unconfigured.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid instance configuration: {0}")]
    Invalid(#[from] toml::de::Error),

    #[error("could not resolve the logical CPU count from host metadata")]
    LogicalCpuCount,

    #[error("check `{0}` is already configured")]
    AlreadyConfigured(&'static str),
}

/// The runner config file could not be used; callers fall back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Reading the cumulative CPU counters failed.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("could not read cpu stats: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse cpu stats: {0}")]
    Parse(String),

    #[error("no cpu stats retrieved (empty results)")]
    Empty,

    #[error("counter `{name}` has an invalid value {value}")]
    InvalidValue { name: &'static str, value: f64 },

    #[error("cpu time sampling is not supported on this platform")]
    Unsupported,
}

/// The live counter could not be opened or read. Never fatal to a run.
#[derive(Debug, Error)]
#[error("live counter `{counter}` unavailable: {reason}")]
pub struct CounterUnavailable {
    pub counter: &'static str,
    pub reason: String,
}

impl CounterUnavailable {
    pub fn new(counter: &'static str, reason: impl Into<String>) -> Self {
        Self {
            counter,
            reason: reason.into(),
        }
    }
}

/// Rates could not be derived from a pair of snapshots. Never fatal to a run.
#[derive(Debug, Error, PartialEq)]
pub enum RateError {
    #[error("insufficient elapsed time between samples (delta cycles {delta_cycles})")]
    InsufficientElapsedTime { delta_cycles: f64 },

    #[error("cumulative counters went backwards (delta cycles {delta_cycles})")]
    CounterWentBackwards { delta_cycles: f64 },

    #[error("snapshot reports no logical cpus")]
    NoLogicalCpus,

    #[error("logical cpu count changed between samples ({prev} -> {curr})")]
    LogicalCpuMismatch { prev: usize, curr: usize },
}

/// The metric sink failed to flush a batch.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to write metrics: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize metrics: {0}")]
    Json(#[from] serde_json::Error),
}

/// A run cycle failed; the scheduler decides whether and when to retry.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("check `{0}` was run before being configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Sink(#[from] SendError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown check `{name}`; available checks: {available:?}")]
    UnknownCheck {
        name: String,
        available: Vec<&'static str>,
    },
}
