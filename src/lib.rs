//! A stateful CPU usage check.
//!
//! Each run samples the cumulative CPU time counters, diffs them against the
//! previous run's sample, and emits the share of elapsed time spent in each
//! category as `system.cpu.*` gauges on a [`sender::MetricSender`]. Checks are
//! registered by name in [`check::registry`] and driven by an external
//! scheduler.

pub mod check;
pub mod config;
pub mod error;
pub mod logging;
pub mod rates;
pub mod sender;
pub mod system;
