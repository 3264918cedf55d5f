//! Metric sinks. A check queues gauges with [`MetricSender::gauge`] and
//! flushes them once per run with [`MetricSender::commit`].

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::SendError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

pub trait MetricSender {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]);
    /// Flushes everything queued since the previous commit as one batch.
    fn commit(&mut self) -> Result<(), SendError>;
}

/// Keeps committed batches in memory.
#[derive(Debug, Default)]
pub struct RecordingSender {
    pending: Vec<Gauge>,
    batches: Vec<Vec<Gauge>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[Vec<Gauge>] {
        &self.batches
    }

    pub fn last_batch(&self) -> Option<&[Gauge]> {
        self.batches.last().map(Vec::as_slice)
    }

    pub fn pending(&self) -> &[Gauge] {
        &self.pending
    }
}

impl MetricSender for RecordingSender {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.pending.push(Gauge {
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
    }

    fn commit(&mut self) -> Result<(), SendError> {
        self.batches.push(std::mem::take(&mut self.pending));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Batch<'a> {
    check: &'a str,
    timestamp: u64,
    gauges: &'a [Gauge],
}

/// Writes each committed batch to `out`, adding `tags` to every gauge.
pub struct WriterSender<W: Write> {
    out: W,
    check: String,
    format: OutputFormat,
    tags: Vec<String>,
    pending: Vec<Gauge>,
}

impl<W: Write> WriterSender<W> {
    pub fn new(out: W, check: impl Into<String>, format: OutputFormat, tags: Vec<String>) -> Self {
        WriterSender {
            out,
            check: check.into(),
            format,
            tags,
            pending: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_batch(&mut self, gauges: &[Gauge]) -> Result<(), SendError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        match self.format {
            OutputFormat::Json => {
                let batch = Batch {
                    check: &self.check,
                    timestamp,
                    gauges,
                };
                serde_json::to_writer(&mut self.out, &batch)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                for gauge in gauges {
                    write!(self.out, "{} {} {:.2}", timestamp, gauge.name, gauge.value)?;
                    if !gauge.tags.is_empty() {
                        write!(self.out, " {}", gauge.tags.join(","))?;
                    }
                    writeln!(self.out)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> MetricSender for WriterSender<W> {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        let mut all_tags = tags.to_vec();
        all_tags.extend(self.tags.iter().cloned());
        self.pending.push(Gauge {
            name: name.to_string(),
            value,
            tags: all_tags,
        });
    }

    fn commit(&mut self) -> Result<(), SendError> {
        let gauges = std::mem::take(&mut self.pending);
        self.write_batch(&gauges)
    }
}
