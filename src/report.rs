//! Benchmark reporting
//!
//! Text output prints one line per record:
//!
//! ```text
//! No caching-0: 800000 generated 628301 in 0.0123 secs (PI = 3.141505)
//! ```
//!
//! JSON output wraps the records, the settings that produced them and a
//! per-label summary in a single timestamped document.

use crate::harness::ResultRecord;
use crate::sampler::RandomSource;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format for benchmark results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One formatted line per record
    #[default]
    Text,
    /// Single pretty-printed JSON report
    Json,
}

/// Format one record as a report line.
#[must_use]
pub fn format_record(record: &ResultRecord) -> String {
    format!(
        "{}-{}: {} generated {} in {:?} secs (PI = {:?})",
        record.description(),
        record.iteration(),
        record.samples(),
        record.hits(),
        record.elapsed_secs(),
        record.pi_estimate()
    )
}

/// Write one line per record; writes nothing for an empty slice.
///
/// # Errors
///
/// Returns error if writing fails
pub fn write_text<W: Write>(records: &[ResultRecord], mut writer: W) -> Result<()> {
    for record in records {
        writeln!(writer, "{}", format_record(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Aggregate over all records sharing one description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelSummary {
    /// Trial description shared by the records
    pub description: String,
    /// Number of trials
    pub trials: usize,
    /// Samples across all trials
    pub total_samples: u64,
    /// Hits across all trials
    pub total_hits: u64,
    /// `4 × total_hits / total_samples`
    pub pooled_estimate: f64,
    /// `|pooled_estimate - PI|`
    pub abs_error: f64,
    /// Mean reduction time
    pub mean_secs: f64,
    /// Fastest reduction
    pub min_secs: f64,
    /// Slowest reduction
    pub max_secs: f64,
}

/// Summarize records per description, in first-appearance order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[ResultRecord]) -> Vec<LabelSummary> {
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        if !order.contains(&record.description()) {
            order.push(record.description());
        }
    }

    order
        .into_iter()
        .map(|description| {
            let group: Vec<&ResultRecord> = records
                .iter()
                .filter(|r| r.description() == description)
                .collect();

            let total_samples: u64 = group.iter().map(|r| r.samples()).sum();
            let total_hits: u64 = group.iter().map(|r| r.hits()).sum();
            let pooled_estimate = 4.0 * total_hits as f64 / total_samples as f64;
            let secs: Vec<f64> = group.iter().map(|r| r.elapsed_secs()).collect();

            LabelSummary {
                description: description.to_string(),
                trials: group.len(),
                total_samples,
                total_hits,
                pooled_estimate,
                abs_error: (pooled_estimate - std::f64::consts::PI).abs(),
                mean_secs: secs.iter().sum::<f64>() / secs.len() as f64,
                min_secs: secs.iter().copied().fold(f64::INFINITY, f64::min),
                max_secs: secs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}

/// Settings a benchmark run was executed with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSettings {
    /// Iterations-per-partition values, in sweep order
    pub iterations_per_partition: Vec<u64>,
    /// Number of partitions
    pub partitions: usize,
    /// Trials per caching mode
    pub cycles: usize,
    /// Random source used by the sample generator
    pub rng: RandomSource,
    /// Worker threads in the execution context
    pub threads: usize,
}

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkReport {
    generated_at: DateTime<Utc>,
    settings: RunSettings,
    records: Vec<ResultRecord>,
    summaries: Vec<LabelSummary>,
}

impl BenchmarkReport {
    /// Build a report stamped with the current time.
    #[must_use]
    pub fn new(settings: RunSettings, records: Vec<ResultRecord>) -> Self {
        let summaries = summarize(&records);
        Self {
            generated_at: Utc::now(),
            settings,
            records,
            summaries,
        }
    }

    /// When the report was generated.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Settings the run was executed with.
    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// All trial records, in execution order.
    #[must_use]
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Per-label summaries.
    #[must_use]
    pub fn summaries(&self) -> &[LabelSummary] {
        &self.summaries
    }

    /// Write the report in `format`.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or writing fails
    pub fn write<W: Write>(&self, format: OutputFormat, writer: W) -> Result<()> {
        match format {
            OutputFormat::Text => write_text(&self.records, writer),
            OutputFormat::Json => self.write_json(writer),
        }
    }

    /// Write the report as pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or writing fails
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
