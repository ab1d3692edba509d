//! Command-line interface for the `pi-bench` binary

use crate::context::ExecutionContext;
use crate::harness::{
    BenchmarkHarness, DEFAULT_CYCLES, DEFAULT_ITERATIONS_PER_PARTITION, DEFAULT_PARTITIONS,
};
use crate::report::{BenchmarkReport, OutputFormat, RunSettings};
use crate::sampler::{HitGenerator, RandomSource};
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Long flags also accepted with a single dash (`-cycles 5`)
const LEGACY_FLAGS: [&str; 2] = ["cycles", "partitions"];

/// Estimate PI by Monte Carlo sampling, with and without caching
#[derive(Debug, Parser)]
#[command(name = "pi-bench", version, about = "Estimate PI")]
pub struct Cli {
    /// Number of test cycles
    #[arg(long, default_value_t = DEFAULT_CYCLES)]
    pub cycles: usize,

    /// The number of partitions to use
    #[arg(long, default_value_t = DEFAULT_PARTITIONS)]
    pub partitions: usize,

    /// Samples per partition; repeat to sweep several sizes
    #[arg(long = "iterations-per-partition", default_values_t = [DEFAULT_ITERATIONS_PER_PARTITION])]
    pub iterations_per_partition: Vec<u64>,

    /// Random source for the sample generator
    #[arg(long, value_enum, default_value_t = RngArg::Thread)]
    pub rng: RngArg,

    /// Prefix for trial descriptions
    #[arg(long)]
    pub label_prefix: Option<String>,

    /// Worker threads (default: one per CPU)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// `--rng` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RngArg {
    /// Thread-local generator
    #[value(name = "thread")]
    Thread,
    /// Operating-system entropy
    #[value(name = "os")]
    Os,
}

impl From<RngArg> for RandomSource {
    fn from(value: RngArg) -> Self {
        match value {
            RngArg::Thread => Self::Thread,
            RngArg::Os => Self::Os,
        }
    }
}

/// `--format` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// One line per trial
    #[value(name = "text")]
    Text,
    /// JSON report
    #[value(name = "json")]
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Rewrite single-dash long flags (`-cycles 3`, `-partitions=4`) to their
/// double-dash form so clap can parse them.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if LEGACY_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

/// Parse the process arguments and run the benchmark.
///
/// # Errors
///
/// Returns error if the benchmark fails or output cannot be written
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));
    init_logging(cli.verbose);
    run_with_cli(&cli)
}

/// Install a stderr `tracing` subscriber; `RUST_LOG` takes precedence.
fn init_logging(verbose: bool) {
    let default = if verbose { "pi_bench=debug" } else { "pi_bench=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the benchmark described by pre-parsed arguments, printing to stdout.
///
/// # Errors
///
/// Returns error if the benchmark fails or output cannot be written
pub fn run_with_cli(cli: &Cli) -> anyhow::Result<()> {
    let report = execute(cli)?;
    let stdout = std::io::stdout();
    report.write(cli.format.into(), stdout.lock())?;
    Ok(())
}

/// Run the benchmark and collect its report without printing.
///
/// The execution context lives exactly as long as the trials.
///
/// # Errors
///
/// Returns error if the context cannot start or any trial fails
pub fn execute(cli: &Cli) -> anyhow::Result<BenchmarkReport> {
    let ctx = ExecutionContext::builder()
        .num_threads(cli.threads.unwrap_or(0))
        .build()?;
    let threads = ctx.num_threads();

    let source = RandomSource::from(cli.rng);
    let generator: Arc<dyn HitGenerator> = Arc::new(source);
    let mut harness = BenchmarkHarness::new(&ctx, generator);
    if let Some(prefix) = &cli.label_prefix {
        harness = harness.with_label_prefix(prefix.as_str());
    }

    harness.run_sweep(&cli.iterations_per_partition, cli.partitions, cli.cycles)?;
    let records = harness.into_results();
    ctx.stop();

    info!(records = records.len(), "Benchmark finished");

    let settings = RunSettings {
        iterations_per_partition: cli.iterations_per_partition.clone(),
        partitions: cli.partitions,
        cycles: cli.cycles,
        rng: source,
        threads,
    };
    Ok(BenchmarkReport::new(settings, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_legacy_flags(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["pi-bench"]);
        assert_eq!(cli.cycles, 5);
        assert_eq!(cli.partitions, 8);
        assert_eq!(cli.iterations_per_partition, vec![100_000]);
        assert_eq!(cli.rng, RngArg::Thread);
        assert_eq!(cli.format, FormatArg::Text);
        assert!(cli.threads.is_none());
    }

    #[test]
    fn test_cli_accepts_single_dash_long_flags() {
        let cli = parse(&["pi-bench", "-cycles", "3", "-partitions=4"]);
        assert_eq!(cli.cycles, 3);
        assert_eq!(cli.partitions, 4);
    }

    #[test]
    fn test_cli_accepts_double_dash_flags() {
        let cli = parse(&[
            "pi-bench",
            "--cycles",
            "2",
            "--iterations-per-partition",
            "10",
            "--iterations-per-partition",
            "20",
            "--rng",
            "os",
            "--format",
            "json",
        ]);
        assert_eq!(cli.cycles, 2);
        assert_eq!(cli.iterations_per_partition, vec![10, 20]);
        assert_eq!(cli.rng, RngArg::Os);
        assert_eq!(cli.format, FormatArg::Json);
    }

    #[test]
    fn test_cli_rejects_invalid_integer() {
        let result = Cli::try_parse_from(normalize_legacy_flags(["pi-bench", "-cycles", "many"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_leaves_other_args() {
        let input = ["pi-bench", "-v", "--threads", "2", "-cyclesx"];
        let expected: Vec<OsString> = input.into_iter().map(OsString::from).collect();
        assert_eq!(normalize_legacy_flags(input), expected);
    }

    #[test]
    fn test_execute_small_run() {
        let cli = parse(&[
            "pi-bench",
            "-cycles",
            "2",
            "-partitions",
            "3",
            "--iterations-per-partition",
            "100",
            "--threads",
            "2",
            "--label-prefix",
            "smoke",
        ]);
        let report = execute(&cli).unwrap();

        assert_eq!(report.records().len(), 4);
        assert_eq!(report.records()[0].description(), "smoke No caching");
        assert_eq!(report.records()[2].description(), "smoke With caching");
        assert!(report.records().iter().all(|r| r.samples() == 300));
        assert_eq!(report.settings().threads, 2);
    }

    #[test]
    fn test_execute_zero_cycles() {
        let cli = parse(&["pi-bench", "-cycles", "0", "--threads", "1"]);
        let report = execute(&cli).unwrap();
        assert!(report.records().is_empty());
    }
}
