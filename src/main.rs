//! `pi-bench`: Monte Carlo PI estimation benchmark
//!
//! ```text
//! pi-bench -cycles 5 -partitions 8
//! pi-bench --iterations-per-partition 1000 --iterations-per-partition 100000 --format json
//! ```

fn main() -> anyhow::Result<()> {
    pi_bench::cli::run()
}
