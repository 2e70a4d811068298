// weft-bench: reduction benchmark driver for weft-core
//
// Design Decision: Use clap derive for flags; environment config comes only from PoolConfig::from_env.
// Design Decision: Logs go to stderr so `--output json` stays machine-readable.

mod bench;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use weft_core::{PoolBuilder, PoolConfig};

use crate::bench::{BenchConfig, Partition};
use crate::output::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Strided,
    Blocked,
    Both,
}

impl Mode {
    fn partitions(self) -> Vec<Partition> {
        match self {
            Mode::Strided => vec![Partition::Strided],
            Mode::Blocked => vec![Partition::Blocked],
            Mode::Both => vec![Partition::Strided, Partition::Blocked],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "weft-bench")]
#[command(about = "Parallel reduction benchmark on a fixed-size worker pool")]
#[command(version)]
struct Cli {
    /// Number of f64 elements in the buffer
    #[arg(long, default_value_t = 1 << 24)]
    elements: usize,

    /// Worker threads (default: WEFT_POOL_SIZE, then available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Value every element is initialised to
    #[arg(long, default_value_t = 3.141592e-3)]
    value: f64,

    /// Which partitioning to run
    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

fn init_tracing() {
    // RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weft_core=info,weft_bench=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut builder = PoolBuilder::from_config(PoolConfig::from_env());
    if let Some(workers) = cli.workers {
        builder = builder.size(workers);
    }
    let pool = builder.build().context("failed to start worker pool")?;

    let config = BenchConfig {
        elements: cli.elements,
        value: cli.value,
        partitions: cli.mode.partitions(),
    };
    tracing::info!(
        elements = config.elements,
        workers = pool.size(),
        prefix = %pool.config().thread_name_prefix,
        mode = ?cli.mode,
        "starting benchmark"
    );

    let report = bench::run(&pool, &config)?;
    cli.output.print_report(&report)?;

    pool.shutdown();
    Ok(())
}
