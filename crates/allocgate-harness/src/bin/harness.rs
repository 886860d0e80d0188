//! CLI entrypoint for the allocgate harness.

use clap::{Parser, Subcommand};

use allocgate_harness::{HarnessError, workload};

/// Workload and inspection tooling for the allocgate router.
#[derive(Debug, Parser)]
#[command(name = "allocgate-harness")]
#[command(about = "Drives the allocation router and emits JSON reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a mixed allocate/free workload and report router counters.
    Churn {
        /// Worker thread count.
        #[arg(long, default_value_t = 4)]
        threads: usize,
        /// Allocate/free iterations per thread.
        #[arg(long, default_value_t = 10_000)]
        iterations: usize,
        /// Largest request size in bytes.
        #[arg(long, default_value_t = 4096)]
        max_size: usize,
    },
    /// Perform one routed allocation and report the path it took.
    Probe {
        /// Request size in bytes.
        #[arg(long)]
        size: usize,
        /// Request alignment (0 for the platform default).
        #[arg(long, default_value_t = 0)]
        align: usize,
    },
}

fn run(cli: Cli) -> Result<String, HarnessError> {
    match cli.command {
        Command::Churn {
            threads,
            iterations,
            max_size,
        } => {
            let report = workload::churn(threads, iterations, max_size)?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Command::Probe { size, align } => {
            let report = workload::probe(size, align)?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => println!("{report}"),
        Err(err) => {
            eprintln!("harness error: {err}");
            std::process::exit(1);
        }
    }
}
