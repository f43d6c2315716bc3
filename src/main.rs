use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lopper::error::Error;
use lopper::graph::ModuleId;
use lopper::query::{RankOptions, SearchOptions};
use lopper::session::{Session, TreeOptions};
use lopper::tree::SortKey;

#[derive(Parser)]
#[command(name = "lopper", version, about = "Bundle module graph analyzer")]
struct Cli {
    /// Log per-query statistics to stderr
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a module's dependencies and how much of them it alone retains
    Details {
        /// Graph snapshot JSON file
        snapshot: PathBuf,

        /// Id of the module to inspect
        module: u32,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show modules grouped into a folder tree with aggregate sizes
    Tree {
        /// Graph snapshot JSON file
        snapshot: PathBuf,

        /// Only show this module's dependency closure
        #[arg(long)]
        module: Option<u32>,

        /// Only show modules that would go away with --module
        #[arg(long)]
        bound_only: bool,

        /// Order of each folder's children: name or size
        #[arg(long, default_value_t = SortKey::Name)]
        sort: SortKey,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// List modules by the size that removing them would free
    Rank {
        /// Graph snapshot JSON file
        snapshot: PathBuf,

        /// Show top N modules (-1 for all)
        #[arg(long, default_value_t = 20, allow_hyphen_values = true)]
        top: i32,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Find modules whose path contains a name
    Search {
        /// Graph snapshot JSON file
        snapshot: PathBuf,

        /// Case-insensitive part of the module path
        name: String,

        /// Only show modules emitted into this chunk
        #[arg(long)]
        chunk: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn snapshot(&self) -> &PathBuf {
        match self {
            Self::Details { snapshot, .. }
            | Self::Tree { snapshot, .. }
            | Self::Rank { snapshot, .. }
            | Self::Search { snapshot, .. } => snapshot,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("lopper=debug")
    } else if quiet {
        EnvFilter::new("lopper=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lopper=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Error> {
    let start = Instant::now();
    let session = Session::open(command.snapshot())?;
    tracing::info!(
        "loaded {} modules in {:.1}ms",
        session.index().module_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    match command {
        Commands::Details { module, json, .. } => {
            let report = session.details_report(ModuleId(module))?;
            if json {
                println!("{}", report.to_json());
            } else {
                report.print();
            }
        }
        Commands::Tree {
            module,
            bound_only,
            sort,
            json,
            ..
        } => {
            let opts = TreeOptions {
                module: module.map(ModuleId),
                sort,
                bound_only,
            };
            let report = session.tree(&opts)?;
            if json {
                println!("{}", report.to_json());
            } else {
                report.print();
            }
        }
        Commands::Rank { top, json, .. } => {
            let report = session.rank(&RankOptions { top_n: top });
            if json {
                println!("{}", report.to_json());
            } else {
                report.print();
            }
        }
        Commands::Search { name, chunk, json, .. } => {
            let report = session.search(&SearchOptions { name, chunk });
            if json {
                println!("{}", report.to_json());
            } else {
                report.print();
            }
        }
    }
    Ok(())
}
