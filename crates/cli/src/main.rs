use std::path::PathBuf;
use std::sync::Once;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reactor_core::session::{ExecutionRequest, FailurePolicy};
use reactor_core::Reactor;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Reactor - A multi-module build orchestrator
#[derive(Parser)]
#[command(name = "reactor")]
#[command(about = "Builds every module of a reactor in dependency order")]
#[command(version)]
struct Cli {
    /// Path to the reactor root (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Number of modules to build concurrently
    #[arg(short = 'T', long, default_value_t = 1, global = true)]
    threads: usize,

    /// Stop at the first module failure (default)
    #[arg(long, global = true, conflicts_with_all = ["fail_at_end", "fail_never"])]
    fail_fast: bool,

    /// Keep building, skipping modules downstream of a failure
    #[arg(long, global = true, conflicts_with = "fail_never")]
    fail_at_end: bool,

    /// Keep building every module regardless of failures
    #[arg(long, global = true)]
    fail_never: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the reactor for the given goals and lifecycle phases
    Build {
        /// Lifecycle phases ("install") or plugin goals ("prefix:goal"); defaults to the root's default goal
        goals: Vec<String>,
    },
    /// Show the task segments and goal executions without running them
    Plan {
        /// Lifecycle phases or plugin goals to plan
        goals: Vec<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// List modules in build order
    List,
    /// Show the module dependency graph
    Graph,
    /// Print the JSON schema of reactor.yml
    Schema,
}

impl Cli {
    fn failure_policy(&self) -> FailurePolicy {
        if self.fail_never {
            FailurePolicy::FailNever
        } else if self.fail_at_end {
            FailurePolicy::FailAtEnd
        } else {
            FailurePolicy::FailFast
        }
    }

    fn request(&self, goals: Vec<String>) -> ExecutionRequest {
        ExecutionRequest {
            goals,
            failure_policy: self.failure_policy(),
            threads: self.threads.max(1),
        }
    }
}

fn init_logging(verbose: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if verbose {
            EnvFilter::new("reactor_core=debug,reactor_cli=debug")
        } else {
            EnvFilter::new("warn")
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    debug!(workspace = %cli.workspace.display(), "loading reactor");
    let reactor = Reactor::load(&cli.workspace)
        .map_err(|e| anyhow::anyhow!("Failed to load reactor: {}", e))?;

    match &cli.command {
        Commands::Build { goals } => {
            let succeeded = commands::build::execute(&reactor, cli.request(goals.clone())).await?;
            if !succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Plan { goals, json } => {
            commands::plan::execute(&reactor, &cli.request(goals.clone()), *json)
        }
        Commands::List => commands::list::execute(&reactor),
        Commands::Graph => commands::graph::execute(&reactor),
        Commands::Schema => commands::schema::execute(),
    }
}
