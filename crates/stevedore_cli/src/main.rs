//! STEVEDORE CLI
//!
//! Checks, fixes and converts compose documents against deployment policies.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use stevedore_core::Dialect;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stevedore")]
#[command(about = "STEVEDORE - compose document linter and dialect converter", long_about = None)]
struct Cli {
    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct PolicyArgs {
    /// Policy preset name
    #[arg(long, default_value = "shared")]
    policy: String,
    /// Policy configuration file (JSON), overrides --policy
    #[arg(long)]
    policy_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
struct InputArgs {
    /// Compose document (JSON)
    file: PathBuf,
    /// Source dialect; detected when omitted
    #[arg(long)]
    dialect: Option<Dialect>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report diagnostics for a document
    Check {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Print diagnostics in wire form
        #[arg(long)]
        json: bool,
    },
    /// Apply remedies and write the fixed document
    Fix {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Also apply assisted remedies
        #[arg(long)]
        assisted: bool,
        /// Target dialect; defaults to the source dialect
        #[arg(long)]
        to: Option<Dialect>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Translate a document into another dialect
    Convert {
        #[command(flatten)]
        input: InputArgs,
        /// Target dialect
        #[arg(long)]
        to: Dialect,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show a resolved policy
    Policy {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            input,
            policy,
            json,
        } => commands::check(&input.file, input.dialect, &policy.resolve()?, json),
        Commands::Fix {
            input,
            policy,
            assisted,
            to,
            output,
        } => commands::fix(
            &input.file,
            input.dialect,
            &policy.resolve()?,
            !assisted,
            to,
            output.as_deref(),
        ),
        Commands::Convert { input, to, output } => {
            commands::convert(&input.file, input.dialect, to, output.as_deref())
        }
        Commands::Policy { policy } => commands::show_policy(&policy.resolve()?),
    }
}

impl PolicyArgs {
    fn resolve(&self) -> Result<stevedore_policy::Policy> {
        commands::load_policy(&self.policy, self.policy_file.as_deref())
    }
}
