mod completion;
mod config;
mod dispatch;
mod manual;
mod render;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wfold")]
#[command(
    about = "Fold intermediate agent steps in the ChatGPT VS Code extension",
    long_about = None,
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Read settings from this TOML file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
struct TargetArgs {
    /// Patch this extension directory instead of scanning the extension roots.
    #[arg(long, value_name = "DIR")]
    ext_dir: Option<PathBuf>,
    /// Pick the newest candidate instead of failing when the target is ambiguous.
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Patch the extension (idempotent; upgrades older patches in place).
    Install {
        #[command(flatten)]
        target: TargetArgs,
        /// Report what would change without writing anything.
        #[arg(long)]
        dry_run: bool,
        /// Skip downloading the operator manual.
        #[arg(long)]
        no_manual: bool,
    },
    /// Restore every patched file from its backup.
    Uninstall {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        keep_backups: bool,
        /// Leave the collapse setting in ~/.codex/config.toml untouched.
        #[arg(long)]
        keep_config: bool,
    },
    /// Show target, shape, patch state and backups without changing anything.
    Inspect {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = dispatch::run_cli(cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("WFOLD_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests;
