//! shippr - review and merge GitHub pull requests from the terminal

mod cli;

use anstream::eprintln;
use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use cli::{InteractiveOptions, error_prefix, run_interactive, run_list};
use shippr::config::Config;
use shippr::types::RepositoryRef;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// File that receives logs when `DEBUG` is set
const DEBUG_LOG: &str = "debug.log";

#[derive(Parser)]
#[command(name = "shippr")]
#[command(about = "Review and merge GitHub pull requests from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository as owner/name
    #[arg(value_name = "OWNER/NAME", conflicts_with_all = ["org", "repo"])]
    repo_slug: Option<String>,

    /// Repository owner (user or organization)
    #[arg(long, requires = "repo")]
    org: Option<String>,

    /// Repository name
    #[arg(long, requires = "org")]
    repo: Option<String>,

    /// Draw inline instead of in the alternate screen
    #[arg(long)]
    no_alt: bool,

    /// Skip the details view and go straight to the merge prompts
    #[arg(long)]
    quick: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List open pull requests across an organization's repositories
    List {
        /// Organization (or user) whose repositories are scanned
        #[arg(long)]
        org: String,

        /// Maximum number of repositories to scan (0 for no limit)
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{} {e:#}", error_prefix());
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} failed to start runtime: {e}", error_prefix());
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run(cli));
    // A prompt abandoned by Ctrl-C may still hold a blocking thread
    runtime.shutdown_timeout(Duration::from_millis(100));
    code
}

async fn run(cli: Cli) -> ExitCode {
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", error_prefix());
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Some(Commands::List { org, limit }) => run_list(&config, org, *limit).await.map(|()| true),
        None => {
            let repo = match resolve_repo(&cli) {
                Ok(repo) => repo,
                Err(e) => {
                    let _ = e.print();
                    return ExitCode::FAILURE;
                }
            };
            let options = InteractiveOptions {
                alt_screen: !cli.no_alt,
                quick: cli.quick,
            };
            run_interactive(&config, repo, options).await
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e}", error_prefix());
            ExitCode::FAILURE
        }
    }
}

/// Repository from either the positional slug or `--org`/`--repo`.
fn resolve_repo(cli: &Cli) -> Result<RepositoryRef, clap::Error> {
    let mut cmd = Cli::command();
    match (&cli.repo_slug, &cli.org, &cli.repo) {
        (Some(slug), _, _) => slug
            .parse()
            .map_err(|e: shippr::error::Error| cmd.error(ErrorKind::ValueValidation, e)),
        (None, Some(org), Some(repo)) => Ok(RepositoryRef::new(org, repo)),
        _ => Err(cmd.error(
            ErrorKind::MissingRequiredArgument,
            "a repository is required: pass OWNER/NAME or --org and --repo",
        )),
    }
}

/// Route tracing output.
///
/// With `DEBUG` set everything from shippr goes to `debug.log` in the
/// working directory; otherwise warnings go to stderr, more with `-v`.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    if std::env::var_os("DEBUG").is_some() {
        let file = File::create(DEBUG_LOG).with_context(|| format!("failed to create {DEBUG_LOG}"))?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(EnvFilter::new("shippr=debug"))
            .init();
        return Ok(());
    }

    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    Ok(())
}
