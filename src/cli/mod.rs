pub mod args;
pub mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use log::{error, info};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{AnyRunClient, ClientConfig};
use crate::config::Config;
use crate::error::{AnyRunError, Result};
use crate::output::Output;
use crate::progress::ProgressManager;

/// Any.Run API on the CLI
#[derive(Parser, Debug)]
#[command(
    name = "anyrun",
    about = "Any.Run API on the CLI - Pull analysis history, reports, IOCs and pcaps",
    version,
    long_about = None
)]
pub struct Cli {
    /// Turn on debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Hide the pcap download progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show analysis history (also accepted as -sh)
    #[arg(long)]
    pub show_history: bool,

    /// Get ANY.RUN environments
    #[arg(short, long)]
    pub environments: bool,

    /// Get ANY.RUN user details and limits
    #[arg(short, long)]
    pub user_limits: bool,

    /// Extra config file, read after /etc/anyrun/anyrun.ini and ~/.config/anyrun.ini
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get analysis report data by task ID
    Get(args::GetArgs),

    /// Submit file for analysis
    Submit(args::SubmitArgs),

    /// Generate shell completion scripts
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

const SUBCOMMANDS: &[&str] = &["get", "submit", "completions", "help"];

/// Rewrite the two-letter `-sh` flag, which clap cannot express, to `--show-history`.
///
/// Only top-level tokens are touched; everything from the subcommand on is passed through,
/// so `get -sh` still reaches clap as a task id.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut takes_value = false;

    while let Some(arg) = args.next() {
        if takes_value {
            takes_value = false;
            normalized.push(arg);
            continue;
        }
        if arg == "-sh" {
            normalized.push(OsString::from("--show-history"));
            continue;
        }
        if arg == "-c" || arg == "--config" {
            takes_value = true;
        }
        let stop = arg == "--" || arg.to_str().is_some_and(|a| SUBCOMMANDS.contains(&a));
        normalized.push(arg);
        if stop {
            normalized.extend(&mut args);
            break;
        }
    }
    normalized
}

impl Cli {
    /// Run the CLI application
    pub async fn run() -> Result<()> {
        let cli = Self::parse_from(normalize_args(std::env::args_os()));

        // Set up logging
        let level = if cli.debug { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

        let mut output = Output::stdout();
        let result = cli.execute(&mut output).await;

        // Handle errors with better messaging
        if let Err(ref e) = result {
            error!("{}", e);
            if let AnyRunError::Status { url, .. } = e {
                if cli.debug {
                    eprintln!("URL: {}", url);
                }
            }
            if let Some(hint) = e.hint() {
                eprintln!("\nHint: {}", hint);
            }
        }
        result
    }

    /// Load configuration, build the client and dispatch
    pub async fn execute<W: Write>(&self, output: &mut Output<W>) -> Result<()> {
        // Completions and submit need no credentials; account flags still win over submit
        match &self.command {
            Some(Commands::Completions { shell }) => return commands::completions::execute(*shell, output),
            Some(Commands::Submit(args)) if !self.account_requested() => {
                return commands::submit::execute(args)
            }
            _ => {}
        }

        let config = Config::load(self.config.as_deref())?;
        let client_config = ClientConfig {
            verify_ssl: config.verify_ssl,
            ..Default::default()
        };
        let client = AnyRunClient::new(config.credentials, client_config)?
            .with_progress(Arc::new(ProgressManager::new(self.quiet)));

        self.dispatch(&client, output).await
    }

    fn account_requested(&self) -> bool {
        self.show_history || self.environments || self.user_limits
    }

    /// Invoke exactly one client operation for the parsed arguments
    pub async fn dispatch<W: Write>(&self, client: &AnyRunClient, output: &mut Output<W>) -> Result<()> {
        if self.show_history {
            info!("getting history");
            return commands::account::history(client, output).await;
        }
        if self.environments {
            info!("Getting environments.");
            return commands::account::environments(client, output).await;
        }
        if self.user_limits {
            info!("getting user limits.");
            return commands::account::user_limits(client, output).await;
        }

        match &self.command {
            Some(Commands::Get(args)) => commands::get::execute(client, args, output).await,
            Some(Commands::Submit(args)) => commands::submit::execute(args),
            Some(Commands::Completions { shell }) => commands::completions::execute(*shell, output),
            None => output.line(&Self::command().render_help().to_string()),
        }
    }
}
