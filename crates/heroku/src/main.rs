use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use heroku::{dispatcher, Settings, DEFAULT_LOG_FILTER, LOG_ENV};
use heroku_dispatch::HELP_COMMAND;

/// Exit code for failures the dispatcher could not classify.
const FATAL_EXIT: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "heroku",
    about = "Command-line client for the Heroku platform",
    after_help = "Run 'heroku help' for the list of commands."
)]
struct Cli {
    /// Command to run, e.g. `list` or `app:info`, followed by its arguments.
    /// Every token after the command reaches it untouched.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    invocation: Vec<String>,
}

impl Cli {
    fn command(&self) -> (&str, &[String]) {
        match self.invocation.as_slice() {
            [command, args @ ..] => (command, args),
            [] => (HELP_COMMAND, &[]),
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut dispatcher = dispatcher(Settings::from_env(), None)?;
    let (command, args) = cli.command();
    tracing::debug!(command, ?args, "running");

    let stdout = std::io::stdout();
    let code = dispatcher.run(command, args, &mut stdout.lock())?;
    Ok(code)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(error = %err, "command aborted");
            eprintln!(" !   {:#}", err);
            ExitCode::from(FATAL_EXIT)
        }
    }
}
