use std::io;

use clap::{Parser, Subcommand};
use colored::Colorize;
use gitnotify_cli::commands::{
    init_cmd, open_session, set_cmd, set_cmd::SetArgs, show_cmd, show_cmd::ShowArgs,
    validate_cmd, validate_cmd::ValidateArgs,
};
use gitnotify_cli::config::{resolve_client_settings, ConnectionArgs};
use gitnotify_cli::errors::Error;
use gitnotify_cli::render::format_form;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// gitnotify-config: view and edit the configuration of a GitNotify service
#[derive(Parser)]
#[command(name = "gitnotify-config")]
#[command(about = "View and edit the configuration of a GitNotify service", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current configuration
    Show(ShowArgs),

    /// Change configuration fields and save
    Set(SetArgs),

    /// Check a notifications document locally
    Validate(ValidateArgs),

    /// Write a settings file with default values
    Init {
        /// Path to save the settings file
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Show the CLI version
    Version,
}

async fn run(cli: Cli) -> Result<String, Error> {
    match cli.command {
        Commands::Show(args) => {
            let session = open_session(resolve_client_settings(&cli.connection)?)?;
            let model = show_cmd::execute(&session, &args).await?;
            Ok(format_form(&model))
        }
        Commands::Set(args) => {
            let inputs = set_cmd::collect_inputs(&args, io::stdin())?;
            let session = open_session(resolve_client_settings(&cli.connection)?)?;
            let cancel = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let model = set_cmd::execute(&session, inputs, cancel).await?;
            Ok(format_form(&model))
        }
        Commands::Validate(args) => {
            let report = validate_cmd::execute(&args)?;
            Ok(validate_cmd::format_report(&report))
        }
        Commands::Init { path } => {
            let written = init_cmd::execute(path.as_deref())?;
            Ok(format!("Settings initialized at {:?}\n", written))
        }
        Commands::Version => Ok(format!(
            "gitnotify-config version {}\n",
            option_env!("GITNOTIFY_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
        )),
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("GITNOTIFY_LOG"))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            print!("{}", output);
        }
        Err(e) => {
            error!("Error: {e}");
            eprintln!("{} {}", "✗".red(), e.to_string().red().bold());
            std::process::exit(e.exit_code());
        }
    }
}
