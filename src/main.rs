// ABOUTME: Entry point for the storefleet CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use storefleet::config::{self, Config};
use storefleet::error::{Error, Result};
use storefleet::output::{Output, OutputMode};
use storefleet::repo::StoreQuery;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = output_mode(&cli);
    let result = run(cli).await;

    if let Err(e) = result {
        let code = match &e {
            Error::Lifecycle(err) => Some(err.code()),
            _ => None,
        };
        Output::new(mode).error(&e.to_string(), code);
        std::process::exit(1);
    }
}

fn output_mode(cli: &Cli) -> OutputMode {
    if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(output_mode(&cli));
    let cwd = env::current_dir()?;

    if let Commands::Init { base_domain, force } = &cli.command {
        config::init_config(&cwd, base_domain.as_deref(), *force)?;
        output.success(&format!("Created {}", config::CONFIG_FILENAME));
        return Ok(());
    }

    let config = Config::resolve(cli.config.as_deref(), &cwd)?;
    let orchestrator = commands::connect(&config)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Create {
            name,
            engine,
            plan,
            display_name,
            description,
            actor,
        } => {
            let args = commands::CreateArgs {
                name,
                engine,
                plan,
                display_name,
                description,
                actor,
            };
            commands::create(&orchestrator, args, output).await
        }
        Commands::Delete { id } => commands::delete(&orchestrator, &id, output).await,
        Commands::Get { id, release } => commands::get(&orchestrator, &id, release, output).await,
        Commands::List {
            page,
            limit,
            status,
            engine,
        } => {
            let query = StoreQuery {
                page,
                limit,
                status,
                engine,
            };
            commands::list(&orchestrator, query, output).await
        }
        Commands::Events { id } => commands::events(&orchestrator, &id, output).await,
        Commands::Ready => commands::ready(&orchestrator, output).await,
        Commands::Reconcile => commands::reconcile(&orchestrator, output).await,
    }
}
