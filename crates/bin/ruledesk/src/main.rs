//! # ruledesk — JSON rule definitions from the command line
//!
//! Composition root that wires the storage adapter into the application
//! services and runs one CLI subcommand.
//!
//! ## Responsibilities
//! - Parse CLI arguments and configuration (config file, env vars)
//! - Initialize logging from the configured filter
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the repository, event bus and `RulesetService`
//! - Dispatch the subcommand and map its outcome to an exit code
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use ruledesk_adapter_storage_sqlite_sqlx::{SqliteRulesetRepository, pool};
use ruledesk_app::event_bus::InProcessEventBus;
use ruledesk_app::services::ruleset_service::RulesetService;
use ruledesk_domain::event::Event;

use crate::cli::{Cli, Command};
use crate::config::Config;

type Service = RulesetService<SqliteRulesetRepository, InProcessEventBus>;

async fn connect(config: &Config) -> anyhow::Result<(Service, broadcast::Receiver<Event>)> {
    let db = pool::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .with_context(|| format!("failed to open database {}", config.database_url()))?;

    let event_bus = InProcessEventBus::new(64);
    let events = event_bus.subscribe();

    let mut service = RulesetService::new(SqliteRulesetRepository::new(db.pool().clone()), event_bus);
    if let Some(path) = &config.editor.template {
        service = service.with_template(commands::load_template(path)?);
    }
    Ok((service, events))
}

fn log_events(mut events: broadcast::Receiver<Event>) {
    while let Ok(event) = events.try_recv() {
        tracing::info!(%event, "ruleset event");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Check { files } => {
            let all_valid = commands::check(&files, &mut out)?;
            return Ok(if all_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Command::Targets { file } => commands::targets(&file, &mut out)?,
        command => {
            let (service, events) = connect(&config).await?;
            let result = match command {
                Command::Import { file, name, realm } => {
                    commands::import(&service, &file, &name, &realm, &mut out).await
                }
                Command::New { name, realm } => {
                    commands::create(&service, &name, &realm, &mut out).await
                }
                Command::List { realm } => {
                    commands::list(&service, realm.as_deref(), &mut out).await
                }
                Command::Show { id } => commands::show(&service, id, &mut out).await,
                Command::Export { id } => commands::export(&service, id, &mut out).await,
                Command::Delete { id } => commands::delete(&service, id).await,
                Command::Check { .. } | Command::Targets { .. } => Ok(()),
            };
            log_events(events);
            result?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
