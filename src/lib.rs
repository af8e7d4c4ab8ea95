pub mod api;
pub mod backoff;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod http;
pub mod matching;
pub mod notifier;
pub mod scheduler;
pub mod services;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use log::info;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::services::inspect::InspectService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: Option<u16>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let port = port.unwrap_or(config.port);
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.database.path)?;
    database::setup::apply_schema(&mut database::get_connection(&pool)?)?;
    info!("Database ready at {}", config.database.path);
    Ok(())
}

pub fn handle_candidates() -> Result<()> {
    let service = InspectService::new(AppConfig::from_env());
    service.run()
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
