//! Invocation wiring: validate input, load configuration, open the store and
//! hand the event to the correlator.

use std::sync::Arc;

use tracing::{error, info};

use crate::cli::Cli;
use crate::config::{establish_connection, AppConfig};
use crate::domain::message::{
    Invocation, MessageCorrelator, MessageStore, Outcome, SeaOrmMessageStore, TelegramMessenger,
    UnavailableStore,
};
use crate::utils::AppError;

/// Handle one monitoring event described by command-line arguments.
///
/// Input is validated before the environment is read, and configuration is
/// loaded before anything is opened or sent, so a fatal error leaves no trace
/// in the store or the chat.
pub async fn run(cli: Cli) -> Result<Outcome, AppError> {
    let invocation = Invocation::try_from(cli)?;
    let config = AppConfig::from_env()?;
    execute(&config, &invocation).await
}

pub async fn execute(config: &AppConfig, invocation: &Invocation) -> Result<Outcome, AppError> {
    let store = open_store(&config.database_url).await;
    let messenger = Arc::new(TelegramMessenger::new(config.telegram.clone())?);

    let correlator = MessageCorrelator::new(store, messenger)
        .with_resolution_notice(config.send_resolution_notice);

    let outcome = correlator.handle(invocation).await;
    info!(
        event_id = %invocation.event_id,
        success = outcome.is_success(),
        outcome = %outcome,
        "Invocation finished"
    );

    Ok(outcome)
}

/// An unreachable store degrades every storage call instead of aborting.
async fn open_store(database_url: &str) -> Arc<dyn MessageStore> {
    match establish_connection(database_url).await {
        Ok(db) => Arc::new(SeaOrmMessageStore::new(db)),
        Err(e) => {
            error!(error = %e, "Message store unavailable, continuing without it");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}
