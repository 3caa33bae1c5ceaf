use clap::Parser;

use crate::domain::message::{Invocation, TriggerStatus};
use crate::utils::AppError;

/// Relay monitoring alerts into a Telegram chat and retract them once resolved.
#[derive(Debug, Clone, Parser)]
#[command(name = "alert-relay", version)]
pub struct Cli {
    /// Event ID, unique per occurrence
    #[arg(allow_hyphen_values = true)]
    pub event_id: String,

    /// Problem key shared by the opening and resolving events
    #[arg(allow_hyphen_values = true)]
    pub problem_key: String,

    /// Message text (may contain markup understood by the chat endpoint)
    #[arg(allow_hyphen_values = true)]
    pub message_text: String,

    /// `PROBLEM` when the problem opened, `OK` when it was resolved
    pub status: String,
}

impl TryFrom<Cli> for Invocation {
    type Error = AppError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let status: TriggerStatus = cli.status.parse()?;
        Ok(Invocation {
            event_id: cli.event_id,
            problem_key: cli.problem_key,
            message_text: cli.message_text,
            status,
        })
    }
}
