use super::Session;
use anyhow::{Context, Result};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum UtilsCommand {
    /// Convert a legacy (v2) API ID to a v3 ID
    ConvertId {
        /// Legacy ID
        id: u64,
    },
}

pub async fn run(session: &Session, command: UtilsCommand) -> Result<()> {
    match command {
        UtilsCommand::ConvertId { id } => {
            eprintln!("🔄 Converting ID {}...", id);
            let value = session
                .client()?
                .convert_legacy_id(id)
                .await
                .with_context(|| format!("Failed to convert ID {}", id))?;
            session.print(&value);
            Ok(())
        }
    }
}
