use super::{Session, currencies};
use anyhow::{Context, Result};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum OrganizationCommand {
    /// Get organization data
    Get,

    /// List supported currencies
    Currencies,
}

pub async fn run(session: &Session, command: OrganizationCommand) -> Result<()> {
    match command {
        OrganizationCommand::Get => {
            eprintln!("🏢 Fetching organization data...");
            let value = session
                .client()?
                .organization()
                .await
                .context("Failed to fetch organization data")?;
            session.print(&value);
            Ok(())
        }
        OrganizationCommand::Currencies => currencies::list(session).await,
    }
}
