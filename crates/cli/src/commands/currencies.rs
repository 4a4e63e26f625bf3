use super::Session;
use anyhow::{Context, Result};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum CurrencyCommand {
    /// List supported currencies
    List,

    /// Get conversion rate between currencies
    Convert {
        /// Source currency code (e.g. HUF)
        #[arg(long)]
        from: String,

        /// Target currency code (e.g. EUR)
        #[arg(long)]
        to: String,
    },
}

pub async fn run(session: &Session, command: CurrencyCommand) -> Result<()> {
    match command {
        CurrencyCommand::List => list(session).await,
        CurrencyCommand::Convert { from, to } => {
            let from = from.to_uppercase();
            let to = to.to_uppercase();
            eprintln!("💱 Getting conversion rate {} → {}...", from, to);
            let value = session
                .client()?
                .conversion_rate(&from, &to)
                .await
                .context("Failed to get conversion rate")?;
            session.print(&value);
            Ok(())
        }
    }
}

pub async fn list(session: &Session) -> Result<()> {
    eprintln!("💱 Fetching currencies...");
    let value = session
        .client()?
        .currencies()
        .await
        .context("Failed to fetch currencies")?;
    session.print(&value);
    Ok(())
}
