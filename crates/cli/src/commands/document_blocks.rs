use super::{PageArgs, Session, collection};
use anyhow::Result;
use billingo_core::Collection;
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum DocumentBlockCommand {
    /// List all document blocks
    List(PageArgs),
}

pub async fn run(session: &Session, command: DocumentBlockCommand) -> Result<()> {
    match command {
        DocumentBlockCommand::List(page) => {
            collection::list(session, Collection::DocumentBlocks, &page.query()).await
        }
    }
}
