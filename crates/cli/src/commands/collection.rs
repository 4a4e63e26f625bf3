//! Commands shared by every resource with list/get/create/update/delete
//! routes. Partners, products and bank accounts use [`CollectionCommand`]
//! directly; documents reuse the helpers below.

use super::{PageArgs, PayloadArgs, Session};
use crate::output;
use anyhow::{Context, Result};
use billingo_core::{Collection, Query};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum CollectionCommand {
    /// List all entries
    List(PageArgs),

    /// Get one entry by ID
    Get {
        /// Entry ID
        id: u64,
    },

    /// Create a new entry
    Create(PayloadArgs),

    /// Update an entry
    Update {
        /// Entry ID
        id: u64,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: u64,
    },
}

pub async fn run(
    session: &Session,
    collection: Collection,
    command: CollectionCommand,
) -> Result<()> {
    match command {
        CollectionCommand::List(page) => list(session, collection, &page.query()).await,
        CollectionCommand::Get { id } => get(session, collection, id).await,
        CollectionCommand::Create(payload) => create(session, collection, &payload).await,
        CollectionCommand::Update { id, payload } => {
            update(session, collection, id, &payload).await
        }
        CollectionCommand::Delete { id } => delete(session, collection, id).await,
    }
}

pub async fn list(session: &Session, collection: Collection, query: &Query) -> Result<()> {
    eprintln!("🔍 Fetching {}...", collection.plural());
    let listing = session
        .client()?
        .list(collection, query)
        .await
        .with_context(|| format!("Failed to fetch {}", collection.plural()))?;

    eprintln!("   ✓ Retrieved {} {}", listing.len(), collection.plural());
    session.print(&listing.items);
    if let Some(summary) = output::page_summary(&listing) {
        eprintln!("   {}", summary);
    }
    Ok(())
}

pub async fn get(session: &Session, collection: Collection, id: u64) -> Result<()> {
    eprintln!("🔍 Fetching {} {}...", collection.noun(), id);
    let value = session
        .client()?
        .fetch(collection, id)
        .await
        .with_context(|| format!("Failed to fetch {} {}", collection.noun(), id))?;

    session.print(&value);
    Ok(())
}

pub async fn create(
    session: &Session,
    collection: Collection,
    payload: &PayloadArgs,
) -> Result<()> {
    let body = payload.read()?;

    eprintln!("📝 Creating {}...", collection.noun());
    let created = session
        .client()?
        .create(collection, &body)
        .await
        .with_context(|| format!("Failed to create {}", collection.noun()))?;

    eprintln!("   ✓ Created {}", collection.noun());
    session.print(&created);
    Ok(())
}

pub async fn update(
    session: &Session,
    collection: Collection,
    id: u64,
    payload: &PayloadArgs,
) -> Result<()> {
    let body = payload.read()?;

    eprintln!("📝 Updating {} {}...", collection.noun(), id);
    let updated = session
        .client()?
        .update(collection, id, &body)
        .await
        .with_context(|| format!("Failed to update {} {}", collection.noun(), id))?;

    eprintln!("   ✓ Updated {} {}", collection.noun(), id);
    session.print(&updated);
    Ok(())
}

pub async fn delete(session: &Session, collection: Collection, id: u64) -> Result<()> {
    eprintln!("🗑️  Deleting {} {}...", collection.noun(), id);
    let response = session
        .client()?
        .remove(collection, id)
        .await
        .with_context(|| format!("Failed to delete {} {}", collection.noun(), id))?;

    eprintln!("   ✓ Deleted {} {}", collection.noun(), id);
    if !response.is_null() {
        session.print(&response);
    }
    Ok(())
}
