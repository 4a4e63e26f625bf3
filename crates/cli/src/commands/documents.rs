use super::{PageArgs, PayloadArgs, Session, collection};
use anyhow::{Context, Result};
use billingo_core::{Collection, Query, SendDocument};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// List documents
    List(ListArgs),

    /// Get document by ID
    Get {
        /// Document ID
        id: u64,
    },

    /// Create a new document
    Create(PayloadArgs),

    /// Update a document
    Update {
        /// Document ID
        id: u64,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a draft document
    Delete {
        /// Document ID
        id: u64,
    },

    /// Cancel a document
    Cancel {
        /// Document ID
        id: u64,
    },

    /// Send document via email
    Send {
        /// Document ID
        id: u64,

        /// Comma-separated email addresses
        #[arg(short, long)]
        emails: Option<String>,

        /// Email subject
        #[arg(short, long)]
        subject: Option<String>,

        /// Email message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Download document as PDF
    Download {
        /// Document ID
        id: u64,

        /// Output file path
        #[arg(short, long, default_value = "document.pdf")]
        output: PathBuf,
    },

    /// Get public download URL for document
    PublicUrl {
        /// Document ID
        id: u64,
    },

    /// Get payment history for document
    Payments {
        /// Document ID
        id: u64,
    },

    /// Replace payment history for document
    UpdatePayments {
        /// Document ID
        id: u64,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete all payments of a document
    DeletePayments {
        /// Document ID
        id: u64,
    },

    /// Check Online Számla (NAV) submission status
    OnlineSzamla {
        /// Document ID
        id: u64,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Filter by document block ID
    #[arg(long)]
    pub block_id: Option<u64>,

    /// Filter by partner ID
    #[arg(long)]
    pub partner_id: Option<u64>,

    /// Filter by payment method
    #[arg(long)]
    pub payment_method: Option<String>,

    /// Filter by payment status
    #[arg(long)]
    pub payment_status: Option<String>,

    /// Filter by start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,

    /// Filter by end date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Filter by start document number
    #[arg(long)]
    pub start_number: Option<u64>,

    /// Filter by end document number
    #[arg(long)]
    pub end_number: Option<u64>,

    /// Filter by start year
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Filter by end year
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Filter by document type (invoice, proforma, draft, ...)
    #[arg(long = "type", value_name = "TYPE")]
    pub document_type: Option<String>,
}

impl ListArgs {
    pub fn query(&self) -> Query {
        self.page
            .query()
            .param_opt("block_id", self.block_id)
            .param_opt("partner_id", self.partner_id)
            .param_opt("payment_method", self.payment_method.as_deref())
            .param_opt("payment_status", self.payment_status.as_deref())
            .param_opt("start_date", self.start_date)
            .param_opt("end_date", self.end_date)
            .param_opt("start_number", self.start_number)
            .param_opt("end_number", self.end_number)
            .param_opt("start_year", self.start_year)
            .param_opt("end_year", self.end_year)
            .param_opt("type", self.document_type.as_deref())
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

pub async fn run(session: &Session, command: DocumentCommand) -> Result<()> {
    const DOCS: Collection = Collection::Documents;

    match command {
        DocumentCommand::List(args) => collection::list(session, DOCS, &args.query()).await,
        DocumentCommand::Get { id } => collection::get(session, DOCS, id).await,
        DocumentCommand::Create(payload) => collection::create(session, DOCS, &payload).await,
        DocumentCommand::Update { id, payload } => {
            collection::update(session, DOCS, id, &payload).await
        }
        DocumentCommand::Delete { id } => collection::delete(session, DOCS, id).await,
        DocumentCommand::Cancel { id } => cancel(session, id).await,
        DocumentCommand::Send {
            id,
            emails,
            subject,
            message,
        } => {
            let request = SendDocument {
                emails: emails
                    .as_deref()
                    .map(SendDocument::parse_emails)
                    .unwrap_or_default(),
                subject,
                message,
            };
            send(session, id, &request).await
        }
        DocumentCommand::Download { id, output } => download(session, id, output).await,
        DocumentCommand::PublicUrl { id } => {
            eprintln!("🔗 Getting public URL for document {}...", id);
            let value = session
                .client()?
                .document_public_url(id)
                .await
                .context("Failed to get public URL")?;
            session.print(&value);
            Ok(())
        }
        DocumentCommand::Payments { id } => {
            eprintln!("🔍 Fetching payments for document {}...", id);
            let value = session
                .client()?
                .document_payments(id)
                .await
                .context("Failed to fetch payments")?;
            session.print(&value);
            Ok(())
        }
        DocumentCommand::UpdatePayments { id, payload } => {
            let body = payload.read()?;
            eprintln!("📝 Updating payments for document {}...", id);
            let value = session
                .client()?
                .update_document_payments(id, &body)
                .await
                .context("Failed to update payments")?;
            eprintln!("   ✓ Payments updated");
            session.print(&value);
            Ok(())
        }
        DocumentCommand::DeletePayments { id } => {
            eprintln!("🗑️  Deleting payments of document {}...", id);
            session
                .client()?
                .delete_document_payments(id)
                .await
                .context("Failed to delete payments")?;
            eprintln!("   ✓ Payments deleted");
            Ok(())
        }
        DocumentCommand::OnlineSzamla { id } => {
            eprintln!("🏛️  Checking Online Számla status for document {}...", id);
            let value = session
                .client()?
                .document_online_szamla(id)
                .await
                .context("Failed to check Online Számla status")?;
            session.print(&value);
            Ok(())
        }
    }
}

async fn cancel(session: &Session, id: u64) -> Result<()> {
    eprintln!("🚫 Canceling document {}...", id);
    let value = session
        .client()?
        .cancel_document(id)
        .await
        .with_context(|| format!("Failed to cancel document {}", id))?;

    eprintln!("   ✓ Document canceled");
    session.print(&value);
    Ok(())
}

async fn send(session: &Session, id: u64, request: &SendDocument) -> Result<()> {
    eprintln!("📧 Sending document {}...", id);
    let value = session
        .client()?
        .send_document(id, request)
        .await
        .with_context(|| format!("Failed to send document {}", id))?;

    eprintln!("   ✓ Document sent");
    session.print(&value);
    Ok(())
}

async fn download(session: &Session, id: u64, output: PathBuf) -> Result<()> {
    eprintln!("📥 Downloading document {}...", id);
    let bytes = session
        .client()?
        .download_document(id)
        .await
        .with_context(|| format!("Failed to download document {}", id))?;

    fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!("   ✓ Saved {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
