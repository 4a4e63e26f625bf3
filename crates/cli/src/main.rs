mod commands;
mod output;

use billingo_core::Collection;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use commands::Session;
use commands::collection::CollectionCommand;
use commands::config::ConfigCommand;
use commands::currencies::CurrencyCommand;
use commands::document_blocks::DocumentBlockCommand;
use commands::documents::DocumentCommand;
use commands::organization::OrganizationCommand;
use commands::utils::UtilsCommand;
use output::OutputFormat;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "billingo")]
#[command(
    version,
    about = "Billingo API v3 CLI - Hungarian invoicing and billing automation",
    long_about = None
)]
#[command(after_help = "Examples:
  billingo config set apiKey <your-api-key>
  billingo documents list --page 1 --per-page 25
  billingo documents create --file invoice.json
  billingo partners list --format json

API documentation: https://api.billingo.hu/v3/swagger
Get an API key:    https://app.billingo.hu/api-key")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Path to the configuration file
    #[arg(long, global = true, env = "BILLINGO_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log HTTP activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Manage documents (invoices)
    #[command(alias = "docs")]
    Documents {
        #[command(subcommand)]
        command: DocumentCommand,
    },

    /// Manage document blocks (invoice pads)
    #[command(alias = "blocks")]
    DocumentBlocks {
        #[command(subcommand)]
        command: DocumentBlockCommand,
    },

    /// Manage partners (customers, suppliers)
    Partners {
        #[command(subcommand)]
        command: CollectionCommand,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        command: CollectionCommand,
    },

    /// Manage bank accounts
    #[command(alias = "banks")]
    BankAccounts {
        #[command(subcommand)]
        command: CollectionCommand,
    },

    /// Retrieve organization information
    #[command(alias = "org")]
    Organization {
        #[command(subcommand)]
        command: OrganizationCommand,
    },

    /// Get currency conversion rates
    #[command(alias = "currency")]
    Currencies {
        #[command(subcommand)]
        command: CurrencyCommand,
    },

    /// Utility functions
    Utils {
        #[command(subcommand)]
        command: UtilsCommand,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose || std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn,billingo=debug,billingo_core=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    if let Err(err) = run(cli).await {
        eprintln!("❌ Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "billingo", &mut io::stdout());
        return Ok(());
    }

    let session = Session::new(cli.format, cli.config)?;

    match cli.command {
        Command::Documents { command } => commands::documents::run(&session, command).await,
        Command::DocumentBlocks { command } => {
            commands::document_blocks::run(&session, command).await
        }
        Command::Partners { command } => {
            commands::collection::run(&session, Collection::Partners, command).await
        }
        Command::Products { command } => {
            commands::collection::run(&session, Collection::Products, command).await
        }
        Command::BankAccounts { command } => {
            commands::collection::run(&session, Collection::BankAccounts, command).await
        }
        Command::Organization { command } => commands::organization::run(&session, command).await,
        Command::Currencies { command } => commands::currencies::run(&session, command).await,
        Command::Utils { command } => commands::utils::run(&session, command).await,
        Command::Config { command } => commands::config::run(&session, command),
        Command::Completions { .. } => Ok(()),
    }
}
