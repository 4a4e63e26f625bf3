pub mod collection;
pub mod config;
pub mod currencies;
pub mod document_blocks;
pub mod documents;
pub mod organization;
pub mod utils;

use crate::output::{self, OutputFormat};
use anyhow::Result;
use billingo_core::{BillingoClient, ConfigStore, Query, payload::read_payload};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

/// Per-invocation state shared by every command.
pub struct Session {
    pub format: OutputFormat,
    pub store: ConfigStore,
}

impl Session {
    pub fn new(format: OutputFormat, config_path: Option<PathBuf>) -> Result<Self> {
        let store = match config_path {
            Some(path) => ConfigStore::new(path),
            None => ConfigStore::open_default()?,
        };
        Ok(Self { format, store })
    }

    /// Build an API client from the stored config and environment.
    pub fn client(&self) -> Result<BillingoClient> {
        let config = self.store.load()?.client_configuration();
        let client = BillingoClient::new(config)?;
        tracing::debug!(base_url = %client.base_url(), "using API endpoint");
        Ok(client)
    }

    pub fn print(&self, value: &Value) {
        println!("{}", output::render(value, self.format));
    }
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value_t = 25)]
    pub per_page: u32,
}

impl PageArgs {
    pub fn query(&self) -> Query {
        Query::page(self.page, self.per_page)
    }
}

#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// JSON file with the request body ('-' reads stdin)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// JSON string with the request body
    #[arg(short, long, value_name = "JSON")]
    pub data: Option<String>,
}

impl PayloadArgs {
    pub fn read(&self) -> billingo_core::Result<Value> {
        read_payload(self.file.as_deref(), self.data.as_deref())
    }
}
