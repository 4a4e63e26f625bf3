pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod query;
pub mod resources;

pub use client::{BillingoClient, Notifier, StderrNotifier};
pub use config::{ClientConfiguration, ConfigKey, ConfigStore, StoredConfig};
pub use error::{Error, Result};
pub use query::Query;
pub use resources::{Collection, Listing, SendDocument};
