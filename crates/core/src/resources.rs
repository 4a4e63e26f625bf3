//! One method per Billingo endpoint.
//!
//! Commands call these instead of building paths themselves, so every
//! resource group goes through the same surface.

use crate::client::BillingoClient;
use crate::error::Result;
use crate::query::Query;
use serde::Serialize;
use serde_json::Value;

/// Resource collections with standard list/get/create/update/delete routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Documents,
    DocumentBlocks,
    Partners,
    Products,
    BankAccounts,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Documents => "/documents",
            Collection::DocumentBlocks => "/document-blocks",
            Collection::Partners => "/partners",
            Collection::Products => "/products",
            Collection::BankAccounts => "/bank-accounts",
        }
    }

    /// Human-readable singular name for status messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Collection::Documents => "document",
            Collection::DocumentBlocks => "document block",
            Collection::Partners => "partner",
            Collection::Products => "product",
            Collection::BankAccounts => "bank account",
        }
    }

    /// Human-readable plural name for status messages.
    pub fn plural(&self) -> &'static str {
        match self {
            Collection::Documents => "documents",
            Collection::DocumentBlocks => "document blocks",
            Collection::Partners => "partners",
            Collection::Products => "products",
            Collection::BankAccounts => "bank accounts",
        }
    }

    fn item(&self, id: u64) -> String {
        format!("{}/{}", self.path(), id)
    }
}

/// A page from a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// The `data` array, or the whole body if the response was not a
    /// paginated envelope.
    pub items: Value,
    pub total: Option<u64>,
    pub current_page: Option<u64>,
    pub last_page: Option<u64>,
}

impl Listing {
    pub fn from_value(value: Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_u64);
        let total = field("total");
        let current_page = field("current_page");
        let last_page = field("last_page");

        let items = match value {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_array) => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        Self {
            items,
            total,
            current_page,
            last_page,
        }
    }

    pub fn len(&self) -> usize {
        match &self.items {
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body of `POST /documents/{id}/send`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendDocument {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SendDocument {
    /// Split a comma-separated address list, dropping blanks.
    pub fn parse_emails(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl BillingoClient {
    pub async fn list(&self, collection: Collection, query: &Query) -> Result<Listing> {
        let body = self.get(collection.path(), query).await?;
        Ok(Listing::from_value(body))
    }

    pub async fn fetch(&self, collection: Collection, id: u64) -> Result<Value> {
        self.get(&collection.item(id), &Query::new()).await
    }

    pub async fn create(&self, collection: Collection, body: &Value) -> Result<Value> {
        self.post(collection.path(), Some(body)).await
    }

    pub async fn update(&self, collection: Collection, id: u64, body: &Value) -> Result<Value> {
        self.put(&collection.item(id), body).await
    }

    pub async fn remove(&self, collection: Collection, id: u64) -> Result<Value> {
        self.delete(&collection.item(id)).await
    }

    pub async fn cancel_document(&self, id: u64) -> Result<Value> {
        self.post(&format!("/documents/{}/cancel", id), None).await
    }

    pub async fn send_document(&self, id: u64, request: &SendDocument) -> Result<Value> {
        let body = serde_json::to_value(request)
            .map_err(|e| crate::Error::Request(format!("Failed to encode send request: {}", e)))?;
        self.post(&format!("/documents/{}/send", id), Some(&body)).await
    }

    /// PDF bytes of a document.
    pub async fn download_document(&self, id: u64) -> Result<Vec<u8>> {
        self.download(&format!("/documents/{}/download", id)).await
    }

    pub async fn document_public_url(&self, id: u64) -> Result<Value> {
        self.get(&format!("/documents/{}/public-url", id), &Query::new())
            .await
    }

    pub async fn document_payments(&self, id: u64) -> Result<Value> {
        self.get(&format!("/documents/{}/payments", id), &Query::new())
            .await
    }

    pub async fn update_document_payments(&self, id: u64, body: &Value) -> Result<Value> {
        self.put(&format!("/documents/{}/payments", id), body).await
    }

    pub async fn delete_document_payments(&self, id: u64) -> Result<Value> {
        self.delete(&format!("/documents/{}/payments", id)).await
    }

    pub async fn document_online_szamla(&self, id: u64) -> Result<Value> {
        self.get(&format!("/documents/{}/online-szamla", id), &Query::new())
            .await
    }

    pub async fn organization(&self) -> Result<Value> {
        self.get("/organization", &Query::new()).await
    }

    /// Currency codes the API accepts. A body-less reply is an empty list.
    pub async fn currencies(&self) -> Result<Value> {
        let body = self.get("/currencies", &Query::new()).await?;
        if body.is_null() {
            return Ok(Value::Array(Vec::new()));
        }
        Ok(body)
    }

    pub async fn conversion_rate(&self, from: &str, to: &str) -> Result<Value> {
        let query = Query::new().param("from", from).param("to", to);
        self.get("/currencies", &query).await
    }

    pub async fn convert_legacy_id(&self, id: u64) -> Result<Value> {
        self.get(&format!("/utils/convert-legacy-id/{}", id), &Query::new())
            .await
    }
}
