//! PostgREST client for the hosted attribute tables.
//!
//! Endpoints, relative to the project URL:
//!
//! - read: `GET /rest/v1/{table}?select=city_id,city_name,{col}&order=city_id`
//! - upsert: `POST /rest/v1/{table}?on_conflict=city_name` with
//!   `Prefer: resolution=merge-duplicates`
//! - delete all: `DELETE /rest/v1/{table}?id=neq.0`

use serde_json::Value;
use tracing::debug;

use crate::error::{CloudError, Result};
use crate::http::{HttpClient, HttpOptions};
use crate::models::{AttributeRow, Collection};
use crate::store::AttributeStore;

/// Environment variable holding the project URL.
pub const STORE_URL_ENV: &str = "DEPOMAP_STORE_URL";
/// Environment variable holding the API key.
pub const STORE_KEY_ENV: &str = "DEPOMAP_STORE_KEY";

/// Connection settings for [`SupabaseStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    pub api_key: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CloudError::Config(format!("store URL must be http(s): '{url}'")));
        }
        if api_key.is_empty() {
            return Err(CloudError::Config("store API key is empty".into()));
        }
        Ok(Self { url, api_key })
    }

    /// Read [`STORE_URL_ENV`] and [`STORE_KEY_ENV`].
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(STORE_URL_ENV)
            .map_err(|_| CloudError::Config(format!("{STORE_URL_ENV} is not set")))?;
        let key = std::env::var(STORE_KEY_ENV)
            .map_err(|_| CloudError::Config(format!("{STORE_KEY_ENV} is not set")))?;
        Self::new(url, key)
    }

    /// REST endpoint of a collection's table.
    pub fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.url, collection.table())
    }
}

/// Attribute store backed by a Supabase (PostgREST) project.
pub struct SupabaseStore {
    config: StoreConfig,
    http: HttpClient,
}

impl SupabaseStore {
    pub fn new(config: StoreConfig, options: HttpOptions) -> Result<Self> {
        let http = HttpClient::with_api_key(options, &config.api_key)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl AttributeStore for SupabaseStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<AttributeRow>> {
        let url = self.config.table_url(collection);
        let select = collection.select_columns();
        let request = self
            .http
            .client()
            .get(&url)
            .query(&[("select", select.as_str()), ("order", "city_id")]);

        let body = self.http.read_text(request).await?;
        let rows: Vec<Value> = serde_json::from_str(&body)
            .map_err(|e| CloudError::Decode(format!("parsing {collection} rows: {e}")))?;
        debug!("GET {} -> {} rows", url, rows.len());

        rows.iter().map(|row| AttributeRow::from_json(collection, row)).collect()
    }

    async fn upsert_many(&self, collection: Collection, rows: &[AttributeRow]) -> Result<()> {
        let body: Vec<Value> = rows.iter().map(AttributeRow::to_json).collect();
        let request = self
            .http
            .client()
            .post(self.config.table_url(collection))
            .query(&[("on_conflict", "city_name")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);

        self.http.write(request).await?;
        debug!("Upserted {} rows into {}", rows.len(), collection);
        Ok(())
    }

    async fn delete_all(&self, collection: Collection) -> Result<()> {
        let request = self
            .http
            .client()
            .delete(self.config.table_url(collection))
            .query(&[("id", "neq.0")]);

        self.http.write(request).await?;
        debug!("Deleted all rows from {}", collection);
        Ok(())
    }
}
