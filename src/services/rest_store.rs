//! PostgREST-compatible bookmark backend.
//!
//! Talks to `<base>/rest/v1/<collection>` the way hosted Postgres services
//! expose tables over HTTP. Filters become `column=eq.value` parameters and
//! ordering becomes `order=column.desc`.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;

use crate::providers::persistence::{OrderBy, PersistenceProvider, RowFilter};
use crate::types::bookmark::{Bookmark, NewBookmarkRow};
use crate::types::errors::RemoteError;

pub struct RestStore {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RestStore {
    /// Creates a client for the service rooted at `base_url`.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        })
    }

    /// `<base>/rest/v1/<collection>`
    pub fn endpoint(&self, collection: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(&format!("rest/v1/{}", collection))
            .map_err(|e| RemoteError::Unavailable(e.to_string()))
    }

    /// Query-string pairs for a filtered, optionally ordered request.
    pub fn query_pairs(filter: &RowFilter, order: Option<&OrderBy>) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = filter
            .terms()
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{}", value)))
            .collect();
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        pairs
    }

    /// Every request carries the configured key, both as `apikey` and as the
    /// bearer token. Owner scoping comes from the `user_id` filter terms.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("{}: {}", status, body))
}

#[async_trait]
impl PersistenceProvider for RestStore {
    async fn query(
        &self,
        collection: &str,
        filter: &RowFilter,
        order: &OrderBy,
    ) -> Result<Vec<Bookmark>, RemoteError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(Self::query_pairs(filter, Some(order)));

        let response = self
            .authorize(self.client.get(self.endpoint(collection)?))
            .query(&params)
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        let response = check_status(response).await.map_err(RemoteError::Query)?;
        let rows: Vec<Bookmark> = response
            .json()
            .await
            .map_err(|e| RemoteError::Query(e.to_string()))?;
        debug!("fetched {} row(s) from {}", rows.len(), collection);
        Ok(rows)
    }

    async fn insert(&self, collection: &str, row: NewBookmarkRow) -> Result<(), RemoteError> {
        let response = self
            .authorize(self.client.post(self.endpoint(collection)?))
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        check_status(response).await.map_err(RemoteError::Write)?;
        Ok(())
    }

    async fn delete(&self, collection: &str, filter: &RowFilter) -> Result<u64, RemoteError> {
        if filter.terms().is_empty() {
            return Err(RemoteError::InvalidFilter("delete requires a filter".to_string()));
        }
        let response = self
            .authorize(self.client.delete(self.endpoint(collection)?))
            .header("Prefer", "return=representation")
            .query(&Self::query_pairs(filter, None))
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(0);
        }
        let response = check_status(response).await.map_err(RemoteError::Write)?;
        let removed: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::Write(e.to_string()))?;
        Ok(removed.len() as u64)
    }
}
