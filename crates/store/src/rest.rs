//! HTTP data service
//!
//! Talks to a PostgREST-style API: every collection lives at
//! `{base}/rest/v1/{collection}`, filters travel as `column=op.value` query
//! pairs and writes ask for the stored row back with
//! `Prefer: return=representation`.

use crate::error::{StoreError, StoreResult};
use crate::service::{Collection, DataService, Filter, Query};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

const API_KEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

// ============================================================================
// Response mapping
// ============================================================================

#[async_trait]
trait ResponseExt {
    async fn map_service_error(self) -> StoreResult<Response>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn map_service_error(self) -> StoreResult<Response> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }
        Err(StoreError::service(
            status.as_u16(),
            self.text().await.unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl ResponseExt for Result<Response, reqwest::Error> {
    async fn map_service_error(self) -> StoreResult<Response> {
        match self {
            Ok(response) => response.map_service_error().await,
            Err(e) => Err(StoreError::Transport(e.to_string())),
        }
    }
}

// ============================================================================
// Query encoding
// ============================================================================

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Encode a query as PostgREST query-string pairs
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in &query.filters {
        match filter {
            Filter::Eq { column, value } => {
                params.push((column.clone(), format!("eq.{}", cell_text(value))));
            }
            Filter::In { column, values } => {
                let list: Vec<String> = values.iter().map(cell_text).collect();
                params.push((column.clone(), format!("in.({})", list.join(","))));
            }
        }
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn id_filter(id: Uuid) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

// ============================================================================
// RestService
// ============================================================================

/// [`DataService`] over the hosted HTTP API
#[derive(Clone)]
pub struct RestService {
    base_url: String,
    client: reqwest::Client,
    api_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for RestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestService")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

impl RestService {
    /// Create a client for the service at `base_url` using the public API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> StoreResult<Self> {
        let api_key = api_key.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&api_key)
                .map_err(|e| StoreError::Transport(format!("invalid api key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            api_key,
            access_token: None,
        })
    }

    /// Authenticate requests as a signed-in user instead of the anonymous key
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint of a collection
    pub fn collection_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.as_deref().unwrap_or(&self.api_key))
    }

    fn request(&self, method: reqwest::Method, collection: Collection) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.collection_url(collection))
            .header(AUTHORIZATION, self.bearer())
    }

    async fn rows(response: Response, collection: Collection) -> StoreResult<Vec<Value>> {
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::decode(collection, e))
    }
}

#[async_trait]
impl DataService for RestService {
    #[tracing::instrument(skip(self, query))]
    async fn select(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Value>> {
        let response = self
            .request(reqwest::Method::GET, collection)
            .query(&query_params(query))
            .send()
            .await
            .map_service_error()
            .await?;
        Self::rows(response, collection).await
    }

    #[tracing::instrument(skip(self, row))]
    async fn insert(&self, collection: Collection, row: Value) -> StoreResult<Value> {
        let response = self
            .request(reqwest::Method::POST, collection)
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .json(&row)
            .send()
            .await
            .map_service_error()
            .await?;
        Self::rows(response, collection)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StoreError::service(StatusCode::NO_CONTENT.as_u16(), "insert returned no row")
            })
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, collection: Collection, id: Uuid, patch: Value) -> StoreResult<Value> {
        let response = self
            .request(reqwest::Method::PATCH, collection)
            .query(&id_filter(id))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .json(&patch)
            .send()
            .await
            .map_service_error()
            .await?;
        Self::rows(response, collection)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::RowNotFound { collection, id })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        self.request(reqwest::Method::DELETE, collection)
            .query(&id_filter(id))
            .send()
            .await
            .map_service_error()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_query_params() {
        let a = Uuid::parse_str("7c3f1e8a-1d52-4a7b-9b0e-5f7d8f3e2a10").unwrap();
        let b = Uuid::parse_str("0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d").unwrap();
        let query = Query::new()
            .eq("project_id", a)
            .in_list("id", [a, b])
            .order_by("updated_at", false)
            .limit(5);

        let params = query_params(&query);
        assert_eq!(
            pairs(&params),
            vec![
                ("select", "*"),
                ("project_id", "eq.7c3f1e8a-1d52-4a7b-9b0e-5f7d8f3e2a10"),
                (
                    "id",
                    "in.(7c3f1e8a-1d52-4a7b-9b0e-5f7d8f3e2a10,0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d)"
                ),
                ("order", "updated_at.desc"),
                ("limit", "5"),
            ]
        );
    }

    #[test]
    fn test_numeric_filter_unquoted() {
        let params = query_params(&Query::new().eq("order_index", 3));
        assert_eq!(params[1], ("order_index".to_string(), "eq.3".to_string()));
    }

    #[test]
    fn test_collection_url_and_auth() {
        let service = RestService::new("https://db.example.com/", "anon-key").unwrap();
        assert_eq!(
            service.collection_url(Collection::ModelNesting),
            "https://db.example.com/rest/v1/model_nesting"
        );
        assert_eq!(service.bearer(), "Bearer anon-key");

        let service = service.with_access_token("user-jwt");
        assert_eq!(service.bearer(), "Bearer user-jwt");
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        assert!(RestService::new("https://db.example.com", "bad\nkey").is_err());
    }
}
