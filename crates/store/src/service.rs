//! The external data service contract
//!
//! The hosted service exposes seven collections of JSON rows with filtered
//! select, insert-returning-row, update-by-id and delete-by-id. Everything the
//! store knows about persistence goes through [`DataService`].

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Collections
// ============================================================================

/// One table of the hosted schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Projects,
    DataModels,
    DataFields,
    ModelFields,
    Relationships,
    RlsPolicies,
    ModelNesting,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Projects,
        Collection::DataModels,
        Collection::DataFields,
        Collection::ModelFields,
        Collection::Relationships,
        Collection::RlsPolicies,
        Collection::ModelNesting,
    ];

    /// Table name on the service
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::DataModels => "data_models",
            Collection::DataFields => "data_fields",
            Collection::ModelFields => "model_fields",
            Collection::Relationships => "relationships",
            Collection::RlsPolicies => "rls_policies",
            Collection::ModelNesting => "model_nesting",
        }
    }

    /// Whether rows of this collection carry an `updated_at` column
    pub fn has_updated_at(&self) -> bool {
        !matches!(self, Collection::ModelFields | Collection::ModelNesting)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Queries
// ============================================================================

/// A column filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
}

impl Filter {
    /// Check a row against this filter
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::Eq { column, value } => row.get(column) == Some(value),
            Filter::In { column, values } => row
                .get(column)
                .is_some_and(|cell| values.iter().any(|v| v == cell)),
        }
    }
}

/// Sort order on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A filtered, ordered, limited select
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn eq(mut self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: to_cell(value),
        });
        self
    }

    /// Add a membership filter
    pub fn in_list<T: Serialize>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().map(to_cell).collect(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check a row against every filter
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

fn to_cell(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// ============================================================================
// DataService
// ============================================================================

/// The hosted relational data service
#[async_trait]
pub trait DataService: Send + Sync {
    /// Rows of a collection matching a query
    async fn select(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Value>>;

    /// Insert a row and return it as stored (with generated id and timestamps)
    async fn insert(&self, collection: Collection, row: Value) -> StoreResult<Value>;

    /// Patch the row with the given id and return it as stored
    async fn update(&self, collection: Collection, id: Uuid, patch: Value) -> StoreResult<Value>;

    /// Delete the row with the given id
    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()>;
}

// ============================================================================
// Typed helpers
// ============================================================================

/// Select rows and decode them
pub async fn fetch<T: DeserializeOwned>(
    service: &dyn DataService,
    collection: Collection,
    query: &Query,
) -> StoreResult<Vec<T>> {
    service
        .select(collection, query)
        .await?
        .into_iter()
        .map(|row| decode(collection, row))
        .collect()
}

/// Select the row with the given id
pub async fn fetch_one<T: DeserializeOwned>(
    service: &dyn DataService,
    collection: Collection,
    id: Uuid,
) -> StoreResult<T> {
    let query = Query::new().eq("id", id).limit(1);
    fetch(service, collection, &query)
        .await?
        .into_iter()
        .next()
        .ok_or(StoreError::RowNotFound { collection, id })
}

/// Insert a payload and decode the stored row
pub async fn create<P: Serialize + Sync, T: DeserializeOwned>(
    service: &dyn DataService,
    collection: Collection,
    payload: &P,
) -> StoreResult<T> {
    let row = encode(collection, payload)?;
    decode(collection, service.insert(collection, row).await?)
}

/// Patch a row and decode the stored result
pub async fn patch<P: Serialize + Sync, T: DeserializeOwned>(
    service: &dyn DataService,
    collection: Collection,
    id: Uuid,
    payload: &P,
) -> StoreResult<T> {
    let mut row = encode(collection, payload)?;
    if collection.has_updated_at() {
        if let Value::Object(map) = &mut row {
            map.insert("updated_at".to_string(), to_cell(chrono::Utc::now()));
        }
    }
    decode(collection, service.update(collection, id, row).await?)
}

fn encode<P: Serialize>(collection: Collection, payload: &P) -> StoreResult<Value> {
    serde_json::to_value(payload).map_err(|e| StoreError::decode(collection, e))
}

fn decode<T: DeserializeOwned>(collection: Collection, row: Value) -> StoreResult<T> {
    serde_json::from_value(row).map_err(|e| StoreError::decode(collection, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_names() {
        let names: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "projects",
                "data_models",
                "data_fields",
                "model_fields",
                "relationships",
                "rls_policies",
                "model_nesting"
            ]
        );
        assert_eq!(
            serde_json::to_value(Collection::RlsPolicies).unwrap(),
            json!("rls_policies")
        );
    }

    #[test]
    fn test_query_matches() {
        let id = Uuid::new_v4();
        let row = json!({"id": id, "project_id": "p1", "name": "Customer"});

        assert!(Query::new().eq("project_id", "p1").matches(&row));
        assert!(!Query::new().eq("project_id", "p2").matches(&row));
        assert!(Query::new().in_list("id", [id, Uuid::new_v4()]).matches(&row));
        assert!(!Query::new().in_list("id", Vec::<Uuid>::new()).matches(&row));
        assert!(!Query::new().eq("missing", "x").matches(&row));
    }
}
