//! In-process data service
//!
//! `MemoryService` keeps every collection as a list of JSON rows and enforces
//! the foreign keys of the hosted schema: inserts and updates must reference
//! existing parents, and deleting a parent cascades to its dependents. It can
//! optionally mirror itself to a JSON snapshot file after every write, which is
//! what the command-line front end uses when no hosted service is configured.

use crate::error::{StoreError, StoreResult};
use crate::service::{Collection, DataService, Query};
use async_trait::async_trait;
use blueprint_core::{EngineError, Persistable, ResultExt};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// Schema
// ============================================================================

/// Foreign keys of a collection: `(column, parent collection)`
fn references(collection: Collection) -> &'static [(&'static str, Collection)] {
    match collection {
        Collection::Projects => &[],
        Collection::DataModels => &[("project_id", Collection::Projects)],
        Collection::DataFields => &[("project_id", Collection::Projects)],
        Collection::ModelFields => &[
            ("model_id", Collection::DataModels),
            ("field_id", Collection::DataFields),
        ],
        Collection::Relationships => &[
            ("project_id", Collection::Projects),
            ("source_model_id", Collection::DataModels),
            ("target_model_id", Collection::DataModels),
        ],
        Collection::RlsPolicies => &[("model_id", Collection::DataModels)],
        Collection::ModelNesting => &[
            ("parent_model_id", Collection::DataModels),
            ("child_model_id", Collection::DataModels),
        ],
    }
}

// ============================================================================
// Tables
// ============================================================================

/// All rows, keyed by collection. This is also the snapshot file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryTables {
    tables: BTreeMap<Collection, Vec<Value>>,
}

impl Persistable for MemoryTables {}

impl MemoryTables {
    pub fn rows(&self, collection: Collection) -> &[Value] {
        self.tables
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of rows across all collections
    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        self.tables.entry(collection).or_default()
    }

    fn contains(&self, collection: Collection, id: &Value) -> bool {
        self.rows(collection)
            .iter()
            .any(|row| row.get("id") == Some(id))
    }

    fn check_references(&self, collection: Collection, row: &Map<String, Value>) -> StoreResult<()> {
        for (column, parent) in references(collection) {
            match row.get(*column) {
                Some(value) if self.contains(*parent, value) => {}
                Some(Value::Null) | None => {
                    return Err(StoreError::service(
                        400,
                        format!("null value in column \"{column}\" of relation \"{collection}\""),
                    ));
                }
                Some(value) => {
                    return Err(StoreError::service(
                        409,
                        format!(
                            "insert or update on table \"{collection}\" violates foreign key \
                             constraint: {column}={value} is not present in \"{parent}\""
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Remove a row and everything that references it. Returns the number of
    /// rows removed.
    fn remove_cascading(&mut self, collection: Collection, id: &Value) -> usize {
        let rows = self.rows_mut(collection);
        let before = rows.len();
        rows.retain(|row| row.get("id") != Some(id));
        let mut removed = before - rows.len();
        if removed == 0 {
            return 0;
        }

        for child in Collection::ALL {
            for (column, parent) in references(child) {
                if *parent != collection {
                    continue;
                }
                let dependents: Vec<Value> = self
                    .rows(child)
                    .iter()
                    .filter(|row| row.get(*column) == Some(id))
                    .filter_map(|row| row.get("id").cloned())
                    .collect();
                for dependent in dependents {
                    removed += self.remove_cascading(child, &dependent);
                }
            }
        }
        removed
    }
}

fn now_cell() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

/// Compare two cells the way the service orders them: nulls first, then
/// timestamps, numbers and strings by their natural order.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(value).ok()
    }

    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => match (timestamp(x), timestamp(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty),
            _ => x.cmp(y),
        },
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

// ============================================================================
// MemoryService
// ============================================================================

/// In-process implementation of [`DataService`]
#[derive(Debug, Default)]
pub struct MemoryService {
    tables: RwLock<MemoryTables>,
    snapshot: Option<PathBuf>,
}

impl MemoryService {
    /// An empty, unpersisted service
    pub fn new() -> Self {
        Self::default()
    }

    /// A service seeded with existing tables
    pub fn with_tables(tables: MemoryTables) -> Self {
        Self {
            tables: RwLock::new(tables),
            snapshot: None,
        }
    }

    /// Open a service backed by a snapshot file. A missing file starts empty
    /// and is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = match MemoryTables::load_from_file(&path) {
            Ok(tables) => tables,
            Err(EngineError::SnapshotNotFound(_)) => {
                debug!(path = %path.display(), "snapshot missing, starting empty");
                MemoryTables::default()
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), rows = tables.len(), "opened snapshot");
        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// A copy of every table
    pub async fn tables(&self) -> MemoryTables {
        self.tables.read().await.clone()
    }

    async fn persist(&self, tables: &MemoryTables) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let json = tables
            .to_json()
            .with_context(format!("encoding snapshot {}", path.display()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| EngineError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl DataService for MemoryService {
    async fn select(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .rows(collection)
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_cells(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Value) -> StoreResult<Value> {
        let Value::Object(mut row) = row else {
            return Err(StoreError::service(400, "row must be a JSON object"));
        };

        let mut tables = self.tables.write().await;
        tables.check_references(collection, &row)?;

        let id = row
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
            .clone();
        if tables.contains(collection, &id) {
            return Err(StoreError::service(
                409,
                format!("duplicate key value violates unique constraint \"{collection}_pkey\""),
            ));
        }
        row.entry("created_at").or_insert_with(now_cell);
        if collection.has_updated_at() {
            row.entry("updated_at").or_insert_with(now_cell);
        }

        let row = Value::Object(row);
        let mut staged = tables.clone();
        staged.rows_mut(collection).push(row.clone());
        self.persist(&staged).await?;
        *tables = staged;
        debug!(%collection, %id, "inserted row");
        Ok(row)
    }

    async fn update(&self, collection: Collection, id: Uuid, patch: Value) -> StoreResult<Value> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::service(400, "patch must be a JSON object"));
        };

        let mut tables = self.tables.write().await;
        let key = Value::String(id.to_string());
        let Some(index) = tables
            .rows(collection)
            .iter()
            .position(|row| row.get("id") == Some(&key))
        else {
            return Err(StoreError::RowNotFound { collection, id });
        };

        let mut updated = match &tables.rows(collection)[index] {
            Value::Object(existing) => existing.clone(),
            _ => Map::new(),
        };
        for (column, value) in patch {
            if column != "id" {
                updated.insert(column, value);
            }
        }
        tables.check_references(collection, &updated)?;

        let row = Value::Object(updated);
        let mut staged = tables.clone();
        staged.rows_mut(collection)[index] = row.clone();
        self.persist(&staged).await?;
        *tables = staged;
        debug!(%collection, %id, "updated row");
        Ok(row)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let removed = staged.remove_cascading(collection, &Value::String(id.to_string()));
        if removed > 0 {
            self.persist(&staged).await?;
            *tables = staged;
        }
        debug!(%collection, %id, removed, "deleted row");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn seeded() -> (MemoryService, Value, Value, Value) {
        let service = MemoryService::new();
        let project = service
            .insert(Collection::Projects, json!({"name": "Shop", "user_id": Uuid::new_v4()}))
            .await
            .unwrap();
        let model = service
            .insert(
                Collection::DataModels,
                json!({"project_id": project["id"], "name": "Customer"}),
            )
            .await
            .unwrap();
        let field = service
            .insert(
                Collection::DataFields,
                json!({"project_id": project["id"], "name": "email", "data_type": "email"}),
            )
            .await
            .unwrap();
        (service, project, model, field)
    }

    fn uuid_of(row: &Value) -> Uuid {
        row["id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_insert_generates_id_and_timestamps() {
        let (_, project, _, _) = seeded().await;
        assert!(project["id"].is_string());
        assert!(project["created_at"].is_string());
        assert!(project["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_insert_rejects_dangling_reference() {
        let (service, _, _, field) = seeded().await;
        let err = service
            .insert(
                Collection::ModelFields,
                json!({"model_id": Uuid::new_v4(), "field_id": field["id"], "order_index": 0}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Service { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_delete_model_cascades_but_keeps_field() {
        let (service, project, model, field) = seeded().await;
        service
            .insert(
                Collection::ModelFields,
                json!({"model_id": model["id"], "field_id": field["id"], "order_index": 0}),
            )
            .await
            .unwrap();
        service
            .insert(
                Collection::Relationships,
                json!({
                    "project_id": project["id"],
                    "source_model_id": model["id"],
                    "target_model_id": model["id"],
                    "cardinality": "1:M"
                }),
            )
            .await
            .unwrap();

        service
            .delete(Collection::DataModels, uuid_of(&model))
            .await
            .unwrap();

        let tables = service.tables().await;
        assert!(tables.rows(Collection::DataModels).is_empty());
        assert!(tables.rows(Collection::ModelFields).is_empty());
        assert!(tables.rows(Collection::Relationships).is_empty());
        assert_eq!(tables.rows(Collection::DataFields).len(), 1);
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let (service, project, _, _) = seeded().await;
        for name in ["Order", "Invoice"] {
            service
                .insert(
                    Collection::DataModels,
                    json!({"project_id": project["id"], "name": name}),
                )
                .await
                .unwrap();
        }

        let query = Query::new()
            .eq("project_id", &project["id"])
            .order_by("name", true)
            .limit(2);
        let names: Vec<Value> = service
            .select(Collection::DataModels, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Customer"), json!("Invoice")]);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let (service, _, model, _) = seeded().await;
        let updated = service
            .update(
                Collection::DataModels,
                uuid_of(&model),
                json!({"name": "Client", "id": "ignored"}),
            )
            .await
            .unwrap();
        assert_eq!(updated["name"], json!("Client"));
        assert_eq!(updated["id"], model["id"]);

        let err = service
            .update(Collection::DataModels, Uuid::new_v4(), json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        let early = json!("2024-05-01T10:00:00Z");
        let late = json!("2024-05-01T10:00:00.500Z");
        assert_eq!(compare_cells(Some(&early), Some(&late)), Ordering::Less);
        assert_eq!(compare_cells(None, Some(&late)), Ordering::Less);
    }

    #[test]
    fn test_snapshot_round_trip() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("studio.json");

            let service = MemoryService::open(&path).unwrap();
            service
                .insert(Collection::Projects, json!({"name": "Shop", "user_id": Uuid::nil()}))
                .await
                .unwrap();
            assert!(path.exists());

            let reopened = MemoryService::open(&path).unwrap();
            let rows = reopened
                .select(Collection::Projects, &Query::new())
                .await
                .unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["name"], json!("Shop"));
        });
    }
}
