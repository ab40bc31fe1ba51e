//! Model nesting: an ordered "parent embeds child" link between two models,
//! distinct from a foreign-key style relationship.

use crate::model::DataModel;
use blueprint_core::{Identifiable, ModelId, NestingId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A child model embedded in a parent model at a given position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNesting {
    pub id: NestingId,
    pub parent_model_id: ModelId,
    pub child_model_id: ModelId,
    pub order_index: i64,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// The joined child `data_models` row, when resolved by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_model: Option<DataModel>,
}

impl ModelNesting {
    pub fn new(parent_model_id: ModelId, child_model_id: ModelId, order_index: i64) -> Self {
        Self {
            id: NestingId::new_v4(),
            parent_model_id,
            child_model_id,
            order_index,
            created_at: Utc::now(),
            child_model: None,
        }
    }
}

impl Identifiable for ModelNesting {
    fn id(&self) -> uuid::Uuid {
        self.id
    }
}

/// Insert payload for the `model_nesting` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNesting {
    pub parent_model_id: ModelId,
    pub child_model_id: ModelId,
    pub order_index: i64,
}
