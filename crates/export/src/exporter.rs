//! Graph to blueprint transform

use crate::blueprint::{
    BLUEPRINT_VERSION, Blueprint, BlueprintMeta, ExportField, ExportModel, ExportNestedModel,
    ExportPolicy, ExportRelationship, UNKNOWN_NAME,
};
use crate::{ExportError, ExportResult};
use blueprint_ir::{DataModel, ProjectGraph};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

/// Export the active project, stamped with the current time
pub fn export_blueprint(graph: Option<&ProjectGraph>) -> ExportResult<Blueprint> {
    let graph = graph.ok_or(ExportError::NoProjectSelected)?;
    Ok(export_at(graph, Utc::now()))
}

/// Export a project with an explicit timestamp.
///
/// Models keep graph order. Names are resolved now, so renames are always
/// reflected; references that no longer resolve export as `"Unknown"`.
pub fn export_at(graph: &ProjectGraph, exported_at: DateTime<Utc>) -> Blueprint {
    let models = graph
        .models
        .iter()
        .map(|model| export_model(graph, model))
        .collect();

    let relationships = graph
        .relationships
        .iter()
        .map(|rel| {
            let name = |id| {
                graph.model_name(id).unwrap_or_else(|| {
                    warn!(relationship = %rel.id, model = %id, "relationship endpoint missing");
                    UNKNOWN_NAME
                })
            };
            ExportRelationship {
                from: name(rel.source_model_id).to_string(),
                to: name(rel.target_model_id).to_string(),
                cardinality: rel.cardinality,
            }
        })
        .collect();

    let blueprint = Blueprint {
        meta: BlueprintMeta {
            version: BLUEPRINT_VERSION.to_string(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            project_name: graph.project.name.clone(),
            project_description: graph.project.description.clone(),
        },
        models,
        relationships,
    };
    debug!(
        project = %graph.project_id(),
        models = blueprint.models.len(),
        relationships = blueprint.relationships.len(),
        "exported blueprint"
    );
    blueprint
}

fn export_model(graph: &ProjectGraph, model: &DataModel) -> ExportModel {
    let fields = graph
        .attachments_for_model(model.id)
        .into_iter()
        .map(|attachment| {
            let field = graph.field_for(attachment);
            ExportField {
                name: field.map_or(UNKNOWN_NAME, |f| f.name.as_str()).to_string(),
                data_type: field.map(|f| f.data_type),
                required: attachment.is_required,
                unique: attachment.is_unique,
                validation_rules: attachment.business_rules.clone(),
            }
        })
        .collect();

    let nested_models = graph
        .nestings_for_model(model.id)
        .into_iter()
        .map(|nesting| ExportNestedModel {
            model_name: graph
                .child_model_for(nesting)
                .map_or(UNKNOWN_NAME, |m| m.name.as_str())
                .to_string(),
            order: nesting.order_index,
        })
        .collect();

    let security_policies = graph
        .policies_for_model(model.id)
        .into_iter()
        .map(|policy| ExportPolicy {
            operation: policy.operation,
            description: policy.rule_description.clone(),
            condition: policy.condition.clone(),
        })
        .collect();

    ExportModel {
        name: model.name.clone(),
        fields,
        nested_models,
        actions: model.crud_actions,
        security_policies,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::{Cardinality, DataType, PolicyOperation};
    use blueprint_ir::{
        BusinessRule, CrudActions, DataField, ModelField, ModelNesting, Project, Relationship,
        RlsPolicy, RuleKind,
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    fn empty_graph() -> ProjectGraph {
        ProjectGraph::new(Project::new(Uuid::new_v4(), "Shop").with_description("Online shop"))
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    /// Customer --1:M--> Order, Customer has email (required, unique) and name
    fn customer_order_graph() -> ProjectGraph {
        let mut graph = empty_graph();
        let project_id = graph.project_id();

        let customer = DataModel::new(project_id, "Customer");
        let order = DataModel::new(project_id, "Order");
        let email = DataField::new(project_id, "email", DataType::Email).reusable();
        let name = DataField::new(project_id, "name", DataType::Text).reusable();

        graph.model_fields = vec![
            ModelField::new(customer.id, name.id, 1),
            ModelField::new(customer.id, email.id, 0).required().unique(),
        ];
        graph.relationships = vec![Relationship::new(
            project_id,
            customer.id,
            order.id,
            Cardinality::OneToMany,
        )];
        graph.fields = vec![email, name];
        graph.models = vec![customer, order];
        graph
    }

    #[test]
    fn test_no_project_selected() {
        let err = export_blueprint(None).unwrap_err();
        assert_eq!(err.to_string(), "No project selected");
    }

    #[test]
    fn test_empty_project() {
        let blueprint = export_at(&empty_graph(), fixed_time());
        assert!(blueprint.models.is_empty());
        assert!(blueprint.relationships.is_empty());
        assert_eq!(blueprint.meta.version, "1.0.0");
        assert_eq!(blueprint.meta.exported_at, "2024-03-01T12:30:00.000Z");
        assert_eq!(blueprint.meta.project_name, "Shop");
        assert_eq!(blueprint.meta.project_description, "Online shop");
    }

    #[test]
    fn test_customer_order_scenario() {
        let blueprint = export_at(&customer_order_graph(), fixed_time());
        let value = serde_json::to_value(&blueprint).unwrap();

        assert_eq!(
            value["models"][0],
            json!({
                "name": "Customer",
                "fields": [
                    {"name": "email", "type": "email", "required": true, "unique": true, "validation_rules": []},
                    {"name": "name", "type": "text", "required": false, "unique": false, "validation_rules": []}
                ],
                "nested_models": [],
                "actions": {"create": true, "read": true, "update": true, "delete": true},
                "security_policies": []
            })
        );
        assert_eq!(
            value["relationships"],
            json!([{"from": "Customer", "to": "Order", "type": "1:M"}])
        );
    }

    #[test]
    fn test_rename_reflected() {
        let mut graph = customer_order_graph();
        graph.models[0].name = "Client".to_string();

        let blueprint = export_at(&graph, fixed_time());
        assert_eq!(blueprint.models[0].name, "Client");
        assert_eq!(blueprint.relationships[0].from, "Client");
    }

    #[test]
    fn test_dangling_references_become_unknown() {
        let mut graph = customer_order_graph();
        let customer_id = graph.models[0].id;
        graph.models.remove(1);
        graph
            .model_fields
            .push(ModelField::new(customer_id, Uuid::new_v4(), 5));

        let blueprint = export_at(&graph, fixed_time());
        assert_eq!(blueprint.relationships[0].to, "Unknown");

        let orphan = serde_json::to_value(&blueprint.models[0].fields[2]).unwrap();
        assert_eq!(
            orphan,
            json!({"name": "Unknown", "required": false, "unique": false, "validation_rules": []})
        );
    }

    #[test]
    fn test_rules_policies_and_nesting() {
        let mut graph = customer_order_graph();
        let (customer_id, order_id) = (graph.models[0].id, graph.models[1].id);
        let email_id = graph.fields[0].id;

        graph.model_fields[1] = ModelField::new(customer_id, email_id, 0)
            .with_rule(BusinessRule::new(RuleKind::Pattern, ".+@.+").with_message("Invalid email"));
        graph.policies = vec![RlsPolicy::new(
            customer_id,
            PolicyOperation::Read,
            "Users can read their own record",
        )];
        graph.nestings = vec![
            ModelNesting::new(order_id, Uuid::new_v4(), 1),
            ModelNesting::new(order_id, customer_id, 0),
        ];
        graph.models[1].crud_actions = CrudActions {
            delete: false,
            ..CrudActions::all()
        };

        let value = serde_json::to_value(export_at(&graph, fixed_time())).unwrap();
        assert_eq!(
            value["models"][0]["fields"][0]["validation_rules"],
            json!([{"type": "pattern", "value": ".+@.+", "message": "Invalid email"}])
        );
        assert_eq!(
            value["models"][0]["security_policies"],
            json!([{"operation": "READ", "description": "Users can read their own record", "condition": {}}])
        );
        assert_eq!(
            value["models"][1]["nested_models"],
            json!([{"model_name": "Customer", "order": 0}, {"model_name": "Unknown", "order": 1}])
        );
        assert_eq!(value["models"][1]["actions"]["delete"], json!(false));
    }
}
