//! Human-readable terminal output

use blueprint_core::CrudAction;
use blueprint_ir::{CrudActions, Project, ProjectGraph};
use colored::Colorize;
use std::fmt::Write;

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green().bold(), message.as_ref());
}

/// `C R U -` style summary of enabled actions
pub fn actions_badge(actions: &CrudActions) -> String {
    CrudAction::ALL
        .iter()
        .map(|action| {
            if actions.get(*action) {
                &action.display_name()[..1]
            } else {
                "-"
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn project_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return format!("{}\n", "No projects yet".dimmed());
    }

    let width = projects.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for project in projects {
        let _ = writeln!(
            out,
            "{:<width$}  {}  {}",
            project.name.bold(),
            project.id.to_string().dimmed(),
            project.updated_at.format("%Y-%m-%d %H:%M"),
        );
        if !project.description.is_empty() {
            let _ = writeln!(out, "{:<width$}  {}", "", project.description);
        }
    }
    out
}

/// Full outline of a project graph
pub fn project_outline(graph: &ProjectGraph) -> String {
    let mut out = String::new();
    let project = &graph.project;
    let _ = writeln!(out, "{}  {}", project.name.bold(), project.id.to_string().dimmed());
    if !project.description.is_empty() {
        let _ = writeln!(out, "{}", project.description);
    }

    let _ = writeln!(out, "\n{} ({})", "Models".cyan().bold(), graph.models.len());
    for model in &graph.models {
        let _ = writeln!(
            out,
            "  {}  [{}]  at ({}, {})",
            model.name.bold(),
            actions_badge(&model.crud_actions),
            model.canvas_position.x,
            model.canvas_position.y,
        );

        for attachment in graph.attachments_for_model(model.id) {
            let field = graph.field_for(attachment);
            let mut flags = Vec::new();
            if attachment.is_required {
                flags.push("required");
            }
            if attachment.is_unique {
                flags.push("unique");
            }
            let _ = writeln!(
                out,
                "    {}. {}: {}{}",
                attachment.order_index,
                field.map_or("Unknown", |f| f.name.as_str()),
                field.map_or("?", |f| f.data_type.as_str()),
                if flags.is_empty() {
                    String::new()
                } else {
                    format!("  {}", flags.join(", ").yellow())
                },
            );
            for rule in &attachment.business_rules {
                let _ = writeln!(out, "       {} {:?} {}", "rule".dimmed(), rule.kind, rule.value);
            }
        }

        for nesting in graph.nestings_for_model(model.id) {
            let child = graph
                .child_model_for(nesting)
                .map_or("Unknown", |m| m.name.as_str());
            let _ = writeln!(out, "    {} {}", "nested".dimmed(), child);
        }

        for (operation, policies) in graph.policies_by_operation(model.id) {
            for policy in policies {
                let _ = writeln!(
                    out,
                    "    {} {}: {}",
                    "policy".magenta(),
                    operation,
                    policy.rule_description
                );
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{} ({})",
        "Relationships".cyan().bold(),
        graph.relationships.len()
    );
    for rel in &graph.relationships {
        let _ = writeln!(
            out,
            "  {} --{}--> {}",
            graph.model_name(rel.source_model_id).unwrap_or("Unknown"),
            rel.cardinality,
            graph.model_name(rel.target_model_id).unwrap_or("Unknown"),
        );
    }
    out
}
