//! Command execution

use crate::args::{Cli, Command, FieldCommand, ModelCommand, ProjectsCommand};
use crate::config::StudioConfig;
use crate::output;
use anyhow::{Context, Result, bail};
use blueprint_core::{Cardinality, DataType, ModelId, Position, ProjectId, find_by_name};
use blueprint_export::{ExportSummary, export_blueprint, write_blueprint};
use blueprint_ir::{AttachmentConfig, NewField, NewModel, ProjectGraph};
use blueprint_store::ProjectStore;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = StudioConfig::load(&cli.connection).context("Failed to load configuration")?;
    let service = config.connect()?;
    let mut store = ProjectStore::new(service, config.owner()?);
    debug!(owner = %store.owner(), "store ready");

    match cli.command {
        Command::Projects(command) => projects(&mut store, command).await,
        Command::Info { project } => {
            open(&mut store, &project).await?;
            let graph = current(&store)?;
            print!("{}", output::project_outline(graph));
            Ok(())
        }
        Command::Export { project, output } => export(&mut store, &project, output).await,
        Command::Model(ModelCommand::Add { project, name, x, y }) => {
            let project_id = open(&mut store, &project).await?;
            let model = store
                .create_model(&NewModel::library(project_id, name.trim()).at(Position::new(x, y)))
                .await
                .context("Failed to add model")?;
            output::success(format!("Added model {} ({})", model.name.bold(), model.id));
            Ok(())
        }
        Command::Field(FieldCommand::Add {
            project,
            model,
            name,
            data_type,
            required,
            unique,
            reusable,
        }) => {
            let options = FieldOptions {
                name,
                data_type,
                required,
                unique,
                reusable,
            };
            add_field(&mut store, &project, &model, options).await
        }
        Command::Relate {
            project,
            from,
            to,
            cardinality,
        } => relate(&mut store, &project, &from, &to, cardinality).await,
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Resolve a project by id or exact name
async fn resolve_project(store: &mut ProjectStore, key: &str) -> Result<ProjectId> {
    if let Ok(id) = key.parse::<Uuid>() {
        return Ok(id);
    }
    let projects = store.list_projects().await?;
    let matches: Vec<ProjectId> = find_by_name(projects, key).iter().map(|p| p.id).collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("Project not found: {key}"),
        _ => bail!("Several projects are named '{key}'; use the project id"),
    }
}

async fn open(store: &mut ProjectStore, key: &str) -> Result<ProjectId> {
    let id = resolve_project(store, key).await?;
    store
        .load_project(id)
        .await
        .with_context(|| format!("Failed to open project {key}"))?;
    Ok(id)
}

fn current(store: &ProjectStore) -> Result<&ProjectGraph> {
    store.current().context("No project loaded")
}

/// Resolve a model of the loaded project by id or exact name
fn resolve_model(graph: &ProjectGraph, key: &str) -> Result<ModelId> {
    if let Ok(id) = key.parse::<Uuid>() {
        if graph.model(id).is_some() {
            return Ok(id);
        }
    }
    let matches: Vec<ModelId> = find_by_name(&graph.models, key)
        .iter()
        .map(|m| m.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("Model not found in {}: {key}", graph.project.name),
        _ => bail!("Several models are named '{key}'; use the model id"),
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn projects(store: &mut ProjectStore, command: ProjectsCommand) -> Result<()> {
    match command {
        ProjectsCommand::List => {
            let projects = store.list_projects().await?;
            print!("{}", output::project_table(projects));
        }
        ProjectsCommand::Create { name, description } => {
            let project = store
                .create_project(&name, &description)
                .await
                .context("Failed to create project")?;
            output::success(format!("Created project {} ({})", project.name.bold(), project.id));
        }
        ProjectsCommand::Delete { project, yes } => {
            let id = resolve_project(store, &project).await?;
            if !yes {
                bail!("Refusing to delete project {project} without --yes");
            }
            store
                .delete_project(id)
                .await
                .context("Failed to delete project")?;
            output::success(format!("Deleted project {project}"));
        }
    }
    Ok(())
}

async fn export(store: &mut ProjectStore, project: &str, target: Option<PathBuf>) -> Result<()> {
    open(store, project).await?;
    let blueprint = export_blueprint(store.current())?;
    let target = target.unwrap_or_else(|| PathBuf::from("."));
    let path = write_blueprint(&blueprint, &target).await?;

    let bytes = blueprint.to_json_pretty()?.len();
    print!("{}", ExportSummary::new(&blueprint, bytes));
    output::success(format!("Wrote {}", path.display()));
    Ok(())
}

struct FieldOptions {
    name: String,
    data_type: DataType,
    required: bool,
    unique: bool,
    reusable: bool,
}

async fn add_field(
    store: &mut ProjectStore,
    project: &str,
    model: &str,
    options: FieldOptions,
) -> Result<()> {
    let project_id = open(store, project).await?;
    let model_id = resolve_model(current(store)?, model)?;

    let new_field = if options.reusable {
        NewField::reusable(project_id, options.name.trim(), options.data_type)
    } else {
        NewField::private(project_id, options.name.trim(), options.data_type)
    };
    let field = store
        .create_field(&new_field)
        .await
        .context("Failed to create field")?;
    let attachment = store
        .attach_field(
            model_id,
            field.id,
            AttachmentConfig::flags(options.required, options.unique),
        )
        .await
        .context("Failed to attach field")?;

    output::success(format!(
        "Added {} ({}) to {} at position {}",
        field.name.bold(),
        field.data_type,
        model,
        attachment.order_index
    ));
    Ok(())
}

async fn relate(
    store: &mut ProjectStore,
    project: &str,
    from: &str,
    to: &str,
    cardinality: Cardinality,
) -> Result<()> {
    open(store, project).await?;
    let graph = current(store)?;
    let source = resolve_model(graph, from)?;
    let target = resolve_model(graph, to)?;

    store
        .create_relationship(source, target, cardinality)
        .await
        .context("Failed to create relationship")?;
    output::success(format!("Related {from} --{cardinality}--> {to}"));
    Ok(())
}
