use crate::output::{print_json, print_table};
use anyhow::Context;
use armature_core::{
    ledger::{Feature, FeatureUpdate},
    state::ProjectState,
    types::FeatureStatus,
};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum FeatureSubcommand {
    /// Add a new feature to the ledger
    Add {
        name: String,
        /// Agent responsible for the feature
        #[arg(long)]
        agent: Option<String>,
        /// Ids of features this one depends on (must already exist)
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
        /// Create directly in progress instead of planned
        #[arg(long)]
        start: bool,
    },
    /// List all features
    List,
    /// Show feature details
    Show { id: String },
    /// Move a planned feature into progress
    Start { id: String },
    /// Record progress on an in-progress feature
    Progress { id: String, percent: u8 },
    /// Complete an in-progress feature
    Complete {
        id: String,
        /// Test coverage achieved for the feature
        #[arg(long)]
        coverage: Option<f64>,
    },
    /// Abandon a feature, preserving its record
    Abandon { id: String },
}

pub fn run(root: &Path, subcmd: FeatureSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        FeatureSubcommand::Add {
            name,
            agent,
            depends_on,
            start,
        } => add(root, &name, agent, depends_on, start, json),
        FeatureSubcommand::List => list(root, json),
        FeatureSubcommand::Show { id } => show(root, &id, json),
        FeatureSubcommand::Start { id } => start(root, &id, json),
        FeatureSubcommand::Progress { id, percent } => progress(root, &id, percent, json),
        FeatureSubcommand::Complete { id, coverage } => complete(root, &id, coverage, json),
        FeatureSubcommand::Abandon { id } => abandon(root, &id, json),
    }
}

fn add(
    root: &Path,
    name: &str,
    agent: Option<String>,
    depends_on: Vec<String>,
    start: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let ledger = &mut state.development.features;

    let id = ledger.allocate_id();
    let mut feature = Feature::new(&id, name).with_dependencies(depends_on);
    if let Some(agent) = agent {
        feature = feature.with_agent(agent);
    }
    let bucket = if start {
        FeatureStatus::InProgress
    } else {
        FeatureStatus::Planned
    };
    ledger
        .add(feature, bucket)
        .with_context(|| format!("failed to add feature '{name}'"))?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "status": bucket.to_string() }))?;
    } else {
        println!("Added feature {id}: {name} ({bucket})");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;
    let ledger = &state.development.features;

    if json {
        let features: Vec<&Feature> = ledger.iter().collect();
        return print_json(&features);
    }

    if ledger.is_empty() {
        println!("No features yet. Run: armature feature add <name>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ledger
        .iter()
        .map(|f| {
            vec![
                f.id.clone(),
                f.status.to_string(),
                format!("{}%", f.progress),
                f.assigned_agent.clone().unwrap_or_default(),
                f.name.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "PROGRESS", "AGENT", "NAME"], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;
    let feature = state
        .development
        .features
        .get(id)
        .with_context(|| format!("feature '{id}' not found"))?;

    if json {
        return print_json(feature);
    }

    println!("Feature: {} — {}", feature.id, feature.name);
    println!("Status:   {}", feature.status);
    println!("Progress: {}%", feature.progress);
    if let Some(ref agent) = feature.assigned_agent {
        println!("Agent:    {agent}");
    }
    if !feature.dependencies.is_empty() {
        let deps: Vec<&str> = feature.dependencies.iter().map(String::as_str).collect();
        println!("Depends:  {}", deps.join(", "));
    }
    if let Some(coverage) = feature.tests_coverage_percent {
        println!("Coverage: {coverage:.1}%");
    }
    println!("Created:  {}", feature.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(completed) = feature.completed_at {
        println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

fn start(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    state
        .development
        .features
        .move_feature(id, FeatureStatus::Planned, FeatureStatus::InProgress)
        .with_context(|| format!("failed to start feature '{id}'"))?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "status": "in_progress" }))?;
    } else {
        println!("Started {id}");
    }
    Ok(())
}

fn progress(root: &Path, id: &str, percent: u8, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    state
        .development
        .features
        .update(
            id,
            FeatureUpdate {
                progress: Some(percent),
                ..Default::default()
            },
        )
        .with_context(|| format!("failed to update feature '{id}'"))?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "progress": percent.min(100) }))?;
    } else {
        println!("{id}: {}%", percent.min(100));
    }
    Ok(())
}

fn complete(root: &Path, id: &str, coverage: Option<f64>, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let ledger = &mut state.development.features;
    let from = ledger
        .get(id)
        .map(|f| f.status)
        .with_context(|| format!("feature '{id}' not found"))?;
    // Setting progress is part of the same logical transition; the move
    // guard still rejects completion from anywhere but in_progress.
    if from == FeatureStatus::InProgress {
        ledger
            .update(
                id,
                FeatureUpdate {
                    progress: Some(100),
                    tests_coverage_percent: coverage,
                    ..Default::default()
                },
            )
            .with_context(|| format!("failed to update feature '{id}'"))?;
    }
    ledger
        .move_feature(id, from, FeatureStatus::Completed)
        .with_context(|| format!("failed to complete feature '{id}'"))?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "status": "completed" }))?;
    } else {
        println!("Completed {id}");
    }
    Ok(())
}

fn abandon(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let ledger = &mut state.development.features;
    let from = ledger
        .get(id)
        .map(|f| f.status)
        .with_context(|| format!("feature '{id}' not found"))?;
    ledger
        .move_feature(id, from, FeatureStatus::Abandoned)
        .with_context(|| format!("failed to abandon feature '{id}'"))?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "status": "abandoned" }))?;
    } else {
        println!("Abandoned {id}");
    }
    Ok(())
}
