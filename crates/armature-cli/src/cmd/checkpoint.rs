use crate::output::{print_json, print_table};
use anyhow::Context;
use armature_core::{
    checkpoint::{self, Checkpoint},
    config::Config,
    state::ProjectState,
    vcs,
};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum CheckpointSubcommand {
    /// Snapshot the current project state
    Create { description: String },
    /// List checkpoints in chronological order
    List,
    /// Replace the live state with a checkpoint's snapshot
    Restore {
        /// Checkpoint id, e.g. cp-003 (omit with --latest)
        id: Option<String>,
        /// Restore the most recent checkpoint
        #[arg(long)]
        latest: bool,
    },
}

pub fn run(root: &Path, subcmd: CheckpointSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CheckpointSubcommand::Create { description } => create(root, &description, json),
        CheckpointSubcommand::List => list(root, json),
        CheckpointSubcommand::Restore { id, latest } => restore(root, id.as_deref(), latest, json),
    }
}

fn create(root: &Path, description: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let mut state = ProjectState::load(root).context("failed to load state")?;

    let revision = if config.vcs.capture_revision {
        vcs::current_revision(root, config.vcs.timeout())
    } else {
        None
    };
    let entry = Checkpoint::create_with_revision(root, &mut state, description, revision)
        .context("failed to create checkpoint")?;

    if json {
        print_json(&entry)?;
    } else {
        match &entry.vcs_revision {
            Some(rev) => println!("Created {} at {rev}: {description}", entry.id),
            None => println!("Created {}: {description}", entry.id),
        }
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;

    if json {
        return print_json(&state.checkpoints);
    }

    if state.checkpoints.is_empty() {
        println!("No checkpoints yet. Run: armature checkpoint create <description>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = state
        .checkpoints
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                r.vcs_revision
                    .as_deref()
                    .map(|rev| rev.chars().take(10).collect())
                    .unwrap_or_default(),
                r.description.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "TIMESTAMP", "REVISION", "DESCRIPTION"], rows);
    Ok(())
}

fn restore(root: &Path, id: Option<&str>, latest: bool, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;

    let restored_id = match (id, latest) {
        (Some(id), false) => {
            checkpoint::restore(root, &mut state, id)
                .with_context(|| format!("failed to restore '{id}'"))?;
            id.to_string()
        }
        (None, true) => {
            let id = state
                .latest_checkpoint()
                .map(|r| r.id.clone())
                .context("no checkpoints to restore")?;
            checkpoint::restore_latest(root, &mut state).context("failed to restore latest")?;
            id
        }
        _ => anyhow::bail!("pass a checkpoint id or --latest"),
    };

    if json {
        print_json(&serde_json::json!({ "restored": restored_id }))?;
    } else {
        println!("Restored {restored_id}");
        println!("Note: the working tree is untouched; check out the recorded revision yourself if needed.");
    }
    Ok(())
}
