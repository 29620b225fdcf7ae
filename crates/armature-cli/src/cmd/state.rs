use crate::output::print_json;
use anyhow::Context;
use armature_core::{health, state::ProjectState};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;

    if json {
        // The document is the canonical machine-readable form.
        return print_json(&state);
    }

    let ledger = &state.development.features;
    println!("Project: {} ({})", state.project.name, state.project.project_type);
    println!("Phase:   {}", state.development.current_phase);
    println!(
        "Features: {} completed, {} in progress, {} planned",
        ledger.completed.len(),
        ledger.in_progress.len(),
        ledger.planned.len()
    );
    if !ledger.abandoned.is_empty() {
        println!("Abandoned: {}", ledger.abandoned.len());
    }
    println!("Checkpoints: {}", state.checkpoints.len());
    if let Some(checkpoint) = state.latest_checkpoint() {
        println!(
            "Latest checkpoint: {} — {} ({})",
            checkpoint.id,
            checkpoint.description,
            checkpoint.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    match &state.last_session {
        Some(session) => println!(
            "Session: {} — {} / {}",
            session.status, session.agent, session.task
        ),
        None => println!("Session: none"),
    }
    println!("Health: {}", health::score(&state));
    Ok(())
}
