use crate::output::print_json;
use anyhow::Context;
use armature_core::state::ProjectState;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum PhaseSubcommand {
    /// Show the current phase and the remaining sequence
    Show,
    /// Complete the current phase and move to the next one
    Advance,
}

pub fn run(root: &Path, subcmd: PhaseSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PhaseSubcommand::Show => show(root, json),
        PhaseSubcommand::Advance => advance(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;
    let dev = &state.development;

    if json {
        return print_json(&serde_json::json!({
            "current": dev.current_phase,
            "completed": dev.phases_completed,
            "remaining": dev.phases_remaining,
        }));
    }

    println!("Current: {}", dev.current_phase);
    if !dev.phases_completed.is_empty() {
        let done: Vec<String> = dev.phases_completed.iter().map(|p| p.to_string()).collect();
        println!("Completed: {}", done.join(", "));
    }
    if !dev.phases_remaining.is_empty() {
        let rest: Vec<String> = dev.phases_remaining.iter().map(|p| p.to_string()).collect();
        println!("Remaining: {}", rest.join(", "));
    }
    Ok(())
}

fn advance(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let next = state.advance_phase();
    state.save(root).context("failed to save state")?;

    match next {
        Some(phase) => {
            if json {
                print_json(&serde_json::json!({ "current": phase }))?;
            } else {
                println!("Now in phase: {phase}");
            }
        }
        None => {
            if json {
                print_json(&serde_json::json!({ "current": state.development.current_phase }))?;
            } else {
                println!("All phases complete.");
            }
        }
    }
    Ok(())
}
