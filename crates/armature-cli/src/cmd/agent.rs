use crate::output::{print_json, print_table};
use anyhow::Context;
use armature_core::state::ProjectState;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum AgentSubcommand {
    /// Mark an agent as active (and available)
    Activate { name: String },
    /// Remove an agent from the active set
    Deactivate { name: String },
    /// List agents and recent invocations
    List,
}

pub fn run(root: &Path, subcmd: AgentSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AgentSubcommand::Activate { name } => {
            let mut state = ProjectState::load(root).context("failed to load state")?;
            state.activate_agent(&name);
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.agents.active)?;
            } else {
                println!("Activated {name}");
            }
            Ok(())
        }
        AgentSubcommand::Deactivate { name } => {
            let mut state = ProjectState::load(root).context("failed to load state")?;
            state.deactivate_agent(&name);
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.agents.active)?;
            } else {
                println!("Deactivated {name}");
            }
            Ok(())
        }
        AgentSubcommand::List => list(root, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;

    if json {
        return print_json(&state.agents);
    }

    if state.agents.available.is_empty() {
        println!("No agents registered.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = state
        .agents
        .available
        .iter()
        .map(|name| {
            vec![
                name.clone(),
                if state.agents.active.contains(name) {
                    "active".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect();
    print_table(&["AGENT", "STATUS"], rows);

    if !state.agents.history.is_empty() {
        println!("\nRecent invocations:");
        for inv in state.agents.history.iter().rev().take(5) {
            println!(
                "  {} — {} ({})",
                inv.agent,
                inv.task,
                inv.completed_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}
