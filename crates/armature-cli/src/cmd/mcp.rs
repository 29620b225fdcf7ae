use crate::output::{print_json, print_table};
use anyhow::Context;
use armature_core::state::{ProjectState, ServerRef};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum McpSubcommand {
    /// Record a configured MCP server
    Add {
        name: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Record a recommended (not yet configured) MCP server
    Recommend {
        name: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// List configured and recommended servers
    List,
}

pub fn run(root: &Path, subcmd: McpSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        McpSubcommand::Add { name, note } => {
            let mut state = ProjectState::load(root).context("failed to load state")?;
            state.add_configured_server(ServerRef { name: name.clone(), note });
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.mcp_servers.configured)?;
            } else {
                println!("Configured {name}");
            }
            Ok(())
        }
        McpSubcommand::Recommend { name, note } => {
            let mut state = ProjectState::load(root).context("failed to load state")?;
            state.recommend_server(ServerRef { name: name.clone(), note });
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.mcp_servers.recommended)?;
            } else {
                println!("Recommended {name}");
            }
            Ok(())
        }
        McpSubcommand::List => list(root, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;

    if json {
        return print_json(&state.mcp_servers);
    }

    if state.mcp_servers.configured.is_empty() && state.mcp_servers.recommended.is_empty() {
        println!("No MCP servers recorded.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = state
        .mcp_servers
        .configured
        .iter()
        .map(|s| (s, "configured"))
        .chain(state.mcp_servers.recommended.iter().map(|s| (s, "recommended")))
        .map(|(s, kind)| {
            vec![
                s.name.clone(),
                kind.to_string(),
                s.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["SERVER", "KIND", "NOTE"], rows);
    Ok(())
}
