use crate::output::print_json;
use anyhow::Context;
use armature_core::state::ProjectState;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Begin a new unit of agent work
    Start {
        #[arg(long)]
        agent: String,
        #[arg(long)]
        task: String,
    },
    /// Mark the active session complete
    Complete,
    /// Resume an interrupted session under its original id
    Resume,
    /// Show the last session
    Show,
}

pub fn run(root: &Path, subcmd: SessionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SessionSubcommand::Start { agent, task } => start(root, &agent, &task, json),
        SessionSubcommand::Complete => complete(root, json),
        SessionSubcommand::Resume => resume(root, json),
        SessionSubcommand::Show => show(root, json),
    }
}

fn start(root: &Path, agent: &str, task: &str, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let id = state
        .start_session(agent, task)
        .context("failed to start session")?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id, "agent": agent, "task": task }))?;
    } else {
        println!("Started session {id}: {agent} — {task}");
    }
    Ok(())
}

fn complete(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    state.complete_session().context("failed to complete session")?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&state.last_session)?;
    } else {
        println!("Session complete");
    }
    Ok(())
}

fn resume(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let id = state.resume_session().context("failed to resume session")?;
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("Resumed session {id}");
    }
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;

    if json {
        return print_json(&state.last_session);
    }

    match &state.last_session {
        None => println!("No sessions recorded."),
        Some(session) => {
            println!("Session: {}", session.id);
            println!("Status:  {}", session.status);
            println!("Agent:   {}", session.agent);
            println!("Task:    {}", session.task);
            println!("Started: {}", session.started_at.format("%Y-%m-%d %H:%M"));
            if let Some(completed) = session.completed_at {
                println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
            }
        }
    }
    Ok(())
}
