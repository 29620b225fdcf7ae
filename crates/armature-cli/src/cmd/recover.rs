use crate::output::print_json;
use anyhow::Context;
use armature_core::{
    recovery::{self, RecoveryAction},
    state::ProjectState,
};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;
    let info = recovery::get_recovery_info(root, &mut state).context("failed to check recovery")?;

    if json {
        return print_json(&info);
    }

    let Some(info) = info else {
        println!("Nothing to recover: last session ended cleanly.");
        return Ok(());
    };

    println!(
        "Interrupted session {}: {} — {}",
        info.session.id, info.session.agent, info.session.task
    );
    let age = chrono::Utc::now() - info.session.started_at;
    println!(
        "Started: {} ({} minutes ago)",
        info.session.started_at.format("%Y-%m-%d %H:%M"),
        age.num_minutes()
    );

    if let Some(checkpoint) = &info.last_checkpoint {
        match &checkpoint.vcs_revision {
            Some(rev) => println!(
                "Last checkpoint: {} — {} (at {rev})",
                checkpoint.id, checkpoint.description
            ),
            None => println!(
                "Last checkpoint: {} — {}",
                checkpoint.id, checkpoint.description
            ),
        }
    } else {
        println!("Last checkpoint: none");
    }

    if !info.in_progress_features.is_empty() {
        println!("In progress:");
        for f in &info.in_progress_features {
            println!("  {} — {} ({}%)", f.id, f.name, f.progress);
        }
    }

    println!("Suggested actions:");
    for (i, action) in info.actions.iter().enumerate() {
        let line = match action {
            RecoveryAction::ResumeSession { session_id } => {
                format!("resume session {session_id} (armature session resume)")
            }
            RecoveryAction::RestoreCheckpoint { checkpoint_id } => {
                format!("restore checkpoint {checkpoint_id} (armature checkpoint restore {checkpoint_id})")
            }
            RecoveryAction::InspectInProgressFeatures => {
                "inspect in-progress features (armature feature list)".to_string()
            }
        };
        println!("  {}. {line}", i + 1);
    }
    Ok(())
}
