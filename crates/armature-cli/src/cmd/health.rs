use crate::output::print_json;
use anyhow::Context;
use armature_core::{health, state::ProjectState};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = ProjectState::load(root).context("failed to load state")?;
    let report = health::report(&state);

    if json {
        return print_json(&report);
    }

    println!("Health: {}/100", report.score);
    if report.deductions.is_empty() {
        println!("No deductions.");
    } else {
        for d in &report.deductions {
            println!("  -{:<5.1} {}", d.points, d.description);
        }
    }
    Ok(())
}
