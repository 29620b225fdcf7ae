use anyhow::Context;
use armature_core::{config::Config, io, paths, state::ProjectState};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, project_type: Option<&str>) -> anyhow::Result<()> {
    let name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string()),
    };
    paths::validate_slug(&name).context("project name must be a slug, e.g. my-app")?;
    let project_type = project_type.unwrap_or("unknown");

    io::ensure_dir(&paths::armature_dir(root))?;
    io::ensure_dir(&paths::checkpoints_dir(root))?;
    // Snapshot files are derived data; keep them out of version control.
    io::ensure_gitignore_entry(root, ".armature/checkpoints/")?;

    if !paths::config_path(root).exists() {
        Config::new(&name, project_type)
            .save(root)
            .context("failed to write config")?;
    }

    if paths::state_path(root).exists() {
        println!("Already initialized: {}", paths::state_path(root).display());
        return Ok(());
    }

    let mut state = ProjectState::new(&name, project_type);
    state.save(root).context("failed to write state")?;

    println!("Initialized armature for '{name}' in {}", root.display());
    println!("Next: armature feature add <name>");
    Ok(())
}
