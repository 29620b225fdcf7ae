use crate::error::{ArmatureError, Result};
use crate::paths;
use crate::state::ProjectState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

// ---------------------------------------------------------------------------
// CheckpointRef
// ---------------------------------------------------------------------------

/// Lightweight index entry kept in `ProjectState.checkpoints`. The index is
/// append-only and chronological; ids are never reused or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRef {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_revision: Option<String>,
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// A full snapshot record, one file per checkpoint under
/// `.armature/checkpoints/`. Immutable once written; the snapshot is an
/// independent deep copy that later mutation of live state cannot touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_revision: Option<String>,
    pub state_snapshot: ProjectState,
}

impl Checkpoint {
    /// Snapshot the current state with a best-effort VCS revision.
    pub fn create(root: &Path, state: &mut ProjectState, description: &str) -> Result<CheckpointRef> {
        let revision = crate::vcs::current_revision(root, crate::vcs::DEFAULT_TIMEOUT);
        Self::create_with_revision(root, state, description, revision)
    }

    /// Snapshot the current state. The snapshot is taken before the new
    /// index entry is appended, so a checkpoint does not contain a
    /// reference to itself. The id is derived from the index length,
    /// monotonic under single-writer use.
    pub fn create_with_revision(
        root: &Path,
        state: &mut ProjectState,
        description: &str,
        vcs_revision: Option<String>,
    ) -> Result<CheckpointRef> {
        let snapshot = state.clone();
        let id = format!("cp-{:03}", state.checkpoints.len() + 1);
        let timestamp = Utc::now();

        if vcs_revision.is_none() {
            debug!(checkpoint = %id, "no VCS revision captured");
        }

        let checkpoint = Checkpoint {
            id: id.clone(),
            timestamp,
            description: description.to_string(),
            vcs_revision: vcs_revision.clone(),
            state_snapshot: snapshot,
        };
        let path = paths::checkpoint_path(root, &id);
        let mut data = serde_json::to_string_pretty(&checkpoint)?;
        data.push('\n');
        crate::io::atomic_write(&path, data.as_bytes())?;

        let entry = CheckpointRef {
            id,
            timestamp,
            description: description.to_string(),
            vcs_revision,
        };
        state.checkpoints.push(entry.clone());
        state.save(root)?;
        Ok(entry)
    }

    /// Load a checkpoint's full record from its snapshot file.
    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let path = paths::checkpoint_path(root, id);
        if !path.exists() {
            return Err(ArmatureError::CheckpointNotFound(id.to_string()));
        }
        let data =
            std::fs::read_to_string(&path).map_err(|e| ArmatureError::io("read", &path, e))?;
        let checkpoint: Checkpoint = serde_json::from_str(&data)
            .map_err(|source| ArmatureError::CorruptState { path, source })?;
        Ok(checkpoint)
    }
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

/// Replace the live state with a copy of the named checkpoint's snapshot.
///
/// The append-only checkpoint index is carried over from the live state:
/// restoring never rolls back checkpoint history, it only rewinds the rest
/// of the document. VCS state is untouched; reverting the working tree is a
/// separate, caller-initiated concern.
pub fn restore(root: &Path, state: &mut ProjectState, id: &str) -> Result<()> {
    if !state.checkpoints.iter().any(|r| r.id == id) {
        return Err(ArmatureError::CheckpointNotFound(id.to_string()));
    }
    let checkpoint = Checkpoint::load(root, id)?;

    let index = std::mem::take(&mut state.checkpoints);
    *state = checkpoint.state_snapshot;
    state.checkpoints = index;
    state.save(root)
}

/// Restore the most recent checkpoint.
pub fn restore_latest(root: &Path, state: &mut ProjectState) -> Result<()> {
    let id = state
        .latest_checkpoint()
        .map(|r| r.id.clone())
        .ok_or_else(|| ArmatureError::CheckpointNotFound("latest".to_string()))?;
    restore(root, state, &id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
