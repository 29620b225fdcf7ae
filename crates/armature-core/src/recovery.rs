//! Interrupted-session detection.
//!
//! A session left `active` on disk means the process died without calling
//! `complete_session` — there is no shutdown hook to rely on, so the
//! reclassification to `interrupted` happens lazily, the first time anyone
//! asks.

use crate::checkpoint::CheckpointRef;
use crate::error::Result;
use crate::ledger::Feature;
use crate::session::SessionRecord;
use crate::state::ProjectState;
use crate::types::SessionStatus;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// RecoveryInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum RecoveryAction {
    ResumeSession { session_id: String },
    RestoreCheckpoint { checkpoint_id: String },
    InspectInProgressFeatures,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryInfo {
    pub session: SessionRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checkpoint: Option<CheckpointRef>,
    pub in_progress_features: Vec<Feature>,
    /// Suggested next steps, most specific first.
    pub actions: Vec<RecoveryAction>,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Return a recovery bundle when the last session did not end cleanly, or
/// None when there is nothing to recover.
///
/// The one side effect: a stale `active` session is rewritten to
/// `interrupted` and saved on first observation. Repeated calls return the
/// same bundle without touching the document again.
pub fn get_recovery_info(root: &Path, state: &mut ProjectState) -> Result<Option<RecoveryInfo>> {
    let status = match state.last_session.as_ref() {
        None => return Ok(None),
        Some(s) => s.status,
    };
    if status == SessionStatus::Complete {
        return Ok(None);
    }

    if status == SessionStatus::Active {
        if let Some(session) = state.last_session.as_mut() {
            warn!(session = %session.id, "previous session did not terminate cleanly");
            session.status = SessionStatus::Interrupted;
        }
        state.save(root)?;
    }

    let session = match state.last_session.clone() {
        Some(s) => s,
        None => return Ok(None),
    };
    let last_checkpoint = state.latest_checkpoint().cloned();
    let in_progress_features = state.development.features.in_progress.clone();

    let mut actions = vec![RecoveryAction::ResumeSession {
        session_id: session.id.clone(),
    }];
    if let Some(checkpoint) = &last_checkpoint {
        actions.push(RecoveryAction::RestoreCheckpoint {
            checkpoint_id: checkpoint.id.clone(),
        });
    }
    actions.push(RecoveryAction::InspectInProgressFeatures);

    Ok(Some(RecoveryInfo {
        session,
        last_checkpoint,
        in_progress_features,
        actions,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
