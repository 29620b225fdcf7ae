use crate::error::{ArmatureError, Result};
use crate::state::{AgentInvocation, ProjectState};
use crate::types::SessionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// The currently active (or last resolved) unit of agent work. At most one
/// record lives in `ProjectState.last_session`; interruption is inferred
/// lazily by the recovery advisor, never set here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub agent: String,
    pub task: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

// ---------------------------------------------------------------------------
// Session tracking
// ---------------------------------------------------------------------------

impl ProjectState {
    /// Begin a new unit of work. An unresolved active session is a caller
    /// error; an interrupted one has already been surfaced by recovery and
    /// may be superseded.
    pub fn start_session(&mut self, agent: &str, task: &str) -> Result<String> {
        if let Some(previous) = &self.last_session {
            if previous.status == SessionStatus::Active {
                return Err(ArmatureError::SessionAlreadyActive {
                    id: previous.id.clone(),
                });
            }
        }
        let id = format!("sess-{}", Uuid::new_v4());
        self.last_session = Some(SessionRecord {
            id: id.clone(),
            agent: agent.to_string(),
            task: task.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            status: SessionStatus::Active,
        });
        Ok(id)
    }

    /// Mark the active session complete and record the invocation in the
    /// agent history.
    pub fn complete_session(&mut self) -> Result<()> {
        let session = self.last_session.as_mut().ok_or(ArmatureError::NoSession)?;
        if session.status != SessionStatus::Active {
            return Err(ArmatureError::InvalidTransition {
                id: session.id.clone(),
                from: session.status.to_string(),
                to: SessionStatus::Complete.to_string(),
                reason: "only an active session can be completed".to_string(),
            });
        }
        let now = Utc::now();
        session.status = SessionStatus::Complete;
        session.completed_at = Some(now);

        let invocation = AgentInvocation {
            agent: session.agent.clone(),
            task: session.task.clone(),
            started_at: session.started_at,
            completed_at: now,
            outcome: "complete".to_string(),
        };
        self.record_invocation(invocation);
        Ok(())
    }

    /// Pick an interrupted session back up under its original id.
    pub fn resume_session(&mut self) -> Result<String> {
        let session = self.last_session.as_mut().ok_or(ArmatureError::NoSession)?;
        if session.status != SessionStatus::Interrupted {
            return Err(ArmatureError::InvalidTransition {
                id: session.id.clone(),
                from: session.status.to_string(),
                to: SessionStatus::Active.to_string(),
                reason: "only an interrupted session can be resumed".to_string(),
            });
        }
        session.status = SessionStatus::Active;
        Ok(session.id.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_complete() {
        let mut state = ProjectState::new("proj", "web");
        let id = state.start_session("backend-master", "implement auth").unwrap();
        let session = state.last_session.as_ref().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.completed_at.is_none());

        state.complete_session().unwrap();
        let session = state.last_session.as_ref().unwrap();
        assert_eq!(session.status, SessionStatus::Complete);
        assert!(session.completed_at.is_some());
    }

    #[test]
    fn complete_records_invocation_history() {
        let mut state = ProjectState::new("proj", "web");
        state.start_session("backend-master", "implement auth").unwrap();
        state.complete_session().unwrap();
        assert_eq!(state.agents.history.len(), 1);
        assert_eq!(state.agents.history[0].agent, "backend-master");
        assert_eq!(state.agents.history[0].outcome, "complete");
    }

    #[test]
    fn second_start_while_active_is_rejected() {
        let mut state = ProjectState::new("proj", "web");
        state.start_session("backend-master", "implement auth").unwrap();
        assert!(matches!(
            state.start_session("frontend-master", "build ui"),
            Err(ArmatureError::SessionAlreadyActive { .. })
        ));
    }

    #[test]
    fn start_after_complete_is_allowed() {
        let mut state = ProjectState::new("proj", "web");
        let first = state.start_session("a", "t1").unwrap();
        state.complete_session().unwrap();
        let second = state.start_session("b", "t2").unwrap();
        assert_ne!(first, second);
        assert_eq!(state.last_session.as_ref().unwrap().agent, "b");
    }

    #[test]
    fn start_supersedes_interrupted_session() {
        let mut state = ProjectState::new("proj", "web");
        state.start_session("a", "t1").unwrap();
        state.last_session.as_mut().unwrap().status = SessionStatus::Interrupted;
        state.start_session("b", "t2").unwrap();
        assert_eq!(
            state.last_session.as_ref().unwrap().status,
            SessionStatus::Active
        );
    }

    #[test]
    fn complete_without_session_fails() {
        let mut state = ProjectState::new("proj", "web");
        assert!(matches!(
            state.complete_session(),
            Err(ArmatureError::NoSession)
        ));
    }

    #[test]
    fn resume_flips_interrupted_back_to_active() {
        let mut state = ProjectState::new("proj", "web");
        let id = state.start_session("a", "t1").unwrap();
        state.last_session.as_mut().unwrap().status = SessionStatus::Interrupted;
        let resumed = state.resume_session().unwrap();
        assert_eq!(resumed, id);
        assert_eq!(
            state.last_session.as_ref().unwrap().status,
            SessionStatus::Active
        );
    }

    #[test]
    fn resume_requires_interrupted() {
        let mut state = ProjectState::new("proj", "web");
        state.start_session("a", "t1").unwrap();
        assert!(state.resume_session().is_err());
    }
}
