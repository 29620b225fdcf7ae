use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Planning,
    Implementation,
    Testing,
    Release,
    Maintenance,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Setup,
            Phase::Planning,
            Phase::Implementation,
            Phase::Testing,
            Phase::Release,
            Phase::Maintenance,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Phase> {
        let all = Phase::all();
        let i = self.index();
        all.get(i + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Planning => "planning",
            Phase::Implementation => "implementation",
            Phase::Testing => "testing",
            Phase::Release => "release",
            Phase::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = crate::error::ArmatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Phase::Setup),
            "planning" => Ok(Phase::Planning),
            "implementation" => Ok(Phase::Implementation),
            "testing" => Ok(Phase::Testing),
            "release" => Ok(Phase::Release),
            "maintenance" => Ok(Phase::Maintenance),
            _ => Err(crate::error::ArmatureError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureStatus
// ---------------------------------------------------------------------------

/// Bucket membership in the feature ledger. The bucket a feature sits in IS
/// its status; the enum exists so callers can name buckets and transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    Planned,
    InProgress,
    Completed,
    Abandoned,
}

impl FeatureStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureStatus::Planned => "planned",
            FeatureStatus::InProgress => "in_progress",
            FeatureStatus::Completed => "completed",
            FeatureStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeatureStatus {
    type Err = crate::error::ArmatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(FeatureStatus::Planned),
            "in_progress" | "in-progress" => Ok(FeatureStatus::InProgress),
            "completed" => Ok(FeatureStatus::Completed),
            "abandoned" => Ok(FeatureStatus::Abandoned),
            _ => Err(crate::error::ArmatureError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Interrupted,
    Complete,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "active",
            SessionStatus::Interrupted => "interrupted",
            SessionStatus::Complete => "complete",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn phase_ordering() {
        assert!(Phase::Setup < Phase::Planning);
        assert!(Phase::Planning < Phase::Implementation);
        assert!(Phase::Maintenance > Phase::Testing);
    }

    #[test]
    fn phase_next() {
        assert_eq!(Phase::Setup.next(), Some(Phase::Planning));
        assert_eq!(Phase::Testing.next(), Some(Phase::Release));
        assert_eq!(Phase::Maintenance.next(), None);
    }

    #[test]
    fn phase_roundtrip() {
        for phase in Phase::all() {
            let s = phase.as_str();
            let parsed = Phase::from_str(s).unwrap();
            assert_eq!(*phase, parsed);
        }
    }

    #[test]
    fn phase_rejects_unknown() {
        assert!(Phase::from_str("shipping").is_err());
    }

    #[test]
    fn feature_status_roundtrip() {
        for status in [
            FeatureStatus::Planned,
            FeatureStatus::InProgress,
            FeatureStatus::Completed,
            FeatureStatus::Abandoned,
        ] {
            let parsed = FeatureStatus::from_str(status.as_str()).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn feature_status_accepts_hyphenated() {
        assert_eq!(
            FeatureStatus::from_str("in-progress").unwrap(),
            FeatureStatus::InProgress
        );
    }

    #[test]
    fn session_status_serde_names() {
        let json = serde_json::to_string(&SessionStatus::Interrupted).unwrap();
        assert_eq!(json, "\"interrupted\"");
    }
}
