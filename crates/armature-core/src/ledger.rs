use crate::error::{ArmatureError, Result};
use crate::types::FeatureStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    /// Mirrors the bucket the feature sits in; kept in sync by the ledger.
    pub status: FeatureStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dependencies: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_coverage_percent: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Feature {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: FeatureStatus::Planned,
            progress: 0,
            assigned_agent: None,
            dependencies: BTreeSet::new(),
            tests_coverage_percent: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.assigned_agent = Some(agent.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update merged into an existing feature. Dependencies are fixed at
/// creation (no forward references keeps the graph acyclic by construction),
/// so they are deliberately not updatable here.
#[derive(Debug, Clone, Default)]
pub struct FeatureUpdate {
    pub name: Option<String>,
    pub progress: Option<u8>,
    pub assigned_agent: Option<String>,
    pub tests_coverage_percent: Option<f64>,
}

// ---------------------------------------------------------------------------
// FeatureLedger
// ---------------------------------------------------------------------------

/// The four status buckets. A feature lives in exactly one bucket; its id is
/// unique across all of them, and a feature is never physically deleted —
/// removal is a move to `abandoned`, preserving audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureLedger {
    pub completed: Vec<Feature>,
    pub in_progress: Vec<Feature>,
    pub planned: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abandoned: Vec<Feature>,
    #[serde(default = "first_seq")]
    next_seq: u32,
}

fn first_seq() -> u32 {
    1
}

impl Default for FeatureLedger {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            in_progress: Vec::new(),
            planned: Vec::new(),
            abandoned: Vec::new(),
            next_seq: first_seq(),
        }
    }
}

impl FeatureLedger {
    /// Allocate the next `feat-N` id. The counter is persisted and never
    /// reused, even across abandons.
    pub fn allocate_id(&mut self) -> String {
        let id = format!("feat-{}", self.next_seq);
        self.next_seq += 1;
        id
    }

    /// Insert a feature into `bucket`. Features are created `planned` or
    /// directly `in_progress`; every dependency must already exist in the
    /// ledger.
    pub fn add(&mut self, mut feature: Feature, bucket: FeatureStatus) -> Result<()> {
        if !matches!(bucket, FeatureStatus::Planned | FeatureStatus::InProgress) {
            return Err(ArmatureError::InvalidTransition {
                id: feature.id.clone(),
                from: "(new)".to_string(),
                to: bucket.to_string(),
                reason: "features are created planned or in_progress".to_string(),
            });
        }
        if self.get(&feature.id).is_some() {
            return Err(ArmatureError::DuplicateFeatureId(feature.id.clone()));
        }
        for dep in &feature.dependencies {
            if self.get(dep).is_none() {
                return Err(ArmatureError::InvalidDependency {
                    feature: feature.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        feature.status = bucket;
        self.bucket_mut(bucket).push(feature);
        Ok(())
    }

    /// Merge `update` into the feature with the given id.
    pub fn update(&mut self, id: &str, update: FeatureUpdate) -> Result<&Feature> {
        let feature = self
            .get_mut(id)
            .ok_or_else(|| ArmatureError::FeatureNotFound(id.to_string()))?;
        if let Some(name) = update.name {
            feature.name = name;
        }
        if let Some(progress) = update.progress {
            feature.progress = progress.min(100);
        }
        if let Some(agent) = update.assigned_agent {
            feature.assigned_agent = Some(agent);
        }
        if let Some(coverage) = update.tests_coverage_percent {
            feature.tests_coverage_percent = Some(coverage);
        }
        Ok(feature)
    }

    /// Atomically move a feature between buckets.
    ///
    /// Transitions follow `planned → in_progress → completed` with no
    /// skipping and no backward moves; `abandoned` is reachable from the two
    /// non-terminal buckets. Completing requires `progress == 100` — the
    /// caller sets it as part of the same logical transition, it is never
    /// silently corrected here.
    pub fn move_feature(&mut self, id: &str, from: FeatureStatus, to: FeatureStatus) -> Result<()> {
        let idx = self
            .bucket(from)
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| ArmatureError::FeatureNotFound(id.to_string()))?;

        Self::check_transition(&self.bucket(from)[idx], from, to)?;

        let mut feature = self.bucket_mut(from).remove(idx);
        feature.status = to;
        if to == FeatureStatus::Completed {
            feature.completed_at = Some(Utc::now());
        }
        self.bucket_mut(to).push(feature);
        Ok(())
    }

    fn check_transition(feature: &Feature, from: FeatureStatus, to: FeatureStatus) -> Result<()> {
        let reject = |reason: &str| {
            Err(ArmatureError::InvalidTransition {
                id: feature.id.clone(),
                from: from.to_string(),
                to: to.to_string(),
                reason: reason.to_string(),
            })
        };
        match (from, to) {
            (FeatureStatus::Planned, FeatureStatus::InProgress) => Ok(()),
            (FeatureStatus::InProgress, FeatureStatus::Completed) => {
                if feature.progress == 100 {
                    Ok(())
                } else {
                    reject("completion requires progress == 100")
                }
            }
            (FeatureStatus::Planned, FeatureStatus::Completed) => {
                reject("cannot skip in_progress")
            }
            (FeatureStatus::Planned | FeatureStatus::InProgress, FeatureStatus::Abandoned) => {
                Ok(())
            }
            (FeatureStatus::Completed | FeatureStatus::Abandoned, _) => {
                reject("terminal buckets cannot be left")
            }
            _ => reject("transitions are forward-only"),
        }
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn bucket(&self, status: FeatureStatus) -> &Vec<Feature> {
        match status {
            FeatureStatus::Completed => &self.completed,
            FeatureStatus::InProgress => &self.in_progress,
            FeatureStatus::Planned => &self.planned,
            FeatureStatus::Abandoned => &self.abandoned,
        }
    }

    fn bucket_mut(&mut self, status: FeatureStatus) -> &mut Vec<Feature> {
        match status {
            FeatureStatus::Completed => &mut self.completed,
            FeatureStatus::InProgress => &mut self.in_progress,
            FeatureStatus::Planned => &mut self.planned,
            FeatureStatus::Abandoned => &mut self.abandoned,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.completed
            .iter()
            .chain(self.in_progress.iter())
            .chain(self.planned.iter())
            .chain(self.abandoned.iter())
    }

    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.iter().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Feature> {
        self.completed
            .iter_mut()
            .chain(self.in_progress.iter_mut())
            .chain(self.planned.iter_mut())
            .chain(self.abandoned.iter_mut())
            .find(|f| f.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Completion ratio over the three live buckets (abandoned features are
    /// out of the denominator). None when the ledger has no live features.
    pub fn completion_ratio(&self) -> Option<f64> {
        let total = self.completed.len() + self.in_progress.len() + self.planned.len();
        if total == 0 {
            return None;
        }
        Some(self.completed.len() as f64 / total as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(ids: &[&str]) -> FeatureLedger {
        let mut ledger = FeatureLedger::default();
        for id in ids {
            ledger
                .add(Feature::new(*id, *id), FeatureStatus::Planned)
                .unwrap();
        }
        ledger
    }

    #[test]
    fn allocate_id_is_sequential() {
        let mut ledger = FeatureLedger::default();
        assert_eq!(ledger.allocate_id(), "feat-1");
        assert_eq!(ledger.allocate_id(), "feat-2");
    }

    #[test]
    fn duplicate_id_rejected_across_buckets() {
        let mut ledger = ledger_with(&["feat-1"]);
        let err = ledger
            .add(Feature::new("feat-1", "again"), FeatureStatus::InProgress)
            .unwrap_err();
        assert!(matches!(err, ArmatureError::DuplicateFeatureId(id) if id == "feat-1"));
    }

    #[test]
    fn unknown_dependency_rejected() {
        let mut ledger = ledger_with(&["feat-1"]);
        let feature = Feature::new("feat-2", "dependent").with_dependencies(["feat-9"]);
        let err = ledger.add(feature, FeatureStatus::Planned).unwrap_err();
        assert!(matches!(err, ArmatureError::InvalidDependency { .. }));
    }

    #[test]
    fn dependencies_on_existing_features_accepted() {
        let mut ledger = ledger_with(&["feat-1"]);
        let feature = Feature::new("feat-2", "dependent").with_dependencies(["feat-1"]);
        ledger.add(feature, FeatureStatus::Planned).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn cannot_create_directly_completed() {
        let mut ledger = FeatureLedger::default();
        let err = ledger
            .add(Feature::new("feat-1", "f"), FeatureStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, ArmatureError::InvalidTransition { .. }));
    }

    #[test]
    fn update_merges_fields() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .update(
                "feat-1",
                FeatureUpdate {
                    progress: Some(40),
                    assigned_agent: Some("backend-master".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let f = ledger.get("feat-1").unwrap();
        assert_eq!(f.progress, 40);
        assert_eq!(f.assigned_agent.as_deref(), Some("backend-master"));
        assert_eq!(f.name, "feat-1");
    }

    #[test]
    fn update_unknown_feature_fails() {
        let mut ledger = FeatureLedger::default();
        assert!(matches!(
            ledger.update("feat-9", FeatureUpdate::default()),
            Err(ArmatureError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn full_lifecycle() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::InProgress)
            .unwrap();
        ledger
            .update(
                "feat-1",
                FeatureUpdate {
                    progress: Some(100),
                    tests_coverage_percent: Some(87.5),
                    ..Default::default()
                },
            )
            .unwrap();
        ledger
            .move_feature("feat-1", FeatureStatus::InProgress, FeatureStatus::Completed)
            .unwrap();
        let f = ledger.get("feat-1").unwrap();
        assert_eq!(f.status, FeatureStatus::Completed);
        assert!(f.completed_at.is_some());
        assert!(ledger.in_progress.is_empty());
        assert_eq!(ledger.completed.len(), 1);
    }

    #[test]
    fn completion_requires_full_progress() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::InProgress)
            .unwrap();
        ledger
            .update(
                "feat-1",
                FeatureUpdate {
                    progress: Some(50),
                    ..Default::default()
                },
            )
            .unwrap();
        let err = ledger
            .move_feature("feat-1", FeatureStatus::InProgress, FeatureStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, ArmatureError::InvalidTransition { .. }));
        // The failed move left the feature where it was.
        assert_eq!(ledger.in_progress.len(), 1);
    }

    #[test]
    fn cannot_skip_in_progress() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .update(
                "feat-1",
                FeatureUpdate {
                    progress: Some(100),
                    ..Default::default()
                },
            )
            .unwrap();
        let err = ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, ArmatureError::InvalidTransition { .. }));
    }

    #[test]
    fn no_backward_moves() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::InProgress)
            .unwrap();
        assert!(ledger
            .move_feature("feat-1", FeatureStatus::InProgress, FeatureStatus::Planned)
            .is_err());
    }

    #[test]
    fn move_requires_presence_in_from_bucket() {
        let mut ledger = ledger_with(&["feat-1"]);
        // feat-1 is planned, not in_progress
        assert!(matches!(
            ledger.move_feature("feat-1", FeatureStatus::InProgress, FeatureStatus::Completed),
            Err(ArmatureError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn abandon_preserves_the_record() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::Abandoned)
            .unwrap();
        assert_eq!(ledger.abandoned.len(), 1);
        assert_eq!(ledger.len(), 1);
        // Abandoned ids stay reserved.
        assert!(matches!(
            ledger.add(Feature::new("feat-1", "resurrect"), FeatureStatus::Planned),
            Err(ArmatureError::DuplicateFeatureId(_))
        ));
    }

    #[test]
    fn terminal_buckets_cannot_be_left() {
        let mut ledger = ledger_with(&["feat-1"]);
        ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::Abandoned)
            .unwrap();
        assert!(ledger
            .move_feature("feat-1", FeatureStatus::Abandoned, FeatureStatus::Planned)
            .is_err());
    }

    #[test]
    fn id_unique_across_buckets_after_moves() {
        let mut ledger = ledger_with(&["feat-1", "feat-2"]);
        ledger
            .move_feature("feat-1", FeatureStatus::Planned, FeatureStatus::InProgress)
            .unwrap();
        let ids: Vec<&str> = ledger.iter().map(|f| f.id.as_str()).collect();
        let unique: std::collections::BTreeSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn completion_ratio_excludes_abandoned() {
        let mut ledger = ledger_with(&["feat-1", "feat-2"]);
        ledger
            .move_feature("feat-2", FeatureStatus::Planned, FeatureStatus::Abandoned)
            .unwrap();
        assert_eq!(ledger.completion_ratio(), Some(0.0));
        assert_eq!(FeatureLedger::default().completion_ratio(), None);
    }
}
