//! Project health scoring.
//!
//! A deterministic function of `ProjectState` and a caller-supplied clock.
//! The weights are part of the tool's observable behavior: changing them
//! changes every report users compare across runs, so they stay fixed here.

use crate::state::ProjectState;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Coverage below this average starts costing points.
const COVERAGE_TARGET: f64 = 80.0;
/// A checkpoint older than this (or none at all) costs points.
const CHECKPOINT_MAX_AGE_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Deduction {
    pub points: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub score: u8,
    pub deductions: Vec<Deduction>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

pub fn score(state: &ProjectState) -> u8 {
    score_at(state, Utc::now())
}

pub fn score_at(state: &ProjectState, now: DateTime<Utc>) -> u8 {
    report_at(state, now).score
}

pub fn report(state: &ProjectState) -> HealthReport {
    report_at(state, Utc::now())
}

/// Compute the health score with an itemized breakdown.
///
/// Starts at 100 and applies, in order: average test coverage across the
/// three suites (an empty suite counts as 0% — untested areas must not be
/// invisible), weighted vulnerabilities, capped lint issues, feature
/// completion ratio, and checkpoint recency. The result is clamped to
/// [0, 100] and truncated.
pub fn report_at(state: &ProjectState, now: DateTime<Utc>) -> HealthReport {
    let mut deductions = Vec::new();

    let avg_coverage = state
        .quality
        .tests
        .suites()
        .iter()
        .map(|s| if s.total == 0 { 0.0 } else { s.coverage_percent })
        .sum::<f64>()
        / 3.0;
    if avg_coverage < COVERAGE_TARGET {
        deductions.push(Deduction {
            points: (COVERAGE_TARGET - avg_coverage) / 4.0,
            description: format!("average test coverage {avg_coverage:.1}% is below {COVERAGE_TARGET:.0}%"),
        });
    }

    let vulns = &state.quality.security.vulnerabilities;
    let vuln_points = f64::from(vulns.critical) * 10.0
        + f64::from(vulns.high) * 5.0
        + f64::from(vulns.medium) * 2.0;
    if vuln_points > 0.0 {
        deductions.push(Deduction {
            points: vuln_points,
            description: format!(
                "open vulnerabilities: {} critical, {} high, {} medium",
                vulns.critical, vulns.high, vulns.medium
            ),
        });
    }

    let lint_points = (f64::from(state.quality.linting.issue_count) / 2.0).min(10.0);
    if lint_points > 0.0 {
        deductions.push(Deduction {
            points: lint_points,
            description: format!("{} lint issues", state.quality.linting.issue_count),
        });
    }

    if let Some(ratio) = state.development.features.completion_ratio() {
        if ratio < 0.5 {
            deductions.push(Deduction {
                points: 10.0,
                description: format!("only {:.0}% of features completed", ratio * 100.0),
            });
        }
    }

    let checkpoint_stale = match state.latest_checkpoint() {
        None => true,
        Some(r) => now - r.timestamp > Duration::hours(CHECKPOINT_MAX_AGE_HOURS),
    };
    if checkpoint_stale {
        deductions.push(Deduction {
            points: 5.0,
            description: "no checkpoint in the last 24 hours".to_string(),
        });
    }

    let raw = 100.0 - deductions.iter().map(|d| d.points).sum::<f64>();
    HealthReport {
        score: raw.clamp(0.0, 100.0) as u8,
        deductions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointRef;
    use crate::ledger::Feature;
    use crate::state::{SuiteStats, TestSuite};
    use crate::types::FeatureStatus;

    fn fresh() -> ProjectState {
        ProjectState::new("proj", "web")
    }

    fn full_coverage(state: &mut ProjectState) {
        for suite in [TestSuite::Unit, TestSuite::Integration, TestSuite::E2e] {
            state.record_test_results(
                suite,
                SuiteStats {
                    total: 10,
                    passing: 10,
                    coverage_percent: 90.0,
                },
            );
        }
    }

    fn recent_checkpoint(state: &mut ProjectState, now: DateTime<Utc>) {
        state.checkpoints.push(CheckpointRef {
            id: "cp-001".to_string(),
            timestamp: now - Duration::hours(1),
            description: "recent".to_string(),
            vcs_revision: None,
        });
    }

    #[test]
    fn fresh_project_scores_75() {
        // 100 − 20 (zero coverage) − 5 (no checkpoint)
        assert_eq!(score_at(&fresh(), Utc::now()), 75);
    }

    #[test]
    fn healthy_project_scores_100() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        assert_eq!(score_at(&state, now), 100);
    }

    #[test]
    fn empty_suite_counts_as_zero_coverage() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        // Wipe e2e: average becomes 60, deduction (80−60)/4 = 5.
        state.record_test_results(TestSuite::E2e, SuiteStats::default());
        assert_eq!(score_at(&state, now), 95);
        // Claimed coverage on an empty suite does not count either.
        state.record_test_results(
            TestSuite::E2e,
            SuiteStats {
                total: 0,
                passing: 0,
                coverage_percent: 90.0,
            },
        );
        assert_eq!(score_at(&state, now), 95);
    }

    #[test]
    fn one_critical_vulnerability_costs_exactly_10() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        let before = score_at(&state, now);
        state.quality.security.vulnerabilities.critical = 1;
        assert_eq!(score_at(&state, now), before - 10);
    }

    #[test]
    fn vulnerability_weights() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        state.quality.security.vulnerabilities.high = 2;
        state.quality.security.vulnerabilities.medium = 3;
        state.quality.security.vulnerabilities.low = 50;
        // 2×5 + 3×2 = 16; low findings never count.
        assert_eq!(score_at(&state, now), 84);
    }

    #[test]
    fn lint_contribution_is_capped() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        state.quality.linting.issue_count = 6;
        assert_eq!(score_at(&state, now), 97);
        state.quality.linting.issue_count = 500;
        assert_eq!(score_at(&state, now), 90);
    }

    #[test]
    fn low_completion_ratio_costs_10() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        let ledger = &mut state.development.features;
        ledger
            .add(Feature::new("feat-1", "a"), FeatureStatus::Planned)
            .unwrap();
        ledger
            .add(Feature::new("feat-2", "b"), FeatureStatus::Planned)
            .unwrap();
        assert_eq!(score_at(&state, now), 90);
    }

    #[test]
    fn no_features_means_no_completion_penalty() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        recent_checkpoint(&mut state, now);
        assert_eq!(score_at(&state, now), 100);
    }

    #[test]
    fn stale_checkpoint_costs_5() {
        let now = Utc::now();
        let mut state = fresh();
        full_coverage(&mut state);
        state.checkpoints.push(CheckpointRef {
            id: "cp-001".to_string(),
            timestamp: now - Duration::hours(25),
            description: "old".to_string(),
            vcs_revision: None,
        });
        assert_eq!(score_at(&state, now), 95);
    }

    #[test]
    fn improving_coverage_never_lowers_the_score() {
        let now = Utc::now();
        let mut state = fresh();
        recent_checkpoint(&mut state, now);
        for suite in [TestSuite::Unit, TestSuite::Integration, TestSuite::E2e] {
            state.record_test_results(
                suite,
                SuiteStats {
                    total: 10,
                    passing: 8,
                    coverage_percent: 40.0,
                },
            );
        }
        let low = score_at(&state, now);
        for suite in [TestSuite::Unit, TestSuite::Integration, TestSuite::E2e] {
            state.record_test_results(
                suite,
                SuiteStats {
                    total: 10,
                    passing: 10,
                    coverage_percent: 90.0,
                },
            );
        }
        assert!(score_at(&state, now) >= low);
    }

    #[test]
    fn score_is_clamped_to_zero() {
        let now = Utc::now();
        let mut state = fresh();
        state.quality.security.vulnerabilities.critical = 20;
        assert_eq!(score_at(&state, now), 0);
    }

    #[test]
    fn report_itemizes_deductions() {
        let now = Utc::now();
        let state = fresh();
        let report = report_at(&state, now);
        assert_eq!(report.score, 75);
        assert_eq!(report.deductions.len(), 2);
        let total: f64 = report.deductions.iter().map(|d| d.points).sum();
        assert_eq!(total, 25.0);
    }
}
