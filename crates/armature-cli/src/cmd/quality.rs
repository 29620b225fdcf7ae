use crate::output::print_json;
use anyhow::Context;
use armature_core::state::{ProjectState, SuiteStats, TestSuite, VulnerabilityCounts};
use clap::Subcommand;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum QualitySubcommand {
    /// Record test results for a suite (unit, integration, e2e)
    Tests {
        suite: String,
        #[arg(long)]
        total: u32,
        #[arg(long)]
        passing: u32,
        #[arg(long)]
        coverage: f64,
    },
    /// Record the current lint issue count
    Lint {
        #[arg(long)]
        issues: u32,
    },
    /// Record a security scan result
    Security {
        #[arg(long, default_value = "0")]
        critical: u32,
        #[arg(long, default_value = "0")]
        high: u32,
        #[arg(long, default_value = "0")]
        medium: u32,
        #[arg(long, default_value = "0")]
        low: u32,
    },
}

pub fn run(root: &Path, subcmd: QualitySubcommand, json: bool) -> anyhow::Result<()> {
    let mut state = ProjectState::load(root).context("failed to load state")?;

    match subcmd {
        QualitySubcommand::Tests {
            suite,
            total,
            passing,
            coverage,
        } => {
            let suite = TestSuite::from_str(&suite)
                .with_context(|| format!("unknown suite '{suite}' (unit, integration, e2e)"))?;
            state.record_test_results(
                suite,
                SuiteStats {
                    total,
                    passing,
                    coverage_percent: coverage,
                },
            );
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.quality.tests)?;
            } else {
                println!("Recorded {suite}: {passing}/{total} passing, {coverage:.1}% coverage");
            }
        }
        QualitySubcommand::Lint { issues } => {
            state.record_lint_results(issues);
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.quality.linting)?;
            } else {
                println!("Recorded {issues} lint issues");
            }
        }
        QualitySubcommand::Security {
            critical,
            high,
            medium,
            low,
        } => {
            state.record_security_scan(VulnerabilityCounts {
                critical,
                high,
                medium,
                low,
            });
            state.save(root).context("failed to save state")?;
            if json {
                print_json(&state.quality.security)?;
            } else {
                println!(
                    "Recorded scan: {critical} critical, {high} high, {medium} medium, {low} low"
                );
            }
        }
    }
    Ok(())
}
