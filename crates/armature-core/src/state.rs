use crate::checkpoint::CheckpointRef;
use crate::error::{ArmatureError, Result};
use crate::ledger::FeatureLedger;
use crate::paths;
use crate::session::SessionRecord;
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// Schema version written into every new document. A document whose major
/// version differs fails to load as corrupt rather than being migrated.
pub const SCHEMA_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub project_type: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub tool_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Development {
    pub current_phase: Phase,
    pub phases_completed: Vec<Phase>,
    pub phases_remaining: Vec<Phase>,
    pub features: FeatureLedger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInvocation {
    pub agent: String,
    pub task: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub outcome: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Agents {
    pub active: BTreeSet<String>,
    pub available: BTreeSet<String>,
    pub history: Vec<AgentInvocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpServers {
    pub configured: Vec<ServerRef>,
    pub recommended: Vec<ServerRef>,
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSuite {
    Unit,
    Integration,
    E2e,
}

impl fmt::Display for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestSuite::Unit => "unit",
            TestSuite::Integration => "integration",
            TestSuite::E2e => "e2e",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TestSuite {
    type Err = ArmatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unit" => Ok(TestSuite::Unit),
            "integration" => Ok(TestSuite::Integration),
            "e2e" => Ok(TestSuite::E2e),
            _ => Err(ArmatureError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SuiteStats {
    pub total: u32,
    pub passing: u32,
    pub coverage_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestMatrix {
    pub unit: SuiteStats,
    pub integration: SuiteStats,
    pub e2e: SuiteStats,
}

impl TestMatrix {
    pub fn suite_mut(&mut self, suite: TestSuite) -> &mut SuiteStats {
        match suite {
            TestSuite::Unit => &mut self.unit,
            TestSuite::Integration => &mut self.integration,
            TestSuite::E2e => &mut self.e2e,
        }
    }

    pub fn suites(&self) -> [&SuiteStats; 3] {
        [&self.unit, &self.integration, &self.e2e]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linting {
    pub issue_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VulnerabilityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Security {
    pub vulnerabilities: VulnerabilityCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quality {
    pub tests: TestMatrix,
    pub linting: Linting,
    pub security: Security,
}

// ---------------------------------------------------------------------------
// ProjectState
// ---------------------------------------------------------------------------

/// The root aggregate: one document per project, persisted as pretty JSON
/// at `.armature/state.json`. All mutation funnels through `save()`, which
/// is the sole writer of the on-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub project: ProjectInfo,
    #[serde(default)]
    pub architecture: BTreeMap<String, String>,
    pub development: Development,
    #[serde(default)]
    pub agents: Agents,
    #[serde(default)]
    pub mcp_servers: McpServers,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session: Option<SessionRecord>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl ProjectState {
    pub fn new(name: impl Into<String>, project_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            project: ProjectInfo {
                name: name.into(),
                project_type: project_type.into(),
                created_at: now,
                last_updated_at: now,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            architecture: BTreeMap::new(),
            development: Development {
                current_phase: Phase::Setup,
                phases_completed: Vec::new(),
                phases_remaining: Phase::Setup.next().map_or_else(Vec::new, |first| {
                    Phase::all()[first.index()..].to_vec()
                }),
                features: FeatureLedger::default(),
            },
            agents: Agents::default(),
            mcp_servers: McpServers::default(),
            quality: Quality::default(),
            checkpoints: Vec::new(),
            last_session: None,
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the state document, or construct a fresh default when none
    /// exists yet. The default is not persisted; the first `save()`
    /// materializes the file. An unparseable or schema-incompatible
    /// document is corrupt and surfaced as such, never repaired.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        if !path.exists() {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string());
            return Ok(Self::new(name, "unknown"));
        }
        let data =
            std::fs::read_to_string(&path).map_err(|e| ArmatureError::io("read", &path, e))?;
        let state: ProjectState = serde_json::from_str(&data)
            .map_err(|source| ArmatureError::CorruptState { path, source })?;
        check_schema_version(&state.schema_version)?;
        Ok(state)
    }

    /// Serialize and atomically replace the on-disk document. Re-stamps
    /// `last_updated_at`, clamped so it never moves backwards even under
    /// clock skew. A failed write leaves the previous document intact.
    pub fn save(&mut self, root: &Path) -> Result<()> {
        let now = Utc::now();
        self.project.last_updated_at = self.project.last_updated_at.max(now);
        let path = paths::state_path(root);
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn set_architecture(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.architecture.insert(key.into(), value.into());
    }

    /// Complete the current phase and promote the next remaining one.
    /// Returns the new current phase, or None when nothing remains.
    pub fn advance_phase(&mut self) -> Option<Phase> {
        let dev = &mut self.development;
        if dev.phases_remaining.is_empty() {
            return None;
        }
        dev.phases_completed.push(dev.current_phase);
        dev.current_phase = dev.phases_remaining.remove(0);
        Some(dev.current_phase)
    }

    pub fn activate_agent(&mut self, name: &str) {
        self.agents.available.insert(name.to_string());
        self.agents.active.insert(name.to_string());
    }

    pub fn deactivate_agent(&mut self, name: &str) {
        self.agents.active.remove(name);
    }

    pub fn record_invocation(&mut self, invocation: AgentInvocation) {
        self.agents.history.push(invocation);
        // Trim history to last 200 entries
        if self.agents.history.len() > 200 {
            let excess = self.agents.history.len() - 200;
            self.agents.history.drain(..excess);
        }
    }

    pub fn add_configured_server(&mut self, server: ServerRef) {
        self.mcp_servers.configured.retain(|s| s.name != server.name);
        self.mcp_servers.configured.push(server);
    }

    pub fn recommend_server(&mut self, server: ServerRef) {
        self.mcp_servers.recommended.retain(|s| s.name != server.name);
        self.mcp_servers.recommended.push(server);
    }

    pub fn record_test_results(&mut self, suite: TestSuite, stats: SuiteStats) {
        *self.quality.tests.suite_mut(suite) = stats;
    }

    pub fn record_lint_results(&mut self, issue_count: u32) {
        self.quality.linting.issue_count = issue_count;
        self.quality.linting.last_run_at = Some(Utc::now());
    }

    pub fn record_security_scan(&mut self, vulnerabilities: VulnerabilityCounts) {
        self.quality.security.vulnerabilities = vulnerabilities;
        self.quality.security.last_scan_at = Some(Utc::now());
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    /// The index is chronological, so "latest" is simply the last entry.
    pub fn latest_checkpoint(&self) -> Option<&CheckpointRef> {
        self.checkpoints.last()
    }
}

fn check_schema_version(found: &str) -> Result<()> {
    let expected = major_of(SCHEMA_VERSION).unwrap_or(1);
    match major_of(found) {
        Some(major) if major == expected => Ok(()),
        _ => Err(ArmatureError::SchemaVersionMismatch {
            found: found.to_string(),
            expected,
        }),
    }
}

fn major_of(version: &str) -> Option<u64> {
    version.split('.').next()?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
