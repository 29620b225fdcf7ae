use crate::error::{ArmatureError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_project_type")]
    pub project_type: String,
}

fn default_project_type() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Capture the current commit hash in checkpoints.
    #[serde(default = "default_true")]
    pub capture_revision: bool,
    /// Upper bound on the revision lookup; past it the checkpoint proceeds
    /// without a revision.
    #[serde(default = "default_vcs_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_vcs_timeout_ms() -> u64 {
    2000
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            capture_revision: default_true(),
            timeout_ms: default_vcs_timeout_ms(),
        }
    }
}

impl VcsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default)]
    pub vcs: VcsConfig,
}

impl Config {
    pub fn new(name: impl Into<String>, project_type: impl Into<String>) -> Self {
        Self {
            project: ProjectConfig {
                name: name.into(),
                project_type: project_type.into(),
            },
            vcs: VcsConfig::default(),
        }
    }

    /// Load `.armature/config.yaml`, falling back to defaults named after
    /// the root directory when the file does not exist yet.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string());
            return Ok(Self::new(name, "unknown"));
        }
        let data =
            std::fs::read_to_string(&path).map_err(|e| ArmatureError::io("read", &path, e))?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new("my-app", "web");
        config.vcs.capture_revision = false;
        config.save(dir.path()).unwrap();

        let loaded = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.project.name, "my-app");
        assert!(!loaded.vcs.capture_revision);
        assert_eq!(loaded.vcs.timeout_ms, 2000);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.project.project_type, "unknown");
        assert!(config.vcs.capture_revision);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".armature")).unwrap();
        std::fs::write(
            dir.path().join(".armature/config.yaml"),
            "project:\n  name: partial\n",
        )
        .unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.project.name, "partial");
        assert_eq!(config.project.project_type, "unknown");
        assert_eq!(config.vcs.timeout_ms, 2000);
    }
}
