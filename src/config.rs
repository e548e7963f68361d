use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for a session. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rooms_dir: PathBuf,
    pub user_store_path: PathBuf,
    pub progress_dir: PathBuf,
    /// Penalty hints a puzzle may give before a token is required.
    pub standard_hint_limit: usize,
    pub freeze_duration_secs: i64,
    pub solve_award_points: i64,
    pub starting_free_hint_tokens: u32,
    pub starting_freeze_charges: u32,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rooms_dir: PathBuf::from("rooms"),
            user_store_path: PathBuf::from("users.json"),
            progress_dir: PathBuf::from("."),
            standard_hint_limit: 3,
            freeze_duration_secs: 10,
            solve_award_points: 50,
            starting_free_hint_tokens: 1,
            starting_freeze_charges: 1,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: EngineConfig = toml::from_str("standard_hint_limit = 2\nseed = 7\n").unwrap();
        assert_eq!(config.standard_hint_limit, 2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.freeze_duration_secs, 10);
        assert_eq!(config.rooms_dir, PathBuf::from("rooms"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "solve_award_points = 75\nrooms_dir = \"floors/one\"\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.solve_award_points, 75);
        assert_eq!(config.rooms_dir, PathBuf::from("floors/one"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EngineConfig::load(&dir.path().join("nope.toml")).is_err());
    }
}
