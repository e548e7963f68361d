//! The user store: every account and its aggregated history.
//!
//! The engine only depends on [`UserStore`]. [`JsonUserStore`] is the
//! implementation used by default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use crate::player::{Item, Player, PuzzleProgress};
use crate::score::Score;

pub const RECORD_VERSION: u32 = 1;

fn default_version() -> u32 {
    RECORD_VERSION
}

/// Everything persisted about one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub guest: bool,
    #[serde(default)]
    pub score: ScoreRecord,
    #[serde(default)]
    pub free_hint_tokens: u32,
    #[serde(default)]
    pub freeze_charges: u32,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub progress_history: Vec<PuzzleProgress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub points: u64,
    pub puzzles_solved: u64,
    pub hints_used: u64,
    pub time_taken: u64,
}

impl From<&Score> for ScoreRecord {
    fn from(score: &Score) -> Self {
        Self {
            points: score.points(),
            puzzles_solved: score.puzzles_solved(),
            hints_used: score.hints_used(),
            time_taken: score.time_taken(),
        }
    }
}

impl From<&ScoreRecord> for Score {
    fn from(record: &ScoreRecord) -> Self {
        let clamp = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        Score::new(
            clamp(record.points),
            clamp(record.puzzles_solved),
            clamp(record.hints_used),
            clamp(record.time_taken),
        )
    }
}

impl From<&Player> for UserRecord {
    fn from(player: &Player) -> Self {
        Self {
            version: RECORD_VERSION,
            id: player.id,
            username: player.username.clone(),
            email: player.email.clone(),
            password_hash: player.password_hash.clone(),
            guest: player.guest,
            score: ScoreRecord::from(&player.score),
            free_hint_tokens: player.free_hint_tokens,
            freeze_charges: player.freeze_charges,
            inventory: player.inventory.clone(),
            progress_history: player.history.values().cloned().collect(),
        }
    }
}

impl From<UserRecord> for Player {
    fn from(record: UserRecord) -> Self {
        let mut score = Score::from(&record.score);
        score.set_free_hint_tokens(record.free_hint_tokens as i64);
        Player {
            id: record.id,
            username: record.username,
            email: record.email,
            password_hash: record.password_hash,
            guest: record.guest,
            inventory: record.inventory,
            history: record
                .progress_history
                .into_iter()
                .map(|entry| (entry.puzzle_id, entry))
                .collect(),
            score,
            free_hint_tokens: record.free_hint_tokens,
            freeze_charges: record.freeze_charges,
            freeze_until: None,
        }
    }
}

pub trait UserStore: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<UserRecord>>;
    fn save(&self, path: &Path, records: &[UserRecord]) -> Result<()>;
}

/// Pretty-printed JSON array of [`UserRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonUserStore;

impl UserStore for JsonUserStore {
    fn load(&self, path: &Path) -> Result<Vec<UserRecord>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records = serde_json::from_str(&content)
            .with_context(|| format!("parsing user store {}", path.display()))?;
        Ok(records)
    }

    fn save(&self, path: &Path, records: &[UserRecord]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(records)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(path)
            .with_context(|| format!("writing user store {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleStatus;
    use chrono::{TimeZone, Utc};

    fn sample_player() -> Player {
        let mut player = Player::new("Ada", "ada@example.com", "secret");
        player.score_mut().set_points(150);
        player.score_mut().set_puzzles_solved(2);
        player.grant_free_hint_tokens(3);
        player.grant_freeze_charges(1);
        player.add_item(Item::new("key-1", "Brass Key"));
        player.record_progress(PuzzleProgress {
            puzzle_id: 10,
            question: "What has keys?".into(),
            answer: "piano".into(),
            status: PuzzleStatus::Solved,
            last_updated: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            hints_used: vec!["It makes music".into()],
            free_hints: 0,
        });
        player
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = JsonUserStore;
        let record = UserRecord::from(&sample_player());

        store.save(&path, std::slice::from_ref(&record)).unwrap();
        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn player_survives_record_conversion() {
        let player = sample_player();
        let restored = Player::from(UserRecord::from(&player));
        assert_eq!(restored.id(), player.id());
        assert_eq!(restored.score().points(), 150);
        assert_eq!(restored.free_hint_tokens(), 3);
        assert_eq!(restored.progress_for(10).unwrap().hints_used.len(), 1);
        assert!(restored.check_password("secret"));
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = JsonUserStore.load(&dir.path().join("none.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn minimal_record_uses_defaults() {
        let json = r#"[{"username": "old", "passwordHash": "abc"}]"#;
        let records: Vec<UserRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].version, RECORD_VERSION);
        assert_eq!(records[0].score, ScoreRecord::default());
        assert!(records[0].progress_history.is_empty());
    }

    #[test]
    fn corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonUserStore.load(&path).is_err());
    }
}
