//! Per-player session state and its `key=value` progress file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::EngineError;
use crate::score::Score;

pub const DEFAULT_PROGRESS_FILE: &str = "progress.txt";
/// Joins the session hint pool on one line. Hint text containing this
/// sequence will not survive a round trip.
pub const HINT_DELIMITER: &str = " ||";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    player_id: Option<Uuid>,
    current_room: usize,
    /// Milliseconds.
    timer: u64,
    completed: bool,
    score: Score,
    available_hints: Vec<String>,
    hints_used: u32,
    hints_remaining: u32,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

fn millis_precision(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap_or(time)
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.timestamp_millis().to_string())
        .unwrap_or_default()
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_player(player_id: Uuid) -> Self {
        Self {
            player_id: Some(player_id),
            ..Self::default()
        }
    }

    /// `progress-<id>.txt`, or [`DEFAULT_PROGRESS_FILE`] when unbound.
    pub fn file_name(&self) -> String {
        match self.player_id {
            Some(id) => format!("progress-{id}.txt"),
            None => DEFAULT_PROGRESS_FILE.to_string(),
        }
    }

    pub fn file_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.start_time = Some(millis_precision(now));
        self.end_time = None;
        self.completed = false;
    }

    pub fn add_elapsed(&mut self, millis: u64) {
        self.timer = self.timer.saturating_add(millis);
        self.score.set_time_taken((self.timer / 1000) as i64);
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer / 1000
    }

    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.end_time = Some(millis_precision(now));
        self.score.set_time_taken((self.timer / 1000) as i64);
    }

    /// Replace the session hint pool; counters restart.
    pub fn set_available_hints(&mut self, hints: Vec<String>) {
        self.hints_remaining = hints.len() as u32;
        self.hints_used = 0;
        self.available_hints = hints;
    }

    /// Copy a puzzle's pool and usage into the session-level counters.
    pub fn mirror_hints(&mut self, hints: Vec<String>, used: usize) {
        let used = used.min(hints.len());
        self.hints_used = used as u32;
        self.hints_remaining = (hints.len() - used) as u32;
        self.available_hints = hints;
    }

    /// Hand out the next session-level hint, if any are left.
    pub fn use_hint(&mut self) -> Option<String> {
        let hint = self.available_hints.get(self.hints_used as usize)?.clone();
        self.hints_used += 1;
        self.hints_remaining = self.hints_remaining.saturating_sub(1);
        Some(hint)
    }

    pub fn player_id(&self) -> Option<Uuid> {
        self.player_id
    }

    pub fn current_room(&self) -> usize {
        self.current_room
    }

    pub fn set_current_room(&mut self, index: usize) {
        self.current_room = index;
    }

    pub fn timer(&self) -> u64 {
        self.timer
    }

    pub fn set_timer(&mut self, millis: u64) {
        self.timer = millis;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut Score {
        &mut self.score
    }

    pub fn set_score(&mut self, score: Score) {
        self.score = score;
    }

    pub fn available_hints(&self) -> &[String] {
        &self.available_hints
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn hints_remaining(&self) -> u32 {
        self.hints_remaining
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        let player_id = self.player_id.map(|id| id.to_string()).unwrap_or_default();
        let lines: [(&str, String); 14] = [
            ("playerId", player_id),
            ("currentRoom", self.current_room.to_string()),
            ("timer", self.timer.to_string()),
            ("completed", self.completed.to_string()),
            ("hintsUsed", self.hints_used.to_string()),
            ("hintsRemaining", self.hints_remaining.to_string()),
            ("startTime", format_time(self.start_time)),
            ("endTime", format_time(self.end_time)),
            ("scorePoints", self.score.points().to_string()),
            ("scorePuzzlesSolved", self.score.puzzles_solved().to_string()),
            ("scoreHintsUsed", self.score.hints_used().to_string()),
            ("scoreTimeTaken", self.score.time_taken().to_string()),
            ("scoreFreeHintTokens", self.score.free_hint_tokens().to_string()),
            ("availableHints", self.available_hints.join(HINT_DELIMITER)),
        ];
        for (key, value) in lines {
            out.push_str(&format!("{key}={value}\n"));
        }
        out
    }

    /// Apply a progress file on top of the current values.
    ///
    /// Unknown keys are skipped. A value that does not parse keeps the
    /// current value and is returned in the error list; the rest of the
    /// file still applies.
    pub fn apply_file_string(&mut self, content: &str) -> Vec<EngineError> {
        let mut errors = Vec::new();
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                errors.push(EngineError::parse("line", line));
                continue;
            };
            let key = key.trim();
            if let Err(e) = self.apply_field(key, value) {
                errors.push(e);
            }
        }
        errors
    }

    fn apply_field(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        fn num<T: FromStr>(key: &str, value: &str) -> Result<T, EngineError> {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| EngineError::parse(key, value))
        }
        fn time(key: &str, value: &str) -> Result<Option<DateTime<Utc>>, EngineError> {
            if value.trim().is_empty() {
                return Ok(None);
            }
            let millis: i64 = num(key, value)?;
            DateTime::from_timestamp_millis(millis)
                .map(Some)
                .ok_or_else(|| EngineError::parse(key, value))
        }

        match key {
            "playerId" => {
                self.player_id = if value.trim().is_empty() {
                    None
                } else {
                    Some(Uuid::parse_str(value.trim()).map_err(|_| EngineError::parse(key, value))?)
                };
            }
            "currentRoom" => self.current_room = num(key, value)?,
            "timer" => self.timer = num(key, value)?,
            "completed" => self.completed = num(key, value)?,
            "hintsUsed" => self.hints_used = num(key, value)?,
            "hintsRemaining" => self.hints_remaining = num(key, value)?,
            "startTime" => self.start_time = time(key, value)?,
            "endTime" => self.end_time = time(key, value)?,
            "scorePoints" => self.score.set_points(num(key, value)?),
            "scorePuzzlesSolved" => self.score.set_puzzles_solved(num(key, value)?),
            "scoreHintsUsed" => self.score.set_hints_used(num(key, value)?),
            "scoreTimeTaken" => self.score.set_time_taken(num(key, value)?),
            "scoreFreeHintTokens" => self.score.set_free_hint_tokens(num(key, value)?),
            "availableHints" => {
                self.available_hints = if value.is_empty() {
                    Vec::new()
                } else {
                    value.split(HINT_DELIMITER).map(str::to_string).collect()
                };
            }
            other => log::debug!("ignoring unknown progress key {other:?}"),
        }
        Ok(())
    }

    /// Write the progress file into `dir`, replacing any previous one
    /// atomically.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = self.file_path(dir);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating progress directory {}", dir.display()))?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(self.to_file_string().as_bytes())?;
        file.persist(&path)
            .with_context(|| format!("writing progress file {}", path.display()))?;
        Ok(path)
    }

    /// Load this player's progress file from `dir`.
    ///
    /// Returns `Ok(false)` when there is no file yet. Malformed fields are
    /// logged and keep their current values.
    pub fn load(&mut self, dir: &Path) -> Result<bool> {
        let path = self.file_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(e).with_context(|| format!("reading progress file {}", path.display()))
            }
        };
        for error in self.apply_file_string(&content) {
            log::warn!("{}: {error}", path.display());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Progress {
        let mut progress = Progress::for_player(Uuid::new_v4());
        progress.start(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap());
        progress.set_current_room(2);
        progress.set_available_hints(vec![
            "Look under the rug".into(),
            "Count the candles".into(),
            "Mirror, mirror".into(),
            "The clock is wrong".into(),
            "Try the window".into(),
        ]);
        for _ in 0..4 {
            progress.use_hint();
        }
        progress.add_elapsed(125_000);
        progress.score_mut().set_points(200);
        progress.score_mut().set_puzzles_solved(3);
        progress.score_mut().set_hints_used(4);
        progress.score_mut().set_free_hint_tokens(2);
        progress
    }

    #[test]
    fn round_trip_through_disk_restores_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let original = sample();
        let path = original.save(dir.path()).unwrap();
        assert!(path.ends_with(format!("progress-{}.txt", original.player_id().unwrap())));

        let mut restored = Progress::for_player(original.player_id().unwrap());
        assert!(restored.load(dir.path()).unwrap());
        assert_eq!(restored, original);
        assert_eq!(restored.current_room(), 2);
        assert_eq!(restored.timer(), 125_000);
        assert_eq!(restored.hints_used(), 4);
        assert_eq!(restored.hints_remaining(), 1);
        assert_eq!(restored.available_hints().len(), 5);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = Progress::for_player(Uuid::new_v4());
        assert!(!progress.load(dir.path()).unwrap());
        assert_eq!(progress.current_room(), 0);
    }

    #[test]
    fn unbound_progress_uses_default_path() {
        assert_eq!(Progress::new().file_name(), DEFAULT_PROGRESS_FILE);
    }

    #[test]
    fn bad_fields_keep_current_values() {
        let mut progress = Progress::new();
        progress.set_current_room(1);
        progress.set_timer(500);

        let errors = progress.apply_file_string(
            "currentRoom=three\ntimer=9000\nfavouriteColour=blue\nnot a pair\nstartTime=yesterday\n",
        );

        assert_eq!(progress.current_room(), 1);
        assert_eq!(progress.timer(), 9000);
        assert_eq!(progress.start_time(), None);
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|e| matches!(e, EngineError::Parse { .. })));
    }

    #[test]
    fn oversized_score_fields_load_without_panicking() {
        let mut progress = Progress::new();
        let errors = progress
            .apply_file_string("scorePoints=9223372036854775807\nscorePuzzlesSolved=1\n");
        assert!(errors.is_empty());
        assert_eq!(progress.score().calculate_score(), i64::MAX);
    }

    #[test]
    fn empty_hint_pool_round_trips_as_empty() {
        let mut progress = Progress::new();
        let text = progress.to_file_string();
        assert!(text.contains("availableHints=\n"));
        progress.set_available_hints(vec!["x".into()]);
        progress.apply_file_string(&text);
        assert!(progress.available_hints().is_empty());
    }

    #[test]
    fn delimiter_inside_hint_text_splits_it() {
        let mut progress = Progress::new();
        progress.set_available_hints(vec!["a ||b".into()]);
        let text = progress.to_file_string();
        let mut restored = Progress::new();
        restored.apply_file_string(&text);
        assert_eq!(restored.available_hints(), ["a", "b"]);
    }

    #[test]
    fn session_hints_run_out() {
        let mut progress = Progress::new();
        progress.set_available_hints(vec!["only".into()]);
        assert_eq!(progress.use_hint().as_deref(), Some("only"));
        assert_eq!(progress.use_hint(), None);
        assert_eq!(progress.hints_remaining(), 0);
    }

    #[test]
    fn finish_marks_completion_and_time() {
        let mut progress = Progress::new();
        progress.add_elapsed(61_500);
        progress.finish(Utc.timestamp_millis_opt(1_700_000_100_000).unwrap());
        assert!(progress.is_completed());
        assert_eq!(progress.score().time_taken(), 61);
        assert!(progress.end_time().is_some());
    }
}
