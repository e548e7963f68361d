use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::EngineError;
use crate::puzzle::PuzzleStatus;
use crate::score::Score;

/// 64-bit FNV-1a over the password bytes, as 16 hex digits.
///
/// Not a cryptographic hash: it only keeps plain text out of the user store.
pub fn hash_password(password: &str) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let hash = password
        .bytes()
        .fold(OFFSET, |acc, b| (acc ^ b as u64).wrapping_mul(PRIME));
    format!("{hash:016x}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Same item if either the id or the display name agrees.
    pub fn matches(&self, other: &Item) -> bool {
        self.id == other.id || self.name == other.name
    }
}

/// Snapshot of one puzzle in a player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleProgress {
    pub puzzle_id: u32,
    pub question: String,
    pub answer: String,
    pub status: PuzzleStatus,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub hints_used: Vec<String>,
    /// How many of `hints_used` were unlocked with a free hint token.
    #[serde(default)]
    pub free_hints: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) guest: bool,
    pub(crate) inventory: Vec<Item>,
    pub(crate) history: BTreeMap<u32, PuzzleProgress>,
    pub(crate) score: Score,
    pub(crate) free_hint_tokens: u32,
    pub(crate) freeze_charges: u32,
    pub(crate) freeze_until: Option<DateTime<Utc>>,
}

impl Player {
    pub fn new(username: impl Into<String>, email: impl Into<String>, password: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: hash_password(password),
            guest: false,
            inventory: Vec::new(),
            history: BTreeMap::new(),
            score: Score::default(),
            free_hint_tokens: 0,
            freeze_charges: 0,
            freeze_until: None,
        }
    }

    pub fn guest(alias: impl Into<String>) -> Self {
        Self {
            guest: true,
            ..Self::new(alias, "", "")
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        !self.guest && self.password_hash == hash_password(password)
    }

    pub fn has_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.trim().to_lowercase()
    }

    // Inventory

    pub fn add_item(&mut self, item: Item) -> bool {
        if self.has_item(&item) {
            return false;
        }
        self.inventory.push(item);
        true
    }

    pub fn has_item(&self, probe: &Item) -> bool {
        self.inventory.iter().any(|i| i.matches(probe))
    }

    pub fn remove_item(&mut self, probe: &Item) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|i| !i.matches(probe));
        self.inventory.len() != before
    }

    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    // Puzzle history

    pub fn record_progress(&mut self, entry: PuzzleProgress) {
        self.history.insert(entry.puzzle_id, entry);
    }

    pub fn progress_for(&self, puzzle_id: u32) -> Option<&PuzzleProgress> {
        self.history.get(&puzzle_id)
    }

    pub fn history(&self) -> &BTreeMap<u32, PuzzleProgress> {
        &self.history
    }

    // Token economy

    pub fn grant_free_hint_tokens(&mut self, count: u32) {
        self.free_hint_tokens = self.free_hint_tokens.saturating_add(count);
    }

    pub fn consume_free_hint_token(&mut self) -> bool {
        if self.free_hint_tokens == 0 {
            return false;
        }
        self.free_hint_tokens -= 1;
        true
    }

    pub fn grant_freeze_charges(&mut self, count: u32) {
        self.freeze_charges = self.freeze_charges.saturating_add(count);
    }

    /// Spend a freeze charge and start a freeze lasting `duration`.
    pub fn activate_freeze(
        &mut self,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<DateTime<Utc>, EngineError> {
        if self.is_freeze_active(now) {
            return Err(EngineError::State("a timer freeze is already active".into()));
        }
        if self.freeze_charges == 0 {
            return Err(EngineError::State("no freeze-timer charges left".into()));
        }
        self.freeze_charges -= 1;
        let until = now + duration;
        self.freeze_until = Some(until);
        Ok(until)
    }

    pub fn is_freeze_active(&self, now: DateTime<Utc>) -> bool {
        self.freeze_until.map_or(false, |until| now < until)
    }

    /// Clear an elapsed freeze. Returns `true` if one was cleared.
    pub fn expire_freeze(&mut self, now: DateTime<Utc>) -> bool {
        match self.freeze_until {
            Some(until) if now >= until => {
                self.freeze_until = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_freeze(&mut self) {
        self.freeze_until = None;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_guest(&self) -> bool {
        self.guest
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut Score {
        &mut self.score
    }

    pub fn free_hint_tokens(&self) -> u32 {
        self.free_hint_tokens
    }

    pub fn freeze_charges(&self) -> u32 {
        self.freeze_charges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn hash_is_stable_and_not_plaintext() {
        assert_eq!(hash_password(""), "cbf29ce484222325");
        assert_eq!(hash_password("a"), "af63dc4c8601ec8c");
        assert_ne!(hash_password("hunter2"), "hunter2");
    }

    #[test]
    fn password_check() {
        let player = Player::new("Ada", "ada@example.com", "secret");
        assert!(player.check_password("secret"));
        assert!(!player.check_password("Secret"));
        assert!(player.has_username("ADA"));
    }

    #[test]
    fn guests_cannot_log_in_with_password() {
        let guest = Player::guest("Guest-0001");
        assert!(guest.is_guest());
        assert!(!guest.check_password(""));
    }

    #[test]
    fn inventory_matches_by_id_or_name() {
        let mut player = Player::new("p", "", "x");
        player.add_item(Item::new("key-1", "Brass Key"));

        assert!(player.has_item(&Item::new("key-1", "Rusty Key")));
        assert!(player.has_item(&Item::new("key-9", "Brass Key")));
        assert!(!player.has_item(&Item::new("lamp", "Oil Lamp")));
        assert!(!player.add_item(Item::new("key-1", "Other")));
        assert!(player.remove_item(&Item::new("x", "Brass Key")));
        assert!(player.inventory().is_empty());
    }

    #[test]
    fn free_hint_tokens_never_go_negative() {
        let mut player = Player::new("p", "", "x");
        assert!(!player.consume_free_hint_token());
        player.grant_free_hint_tokens(1);
        assert!(player.consume_free_hint_token());
        assert_eq!(player.free_hint_tokens(), 0);
    }

    #[test]
    fn freeze_lifecycle() {
        let mut player = Player::new("p", "", "x");
        player.grant_freeze_charges(2);

        let until = player.activate_freeze(at(0), Duration::seconds(10)).unwrap();
        assert_eq!(until, at(10));
        assert!(player.is_freeze_active(at(9)));
        assert!(matches!(
            player.activate_freeze(at(5), Duration::seconds(10)),
            Err(EngineError::State(_))
        ));
        assert_eq!(player.freeze_charges(), 1);

        assert!(!player.is_freeze_active(at(10)));
        assert!(player.expire_freeze(at(10)));
        assert!(!player.expire_freeze(at(11)));
        player.activate_freeze(at(11), Duration::seconds(10)).unwrap();
        assert_eq!(player.freeze_charges(), 0);
    }

    #[test]
    fn freeze_without_charges_fails() {
        let mut player = Player::new("p", "", "x");
        assert!(player.activate_freeze(at(0), Duration::seconds(10)).is_err());
        assert!(!player.is_freeze_active(at(0)));
    }
}
