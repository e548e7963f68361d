//! The session facade: the one surface a presentation layer talks to.

pub mod clock;
pub mod outcome;
pub mod shared;

pub use clock::{Clock, ManualClock, SystemClock};
pub use outcome::{
    FreezeOutcome, HintOutcome, RoomSummary, SessionStatus, TickOutcome, TickTicket, TokenOutcome,
};
pub use shared::{PersistJob, SharedSession};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::hint::NO_MORE_HINTS;
use crate::player::{Player, PuzzleProgress};
use crate::progress::Progress;
use crate::puzzle::Puzzle;
use crate::room::{Room, RoomRegistry};
use crate::score::{certificate_score, Certificate, Difficulty};
use crate::store::{UserRecord, UserStore};

const NO_PLAYER: &str = "No player is logged in.";
const GUEST_ALIAS_ATTEMPTS: usize = 20;

fn snapshot(puzzle: &Puzzle, answer: String, now: DateTime<Utc>) -> PuzzleProgress {
    PuzzleProgress {
        puzzle_id: puzzle.id(),
        question: puzzle.prompt().to_string(),
        answer,
        status: puzzle.status(),
        last_updated: now,
        hints_used: puzzle.hint().dispensed().to_vec(),
        free_hints: puzzle.hint().bonus_hints_used(),
    }
}

pub struct SessionFacade {
    config: EngineConfig,
    rooms: RoomRegistry,
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    accounts: Vec<Player>,
    current: Option<Uuid>,
    progress: Progress,
    current_room: usize,
    active_puzzle: Option<u32>,
    difficulty: Difficulty,
    rng: StdRng,
    /// Bumped whenever outstanding tick tickets must be discarded.
    generation: u64,
    /// Set by the first successful `issue_certificate` for this run.
    certificate: Option<Certificate>,
}

impl SessionFacade {
    /// Build a session over `rooms`, loading accounts from `store`.
    ///
    /// A store that fails to load is logged and treated as empty.
    pub fn new(config: EngineConfig, rooms: RoomRegistry, store: Arc<dyn UserStore>) -> Self {
        let accounts = match store.load(&config.user_store_path) {
            Ok(records) => records.into_iter().map(Player::from).collect(),
            Err(e) => {
                log::error!(
                    "{}",
                    EngineError::Persistence(format!(
                        "loading user store {}: {e:#}",
                        config.user_store_path.display()
                    ))
                );
                Vec::new()
            }
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut facade = Self {
            config,
            rooms,
            store,
            clock: Arc::new(SystemClock),
            accounts,
            current: None,
            progress: Progress::new(),
            current_room: 0,
            active_puzzle: None,
            difficulty: Difficulty::default(),
            rng,
            generation: 0,
            certificate: None,
        };
        facade.enter_room_puzzle();
        facade
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // Accounts

    pub fn create_account(&mut self, username: &str, email: &str, password: &str) -> bool {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            log::warn!(
                "{}",
                EngineError::Validation("username and password are required".into())
            );
            return false;
        }
        if self.accounts.iter().any(|p| p.has_username(username)) {
            log::warn!(
                "{}",
                EngineError::Validation(format!("username {username:?} is already taken"))
            );
            return false;
        }

        let mut player = Player::new(username, email.trim(), password);
        player.grant_free_hint_tokens(self.config.starting_free_hint_tokens);
        player.grant_freeze_charges(self.config.starting_freeze_charges);
        self.accounts.push(player);
        log::info!("created account {username}");
        self.save_accounts();
        true
    }

    /// Bind the session to the matching player. `None` on an unknown name or
    /// wrong password.
    pub fn login(&mut self, username: &str, password: &str) -> Option<&Player> {
        let Some(id) = self
            .accounts
            .iter()
            .find(|p| p.has_username(username) && p.check_password(password))
            .map(Player::id)
        else {
            log::warn!("{}", EngineError::Validation(format!("login failed for {username:?}")));
            return None;
        };
        if self.current.is_some() {
            self.logout();
        }
        self.bind_player(id);
        self.current_player()
    }

    /// Start a session as a new anonymous guest with a generated alias.
    pub fn login_as_guest(&mut self) -> Option<&Player> {
        if self.current.is_some() {
            self.logout();
        }
        let alias = self.generate_guest_alias();
        let mut guest = Player::guest(alias.as_str());
        guest.grant_free_hint_tokens(self.config.starting_free_hint_tokens);
        guest.grant_freeze_charges(self.config.starting_freeze_charges);
        let id = guest.id();
        self.accounts.push(guest);
        log::info!("created guest {alias}");
        self.save_accounts();
        self.bind_player(id);
        self.current_player()
    }

    /// Save and unbind the current player. `false` if nobody was logged in.
    pub fn logout(&mut self) -> bool {
        let Some(index) = self.player_index() else {
            return false;
        };
        self.save_current_player_progress();
        self.accounts[index].cancel_freeze();
        log::info!("{} logged out", self.accounts[index].username());
        self.unbind_player();
        true
    }

    pub fn delete_account(&mut self, username: &str, password: &str) -> bool {
        let Some(index) = self
            .accounts
            .iter()
            .position(|p| p.has_username(username) && p.check_password(password))
        else {
            log::warn!(
                "{}",
                EngineError::Validation(format!("cannot delete account {username:?}"))
            );
            return false;
        };
        let player = self.accounts.remove(index);
        if self.current == Some(player.id()) {
            self.unbind_player();
        }

        let path = Progress::for_player(player.id()).file_path(&self.config.progress_dir);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::error!(
                "{}",
                EngineError::Persistence(format!("removing {}: {e}", path.display()))
            ),
        }
        log::info!("deleted account {}", player.username());
        self.save_accounts();
        true
    }

    pub fn current_player(&self) -> Option<&Player> {
        let index = self.player_index()?;
        self.accounts.get(index)
    }

    pub fn accounts(&self) -> &[Player] {
        &self.accounts
    }

    fn player_index(&self) -> Option<usize> {
        let id = self.current?;
        self.accounts.iter().position(|p| p.id() == id)
    }

    fn current_player_mut(&mut self) -> Option<&mut Player> {
        let index = self.player_index()?;
        self.accounts.get_mut(index)
    }

    fn generate_guest_alias(&mut self) -> String {
        for _ in 0..GUEST_ALIAS_ATTEMPTS {
            let alias = format!("Guest-{:04}", self.rng.gen_range(0..10_000));
            if !self.accounts.iter().any(|p| p.has_username(&alias)) {
                return alias;
            }
        }
        let suffix = Uuid::new_v4().simple().to_string();
        format!("Guest-{}", &suffix[..8])
    }

    /// Rebuild room and puzzle state for `id` from its progress file and
    /// puzzle history.
    fn bind_player(&mut self, id: Uuid) {
        self.current = Some(id);
        self.certificate = None;
        self.rooms.reset_all();
        self.progress = Progress::for_player(id);
        let loaded = match self.progress.load(&self.config.progress_dir) {
            Ok(found) => found,
            Err(e) => {
                log::error!("{}", EngineError::Persistence(format!("{e:#}")));
                false
            }
        };

        if let Some(index) = self.player_index() {
            let player = &mut self.accounts[index];
            if loaded {
                player.score = self.progress.score().clone();
                player.free_hint_tokens =
                    u32::try_from(player.score.free_hint_tokens()).unwrap_or(u32::MAX);
            }
            for entry in self.accounts[index].history.values() {
                if let Some(puzzle) = self.rooms.puzzle_mut(entry.puzzle_id) {
                    puzzle.restore_status(entry.status);
                    let total = entry.hints_used.len();
                    let free = entry.free_hints.min(total);
                    puzzle.hint_mut().restore_counters(total - free, free);
                }
            }
            log::info!("{} logged in", self.accounts[index].username());
        }

        if !loaded {
            self.progress.start(self.clock.now());
        }
        self.current_room = self
            .progress
            .current_room()
            .min(self.rooms.len().saturating_sub(1));
        self.progress.set_current_room(self.current_room);
        self.generation += 1;
        self.enter_room_puzzle();
    }

    fn unbind_player(&mut self) {
        self.current = None;
        self.certificate = None;
        self.progress = Progress::new();
        self.rooms.reset_all();
        self.current_room = 0;
        self.generation += 1;
        self.enter_room_puzzle();
    }

    // Puzzles and hints

    /// Check an answer. On the first correct answer the player's score gains
    /// a solve and the fixed award; repeats change nothing.
    pub fn submit_puzzle_answer(&mut self, puzzle_id: u32, answer: &str) -> bool {
        let Some(index) = self.player_index() else {
            log::warn!("{}", EngineError::State(NO_PLAYER.into()));
            return false;
        };
        let now = self.clock.now();
        let Some(puzzle) = self.rooms.puzzle_mut(puzzle_id) else {
            log::warn!("{}", EngineError::State(format!("no puzzle {puzzle_id}")));
            return false;
        };

        let was_solved = puzzle.is_solved();
        let correct = puzzle.try_solve(answer);
        let newly_solved = correct && !was_solved;
        let hint_free = puzzle.hint().hints_used() == 0;
        let entry = snapshot(puzzle, answer.trim().to_string(), now);
        let room_completed = newly_solved
            && self
                .rooms
                .room_of(puzzle_id)
                .and_then(|i| self.rooms.get(i))
                .map_or(false, Room::is_completed);

        let award = self.config.solve_award_points;
        let player = &mut self.accounts[index];
        if !was_solved {
            player.record_progress(entry);
        }
        if newly_solved {
            player.score.add_puzzle_solved();
            player.score.add_points(award);
            if hint_free {
                player.grant_free_hint_tokens(1);
                log::debug!("{} earned a free hint token", player.username());
            }
            if room_completed {
                player.grant_freeze_charges(1);
                log::debug!("{} earned a freeze-timer charge", player.username());
            }
            log::info!("{} solved puzzle {puzzle_id}", player.username());
        } else if !correct {
            log::debug!("wrong answer for puzzle {puzzle_id}");
        }

        if newly_solved && self.active_puzzle == Some(puzzle_id) {
            self.enter_room_puzzle();
        }
        correct
    }

    /// Hand out the next penalty hint, unless the standard-hint limit
    /// (`min(limit, pool size)`) is already reached.
    pub fn request_hint(&mut self, puzzle_id: u32) -> HintOutcome {
        let Some(index) = self.player_index() else {
            return HintOutcome::refused(NO_PLAYER);
        };
        let now = self.clock.now();
        let limit = self.config.standard_hint_limit;
        let previous_answer = self.previous_answer(index, puzzle_id);
        let Some(puzzle) = self.rooms.puzzle_mut(puzzle_id) else {
            return HintOutcome::refused(format!("There is no puzzle {puzzle_id}."));
        };
        if puzzle.is_solved() {
            return HintOutcome::refused("This puzzle is already solved.");
        }
        if puzzle.hint().remaining() == 0 {
            return HintOutcome::refused(NO_MORE_HINTS);
        }
        let cap = limit.min(puzzle.hint().pool_size());
        if puzzle.hint().penalty_hints_used() >= cap {
            log::debug!("standard hint limit reached for puzzle {puzzle_id}");
            return HintOutcome::token_required(cap);
        }

        let hint = puzzle.hint_mut().get_hint();
        let entry = snapshot(puzzle, previous_answer, now);
        let player = &mut self.accounts[index];
        player.score.add_hints_used(1);
        player.record_progress(entry);
        log::debug!("penalty hint for puzzle {puzzle_id}");

        if self.active_puzzle == Some(puzzle_id) {
            self.mirror_session_hints();
        }
        HintOutcome::granted(hint)
    }

    /// Spend one free hint token on the next hint, which then carries no
    /// penalty. Nothing is consumed unless a hint is actually handed out.
    pub fn use_free_hint_token(&mut self, puzzle_id: u32) -> TokenOutcome {
        let Some(index) = self.player_index() else {
            return TokenOutcome::failed(NO_PLAYER);
        };
        let now = self.clock.now();
        let previous_answer = self.previous_answer(index, puzzle_id);
        let Some(puzzle) = self.rooms.puzzle_mut(puzzle_id) else {
            return TokenOutcome::failed(format!("There is no puzzle {puzzle_id}."));
        };
        if puzzle.is_solved() {
            return TokenOutcome::failed("This puzzle is already solved. Your token was kept.");
        }
        if self.accounts[index].free_hint_tokens() == 0 {
            return TokenOutcome::failed("You have no free hint tokens.");
        }
        if puzzle.hint().remaining() == 0 {
            return TokenOutcome::failed("There are no hints left for this puzzle. Your token was kept.");
        }

        let hint = puzzle.hint_mut().get_hint();
        puzzle.hint_mut().mark_last_hint_free();
        let entry = snapshot(puzzle, previous_answer, now);
        let player = &mut self.accounts[index];
        player.consume_free_hint_token();
        player.record_progress(entry);
        log::debug!(
            "free hint for puzzle {puzzle_id}, {} tokens left",
            player.free_hint_tokens()
        );

        if self.active_puzzle == Some(puzzle_id) {
            self.mirror_session_hints();
        }
        TokenOutcome {
            success: true,
            message: format!("FREE HINT: {hint}"),
            token_consumed: true,
            hint: Some(hint),
        }
    }

    fn previous_answer(&self, index: usize, puzzle_id: u32) -> String {
        self.accounts[index]
            .progress_for(puzzle_id)
            .map(|entry| entry.answer.clone())
            .unwrap_or_default()
    }

    // Freeze timer and clock

    /// Spend a freeze charge. The engine only records the freeze window;
    /// pausing the displayed clock is up to the caller.
    pub fn activate_freeze_timer(&mut self) -> FreezeOutcome {
        let now = self.clock.now();
        let secs = self.config.freeze_duration_secs;
        let Some(player) = self.current_player_mut() else {
            return FreezeOutcome {
                success: false,
                message: NO_PLAYER.to_string(),
                active_until: None,
            };
        };
        player.expire_freeze(now);
        match player.activate_freeze(now, Duration::seconds(secs)) {
            Ok(until) => {
                log::info!("{} froze the timer", player.username());
                FreezeOutcome {
                    success: true,
                    message: format!("Timer frozen for {secs} seconds."),
                    active_until: Some(until),
                }
            }
            Err(e) => {
                log::debug!("{e}");
                let message = match e {
                    EngineError::State(message) => message,
                    other => other.to_string(),
                };
                FreezeOutcome {
                    success: false,
                    message,
                    active_until: None,
                }
            }
        }
    }

    pub fn is_freeze_active(&self) -> bool {
        let now = self.clock.now();
        self.current_player()
            .map_or(false, |p| p.is_freeze_active(now))
    }

    pub fn freeze_remaining_secs(&self) -> i64 {
        let now = self.clock.now();
        self.current_player()
            .and_then(|p| p.freeze_until)
            .map_or(0, |until| (until - now).num_seconds().max(0))
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.progress.elapsed_seconds()
    }

    /// Ticket for the next elapsed-time tick. Tickets go stale when the
    /// active puzzle changes, the room advances, progress resets or the
    /// player logs in or out.
    pub fn begin_tick(&self) -> TickTicket {
        TickTicket {
            generation: self.generation,
            puzzle_id: self.active_puzzle,
        }
    }

    pub fn apply_tick(&mut self, ticket: TickTicket, elapsed_ms: u64) -> TickOutcome {
        if ticket.generation != self.generation || self.current.is_none() {
            return TickOutcome::Stale;
        }
        let now = self.clock.now();
        if let Some(player) = self.current_player_mut() {
            player.expire_freeze(now);
            if player.is_freeze_active(now) {
                return TickOutcome::Frozen;
            }
        }
        self.progress.add_elapsed(elapsed_ms);
        let seconds = self.progress.elapsed_seconds() as i64;
        if let Some(player) = self.current_player_mut() {
            player.score.set_time_taken(seconds);
        }
        TickOutcome::Applied
    }

    /// Snapshot for the polling path; also clears an expired freeze.
    pub fn poll_status(&mut self) -> SessionStatus {
        let now = self.clock.now();
        if let Some(player) = self.current_player_mut() {
            player.expire_freeze(now);
        }
        SessionStatus {
            elapsed_seconds: self.elapsed_seconds(),
            freeze_active: self.is_freeze_active(),
            freeze_remaining_secs: self.freeze_remaining_secs(),
            active_puzzle: self.active_puzzle,
            current_room: self.current_room,
        }
    }

    // Rooms

    pub fn current_room_index(&self) -> usize {
        self.current_room
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.get(self.current_room)
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn has_next_room(&self) -> bool {
        self.current_room + 1 < self.rooms.len()
    }

    pub fn is_current_room_first(&self) -> bool {
        self.current_room == 0
    }

    pub fn is_current_room_second(&self) -> bool {
        self.current_room == 1
    }

    pub fn is_next_room_final(&self) -> bool {
        self.current_room + 2 == self.rooms.len()
    }

    /// Advance to the next room and activate its first unsolved puzzle.
    /// `false` at the last room.
    pub fn move_to_next_room(&mut self) -> bool {
        if !self.has_next_room() {
            log::debug!("no room after {}", self.current_room);
            return false;
        }
        self.current_room += 1;
        self.progress.set_current_room(self.current_room);
        self.generation += 1;
        self.enter_room_puzzle();
        if let Some(room) = self.current_room() {
            log::info!("entered room {}", room.name());
        }
        true
    }

    /// Back to room one with every puzzle unsolved and every hint counter
    /// cleared. The running score is kept.
    pub fn reset_progress_to_first_room(&mut self) {
        self.rooms.reset_all();
        self.current_room = 0;
        self.progress.set_current_room(0);
        if let Some(player) = self.current_player_mut() {
            player.history.clear();
        }
        self.certificate = None;
        self.generation += 1;
        self.enter_room_puzzle();
        log::info!("progress reset to the first room");
    }

    pub fn list_available_rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .rooms()
            .iter()
            .enumerate()
            .map(|(index, room)| RoomSummary {
                index,
                id: room.id(),
                name: room.name().to_string(),
                description: room.description().to_string(),
                exits: room.exits().to_vec(),
                puzzle_count: room.puzzles().len(),
                solved_count: room.solved_count(),
                completed: room.is_completed(),
            })
            .collect()
    }

    // Active puzzle

    pub fn get_active_puzzle(&self) -> Option<&Puzzle> {
        self.active_puzzle.and_then(|id| self.rooms.puzzle(id))
    }

    /// Make `puzzle_id` active. It must belong to the current room.
    pub fn set_active_puzzle(&mut self, puzzle_id: u32) -> bool {
        let in_room = self
            .current_room()
            .map_or(false, |room| room.puzzle(puzzle_id).is_some());
        if in_room {
            self.set_active(Some(puzzle_id));
        }
        in_room
    }

    /// Activate a random unsolved puzzle in the current room, drawn from the
    /// session's seeded generator.
    pub fn select_random_unsolved_puzzle(&mut self) -> Option<u32> {
        let candidates: Vec<u32> = self
            .current_room()?
            .puzzles()
            .iter()
            .filter(|p| !p.is_solved())
            .map(Puzzle::id)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = candidates[self.rng.gen_range(0..candidates.len())];
        self.set_active(Some(pick));
        Some(pick)
    }

    pub fn describe_current_puzzle_status(&self) -> String {
        let Some(puzzle) = self.get_active_puzzle() else {
            return "No active puzzle.".to_string();
        };
        let hint = puzzle.hint();
        let (room_name, solved, total) = self
            .current_room()
            .map(|r| (r.name(), r.solved_count(), r.puzzles().len()))
            .unwrap_or(("?", 0, 0));
        format!(
            "Room {}/{} ({room_name}), {} puzzle {}: {}. Hints {}/{} used ({} free). {solved}/{total} solved here.",
            self.current_room + 1,
            self.rooms.len(),
            puzzle.kind().category(),
            puzzle.id(),
            puzzle.status(),
            hint.hints_used(),
            hint.pool_size(),
            hint.bonus_hints_used(),
        )
    }

    fn enter_room_puzzle(&mut self) {
        let next = self
            .rooms
            .get(self.current_room)
            .and_then(|room| room.first_unsolved().or_else(|| room.puzzles().first()))
            .map(Puzzle::id);
        self.set_active(next);
    }

    fn set_active(&mut self, puzzle_id: Option<u32>) {
        if self.active_puzzle != puzzle_id {
            self.generation += 1;
        }
        self.active_puzzle = puzzle_id;
        self.mirror_session_hints();
    }

    fn mirror_session_hints(&mut self) {
        if let Some(puzzle) = self.active_puzzle.and_then(|id| self.rooms.puzzle(id)) {
            self.progress.mirror_hints(
                puzzle.hint().available_hints().to_vec(),
                puzzle.hint().hints_used(),
            );
        }
    }

    // Difficulty and certificate

    pub fn get_selected_difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_selected_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Final scoring once every room is completed. Only penalty hints are
    /// charged. Later calls return the same certificate until progress is
    /// reset or the player changes.
    pub fn issue_certificate(&mut self) -> Option<Certificate> {
        if !self.rooms.all_completed() {
            return None;
        }
        let index = self.player_index()?;
        if let Some(certificate) = &self.certificate {
            return Some(certificate.clone());
        }
        let now = self.clock.now();

        let rooms = self.rooms.rooms();
        let total_hints_used: u64 = rooms
            .iter()
            .flat_map(Room::puzzles)
            .map(|p| p.hint().penalty_hints_used() as u64)
            .sum();
        let mut solved_by_category = BTreeMap::new();
        for puzzle in rooms.iter().flat_map(Room::puzzles) {
            *solved_by_category
                .entry(puzzle.kind().category().to_string())
                .or_insert(0) += 1;
        }

        let player = &mut self.accounts[index];
        let base_score = player.score.calculate_score();
        let final_score = certificate_score(base_score, self.difficulty, total_hints_used);
        player.score.set_hints_used(total_hints_used as i64);
        self.progress.finish(now);
        self.progress.set_score(player.score.clone());
        log::info!(
            "certificate for {}: {final_score} on {}",
            player.username(),
            self.difficulty
        );

        let certificate = Certificate {
            username: player.username().to_string(),
            difficulty: self.difficulty,
            base_score,
            total_hints_used,
            final_score,
            solved_by_category,
        };
        self.certificate = Some(certificate.clone());
        Some(certificate)
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    // Persistence

    /// Everything needed to write the current player's state, with score and
    /// timer synced first. `None` when nobody is logged in.
    pub fn persist_job(&mut self) -> Option<PersistJob> {
        let index = self.player_index()?;
        let player = &mut self.accounts[index];
        player
            .score
            .set_time_taken(self.progress.elapsed_seconds() as i64);
        player
            .score
            .set_free_hint_tokens(player.free_hint_tokens as i64);
        self.progress.set_score(player.score.clone());
        self.progress.set_current_room(self.current_room);

        Some(PersistJob {
            progress: self.progress.clone(),
            progress_dir: self.config.progress_dir.clone(),
            records: self.records(),
            store_path: self.config.user_store_path.clone(),
            store: Arc::clone(&self.store),
        })
    }

    /// Write the progress file and the user store. Failures are logged and
    /// reported as `false`; in-memory state is untouched.
    pub fn save_current_player_progress(&mut self) -> bool {
        match self.persist_job() {
            Some(job) => job.run(),
            None => {
                log::warn!("{}", EngineError::State(NO_PLAYER.into()));
                false
            }
        }
    }

    fn records(&self) -> Vec<UserRecord> {
        self.accounts.iter().map(UserRecord::from).collect()
    }

    fn save_accounts(&self) -> bool {
        match self
            .store
            .save(&self.config.user_store_path, &self.records())
        {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}", EngineError::Persistence(format!("{e:#}")));
                false
            }
        }
    }
}
