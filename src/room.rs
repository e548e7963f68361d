use anyhow::Result;
use std::path::Path;

use crate::puzzle::{load_rooms, Puzzle};
use crate::score::Score;

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: u32,
    name: String,
    description: String,
    puzzles: Vec<Puzzle>,
    exits: Vec<String>,
    score: Option<Score>,
}

impl Room {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        puzzles: Vec<Puzzle>,
        exits: Vec<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            puzzles,
            exits,
            score: None,
        }
    }

    /// True when every puzzle is solved. A room without puzzles never
    /// counts as completed.
    pub fn is_completed(&self) -> bool {
        !self.puzzles.is_empty() && self.puzzles.iter().all(Puzzle::is_solved)
    }

    pub fn first_unsolved(&self) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| !p.is_solved())
    }

    pub fn puzzle(&self, id: u32) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id() == id)
    }

    /// Mutable access to one puzzle's state. The set of puzzles itself can
    /// only change through [`Room::set_puzzles`].
    pub fn puzzle_mut(&mut self, id: u32) -> Option<&mut Puzzle> {
        self.puzzles.iter_mut().find(|p| p.id() == id)
    }

    pub fn set_puzzles(&mut self, puzzles: Vec<Puzzle>) {
        self.puzzles = puzzles;
    }

    pub fn reset(&mut self) {
        self.puzzles.iter_mut().for_each(Puzzle::reset);
    }

    pub fn solved_count(&self) -> usize {
        self.puzzles.iter().filter(|p| p.is_solved()).count()
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    pub fn exits(&self) -> &[String] {
        &self.exits
    }

    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    pub fn set_score(&mut self, score: Option<Score>) {
        self.score = score;
    }
}

/// Ordered set of rooms for one game, owned by whoever builds the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        let rooms = load_rooms(dir)?;
        log::info!("loaded {} rooms from {}", rooms.len(), dir.display());
        Ok(Self { rooms })
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Room> {
        self.rooms.get_mut(index)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Index of the room holding `puzzle_id`.
    pub fn room_of(&self, puzzle_id: u32) -> Option<usize> {
        self.rooms.iter().position(|r| r.puzzle(puzzle_id).is_some())
    }

    pub fn puzzle(&self, puzzle_id: u32) -> Option<&Puzzle> {
        self.rooms.iter().find_map(|r| r.puzzle(puzzle_id))
    }

    pub fn puzzle_mut(&mut self, puzzle_id: u32) -> Option<&mut Puzzle> {
        self.rooms.iter_mut().find_map(|r| r.puzzle_mut(puzzle_id))
    }

    pub fn all_completed(&self) -> bool {
        !self.rooms.is_empty() && self.rooms.iter().all(Room::is_completed)
    }

    pub fn reset_all(&mut self) {
        self.rooms.iter_mut().for_each(Room::reset);
    }
}
