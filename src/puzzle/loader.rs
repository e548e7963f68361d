use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::types::{Puzzle, PuzzleKind};
use crate::room::Room;

/// On-disk shape of one `room_NN.toml` file.
#[derive(Debug, Deserialize)]
pub struct RoomFile {
    pub room: RoomMeta,
    #[serde(default, rename = "puzzle")]
    pub puzzles: Vec<PuzzleDef>,
}

#[derive(Debug, Deserialize)]
pub struct RoomMeta {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exits: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PuzzleDef {
    pub id: u32,
    pub prompt: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(flatten)]
    pub kind: PuzzleKind,
}

impl RoomFile {
    pub fn into_room(self) -> Room {
        let puzzles = self
            .puzzles
            .into_iter()
            .map(|p| Puzzle::new(p.id, p.prompt, p.hints, p.kind))
            .collect();
        Room::new(
            self.room.id,
            self.room.name,
            self.room.description,
            puzzles,
            self.room.exits,
        )
    }
}

pub fn load_room(path: &Path) -> Result<Room> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading room file {}", path.display()))?;
    let file: RoomFile = toml::from_str(&content)
        .with_context(|| format!("parsing room file {}", path.display()))?;
    Ok(file.into_room())
}

/// Load every `room_*.toml` in `dir`, ordered by file name.
///
/// Puzzle ids must be unique across the whole set since the facade looks
/// puzzles up by id alone.
pub fn load_rooms(dir: &Path) -> Result<Vec<Room>> {
    let pattern = dir.join("room_*.toml");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("room directory is not valid UTF-8: {}", dir.display()))?;

    let mut paths: Vec<_> = glob::glob(pattern)?.filter_map(|e| e.ok()).collect();

    // Sort by filename so room_01, room_02, room_03 are in order
    paths.sort();

    let mut rooms = Vec::new();
    let mut seen = HashSet::new();
    for path in paths {
        let room = load_room(&path)?;
        for puzzle in room.puzzles() {
            if !seen.insert(puzzle.id()) {
                bail!("duplicate puzzle id {} in {}", puzzle.id(), path.display());
            }
        }
        log::debug!("loaded room {} from {}", room.name(), path.display());
        rooms.push(room);
    }

    Ok(rooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleStatus;

    const CELLAR: &str = r#"
[room]
id = 1
name = "Cellar"
description = "Damp and dark."
exits = ["Stairs"]

[[puzzle]]
id = 10
prompt = "What has keys but opens no locks?"
hints = ["It makes music", "It has 88 of them"]
kind = "free_text"
answer = "piano"

[[puzzle]]
id = 11
prompt = "Solve 2x + 3 = 11"
kind = "logic"
equation = "2 * x + 3 = 11"
variable = "x"
"#;

    const ATTIC: &str = r#"
[room]
id = 2
name = "Attic"

[[puzzle]]
id = 20
prompt = "Which colour?"
kind = "word_choice"
choices = ["red", "blue"]
answer = "blue"

[[puzzle]]
id = 21
prompt = "a times b"
kind = "math"
expression = "a * b"
bindings = { a = 6.0, b = 7.0 }
"#;

    #[test]
    fn loads_single_room() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room_01.toml");
        std::fs::write(&path, CELLAR).unwrap();

        let room = load_room(&path).unwrap();
        assert_eq!(room.id(), 1);
        assert_eq!(room.exits(), ["Stairs"]);
        assert_eq!(room.puzzles().len(), 2);
        assert_eq!(room.puzzles()[0].hint().pool_size(), 2);
        assert_eq!(room.puzzles()[1].status(), PuzzleStatus::Unsolved);
    }

    #[test]
    fn loads_rooms_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("room_02.toml"), ATTIC).unwrap();
        std::fs::write(dir.path().join("room_01.toml"), CELLAR).unwrap();
        std::fs::write(dir.path().join("notes.toml"), "ignored = true").unwrap();

        let rooms = load_rooms(dir.path()).unwrap();
        let names: Vec<_> = rooms.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["Cellar", "Attic"]);
        assert!(rooms[1].puzzles()[1].kind().accepts("42"));
    }

    #[test]
    fn rejects_duplicate_puzzle_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("room_01.toml"), CELLAR).unwrap();
        std::fs::write(dir.path().join("room_02.toml"), CELLAR).unwrap();
        assert!(load_rooms(dir.path()).is_err());
    }

    #[test]
    fn reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room_01.toml");
        std::fs::write(&path, "[room]\nname = 3").unwrap();
        assert!(load_room(&path).is_err());
    }
}
