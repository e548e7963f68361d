pub mod loader;
pub mod types;

pub use loader::{load_room, load_rooms, RoomFile};
pub use types::{Puzzle, PuzzleKind, PuzzleStatus};
