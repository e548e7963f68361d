//! Session progression engine for a single-player escape room.
//!
//! A player walks an ordered list of rooms. Every room holds puzzles, every
//! puzzle holds a hint pool, and solving puzzles feeds a running score. Free
//! hint tokens and freeze-timer charges form a small token economy on top.
//!
//! The [`SessionFacade`] is the only entry point a presentation layer needs.
//! Rooms come from TOML files (see [`puzzle::load_rooms`]), accounts live in a
//! [`store::UserStore`], and per-player progress is written as `key=value`
//! lines by [`Progress`].

pub mod config;
pub mod equation;
pub mod error;
pub mod hint;
pub mod player;
pub mod progress;
pub mod puzzle;
pub mod room;
pub mod score;
pub mod session;
pub mod store;

pub use config::EngineConfig;
pub use error::EngineError;
pub use hint::Hint;
pub use player::{Item, Player, PuzzleProgress};
pub use progress::Progress;
pub use puzzle::{Puzzle, PuzzleKind, PuzzleStatus};
pub use room::{Room, RoomRegistry};
pub use score::{Certificate, Difficulty, Score};
pub use session::{SessionFacade, SharedSession};

pub type Result<T> = anyhow::Result<T>;
