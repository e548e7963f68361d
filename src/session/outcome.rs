use chrono::{DateTime, Utc};

/// Result of [`super::SessionFacade::request_hint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintOutcome {
    pub granted: bool,
    pub hint: Option<String>,
    pub message: String,
    /// Standard hints are used up but the pool still has more; only a free
    /// hint token can unlock them.
    pub needs_token: bool,
}

impl HintOutcome {
    pub(crate) fn granted(hint: String) -> Self {
        Self {
            granted: true,
            message: format!("HINT: {hint}"),
            hint: Some(hint),
            needs_token: false,
        }
    }

    pub(crate) fn refused(message: impl Into<String>) -> Self {
        Self {
            granted: false,
            hint: None,
            message: message.into(),
            needs_token: false,
        }
    }

    pub(crate) fn token_required(limit: usize) -> Self {
        Self {
            granted: false,
            hint: None,
            message: format!(
                "You have used all {limit} standard hints. Spend a free hint token for another."
            ),
            needs_token: true,
        }
    }
}

/// Result of [`super::SessionFacade::use_free_hint_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOutcome {
    pub success: bool,
    pub message: String,
    pub token_consumed: bool,
    pub hint: Option<String>,
}

impl TokenOutcome {
    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token_consumed: false,
            hint: None,
        }
    }
}

/// Result of [`super::SessionFacade::activate_freeze_timer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeOutcome {
    pub success: bool,
    pub message: String,
    pub active_until: Option<DateTime<Utc>>,
}

/// Issued by `begin_tick`; only the newest generation may advance the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    pub(crate) generation: u64,
    pub puzzle_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Applied,
    /// A freeze is active; the elapsed time was not counted.
    Frozen,
    /// The ticket predates a puzzle change, room move, reset or logout.
    Stale,
}

/// What the polling path needs to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub elapsed_seconds: u64,
    pub freeze_active: bool,
    pub freeze_remaining_secs: i64,
    pub active_puzzle: Option<u32>,
    pub current_room: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub index: usize,
    pub id: u32,
    pub name: String,
    pub description: String,
    pub exits: Vec<String>,
    pub puzzle_count: usize,
    pub solved_count: usize,
    pub completed: bool,
}
