use serde::{Deserialize, Serialize};

pub const NO_MORE_HINTS: &str = "No more hints available. You're on your own...";

/// Ordered hint pool for one puzzle, with penalty/bonus bookkeeping.
///
/// `hints_used == penalty_hints_used + bonus_hints_used` holds after every
/// operation. The standard-hint limit is not enforced here; the session
/// facade decides when a penalty hint may be handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    available: Vec<String>,
    hints_used: usize,
    penalty_hints_used: usize,
    bonus_hints_used: usize,
}

impl Hint {
    pub fn new(available: Vec<String>) -> Self {
        Self {
            available,
            ..Self::default()
        }
    }

    /// Next hint in order, counted as a penalty hint, or [`NO_MORE_HINTS`]
    /// once the pool is exhausted.
    pub fn get_hint(&mut self) -> String {
        match self.available.get(self.hints_used) {
            Some(hint) => {
                let hint = hint.clone();
                self.hints_used += 1;
                self.penalty_hints_used += 1;
                hint
            }
            None => NO_MORE_HINTS.to_string(),
        }
    }

    /// Move the most recent hint from the penalty bucket to the bonus bucket.
    /// Returns `false` without changing anything if no penalty hint is
    /// outstanding.
    pub fn mark_last_hint_free(&mut self) -> bool {
        if self.penalty_hints_used == 0 {
            return false;
        }
        self.penalty_hints_used -= 1;
        self.bonus_hints_used += 1;
        true
    }

    pub fn reset_hints_used(&mut self) {
        self.hints_used = 0;
        self.penalty_hints_used = 0;
        self.bonus_hints_used = 0;
    }

    /// Replace the whole pool. Counters are reset too; callers that need
    /// them must restore them afterwards with [`Hint::restore_counters`].
    pub fn set_available_hints(&mut self, available: Vec<String>) {
        self.available = available;
        self.reset_hints_used();
    }

    /// Append hints to the end of the pool, keeping counters.
    pub fn merge_hints(&mut self, extra: impl IntoIterator<Item = String>) {
        self.available.extend(extra);
    }

    /// Re-apply counters after a pool swap. Values are clamped so the
    /// invariant and `hints_used <= pool size` still hold.
    pub fn restore_counters(&mut self, penalty: usize, bonus: usize) {
        let bonus = bonus.min(self.available.len());
        let penalty = penalty.min(self.available.len() - bonus);
        self.penalty_hints_used = penalty;
        self.bonus_hints_used = bonus;
        self.hints_used = penalty + bonus;
    }

    pub fn available_hints(&self) -> &[String] {
        &self.available
    }

    /// Hints handed out so far, in order.
    pub fn dispensed(&self) -> &[String] {
        &self.available[..self.hints_used]
    }

    pub fn hints_used(&self) -> usize {
        self.hints_used
    }

    pub fn penalty_hints_used(&self) -> usize {
        self.penalty_hints_used
    }

    pub fn bonus_hints_used(&self) -> usize {
        self.bonus_hints_used
    }

    pub fn remaining(&self) -> usize {
        self.available.len() - self.hints_used
    }

    pub fn pool_size(&self) -> usize {
        self.available.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Hint {
        Hint::new((1..=n).map(|i| format!("hint {i}")).collect())
    }

    fn assert_invariant(hint: &Hint) {
        assert_eq!(
            hint.hints_used(),
            hint.penalty_hints_used() + hint.bonus_hints_used()
        );
    }

    #[test]
    fn dispenses_in_order_past_any_standard_limit() {
        let mut hint = pool(5);
        let given: Vec<String> = (0..5).map(|_| hint.get_hint()).collect();
        assert_eq!(given, vec!["hint 1", "hint 2", "hint 3", "hint 4", "hint 5"]);
        assert_eq!(hint.penalty_hints_used(), 5);
        assert_invariant(&hint);
    }

    #[test]
    fn exhausted_pool_returns_sentinel() {
        let mut hint = pool(1);
        hint.get_hint();
        assert_eq!(hint.get_hint(), NO_MORE_HINTS);
        assert_eq!(hint.hints_used(), 1);
        assert_eq!(hint.remaining(), 0);
    }

    #[test]
    fn mark_last_hint_free_moves_bucket() {
        let mut hint = pool(3);
        hint.get_hint();
        hint.get_hint();
        assert!(hint.mark_last_hint_free());
        assert_eq!(hint.hints_used(), 2);
        assert_eq!(hint.penalty_hints_used(), 1);
        assert_eq!(hint.bonus_hints_used(), 1);
        assert_invariant(&hint);
    }

    #[test]
    fn mark_last_hint_free_without_hints_is_noop() {
        let mut hint = pool(3);
        assert!(!hint.mark_last_hint_free());
        assert_eq!((hint.penalty_hints_used(), hint.bonus_hints_used()), (0, 0));
    }

    #[test]
    fn replacing_pool_resets_counters() {
        let mut hint = pool(3);
        hint.get_hint();
        hint.set_available_hints(vec!["fresh".into()]);
        assert_eq!(hint.hints_used(), 0);
        assert_eq!(hint.get_hint(), "fresh");
    }

    #[test]
    fn merge_keeps_counters() {
        let mut hint = pool(1);
        hint.get_hint();
        hint.merge_hints(vec!["extra".to_string()]);
        assert_eq!(hint.hints_used(), 1);
        assert_eq!(hint.get_hint(), "extra");
    }

    #[test]
    fn restore_counters_clamps_to_pool() {
        let mut hint = pool(2);
        hint.restore_counters(3, 1);
        assert_eq!(hint.bonus_hints_used(), 1);
        assert_eq!(hint.penalty_hints_used(), 1);
        assert_eq!(hint.dispensed(), ["hint 1", "hint 2"]);
        assert_invariant(&hint);
    }

    #[test]
    fn reset_keeps_pool() {
        let mut hint = pool(2);
        hint.get_hint();
        hint.reset_hints_used();
        assert_eq!(hint.pool_size(), 2);
        assert_eq!(hint.get_hint(), "hint 1");
    }
}
