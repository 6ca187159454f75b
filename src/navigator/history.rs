//! Visit history used for back-navigation.

use super::Target;
use crate::registry::ScreenId;

/// Ordered record of activated screens, oldest first.
///
/// Consecutive duplicates are never stored: re-activating the screen that is
/// already on top leaves the stack unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<ScreenId>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an activation. Returns `false` when `id` was already on top.
    pub fn push_visit(&mut self, id: &str) -> bool {
        if self.top() == Some(id) {
            return false;
        }
        self.entries.push(id.to_string());
        true
    }

    pub fn top(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn pop(&mut self) -> Option<ScreenId> {
        self.entries.pop()
    }

    /// Forget the two most recent visits (a transient screen and its caller's re-visit).
    pub fn pop_last_two(&mut self) -> Vec<ScreenId> {
        let mut popped = Vec::with_capacity(2);
        for _ in 0..2 {
            match self.entries.pop() {
                Some(id) => popped.push(id),
                None => break,
            }
        }
        popped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ScreenId] {
        &self.entries
    }

    pub fn snapshot(&self) -> Vec<ScreenId> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Choose the screen to go back to, consuming history as it goes.
    ///
    /// `current` is the screen being edited (if any) and `pending` the target
    /// already requested for the next loop step. Returns the new target to
    /// request, or `None` when the pending request must be left alone.
    ///
    /// 1. Empty history: fall back to `backup`.
    /// 2. If the top entry is the current screen, drop it; the screen pushed
    ///    itself on entry and must not be offered as its own predecessor.
    /// 3. If nobody has redirected the navigator yet (`pending` still names
    ///    the current screen, or nothing is active), pop the new top and
    ///    request it, or request `backup` when the stack ran dry.
    pub fn step_back(&mut self, current: Option<&str>, pending: &Target, backup: &str) -> Option<Target> {
        if self.is_empty() {
            return Some(Target::from(backup));
        }

        if current.is_some() && self.top() == current {
            self.entries.pop();
        }

        let undisturbed = match current {
            Some(id) => pending.names(id),
            None => true,
        };
        if !undisturbed {
            return None;
        }

        match self.entries.pop() {
            Some(previous) => Some(Target::Screen(previous)),
            None => Some(Target::from(backup)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(ids: &[&str]) -> History {
        let mut history = History::new();
        for id in ids {
            history.push_visit(id);
        }
        history
    }

    #[test]
    fn consecutive_duplicates_are_collapsed() {
        let mut history = History::new();
        assert!(history.push_visit("A"));
        assert!(!history.push_visit("A"));
        assert!(history.push_visit("B"));
        assert!(history.push_visit("A"));
        assert_eq!(history.entries(), ["A", "B", "A"]);
    }

    #[test]
    fn step_back_skips_own_entry() {
        let mut history = history(&["A", "B"]);
        let target = history.step_back(Some("B"), &Target::from("B"), "MAIN");
        assert_eq!(target, Some(Target::from("A")));
        assert!(history.is_empty());
    }

    #[test]
    fn step_back_respects_existing_request() {
        let mut history = history(&["A", "B"]);
        let target = history.step_back(Some("B"), &Target::from("C"), "MAIN");
        assert_eq!(target, None);
        assert_eq!(history.entries(), ["A"]);
    }

    #[test]
    fn step_back_on_empty_history_uses_backup() {
        let mut history = History::new();
        assert_eq!(
            history.step_back(Some("B"), &Target::from("B"), "MAIN"),
            Some(Target::from("MAIN"))
        );
    }

    #[test]
    fn step_back_runs_dry_after_own_entry() {
        let mut history = history(&["B"]);
        assert_eq!(
            history.step_back(Some("B"), &Target::from("B"), "MAIN"),
            Some(Target::from("MAIN"))
        );
    }

    #[test]
    fn step_back_without_current_pops_top() {
        let mut history = history(&["A", "B"]);
        assert_eq!(
            history.step_back(None, &Target::Stop, "MAIN"),
            Some(Target::from("B"))
        );
        assert_eq!(history.entries(), ["A"]);
    }

    #[test]
    fn pop_last_two_tolerates_short_history() {
        let mut history = history(&["A", "B", "C"]);
        assert_eq!(history.pop_last_two(), vec!["C".to_string(), "B".to_string()]);
        assert_eq!(history.pop_last_two(), vec!["A".to_string()]);
        assert!(history.pop_last_two().is_empty());
    }
}
