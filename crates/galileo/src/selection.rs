//! Stale-response guard.
//!
//! A view that loads details for the selected item issues each request with
//! a [`Ticket`] from [`Selection::select`]. When the response arrives it is
//! handed to [`Selection::apply`], which drops it if the user has moved on.

use log::debug;

/// Proof of which selection a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// The currently selected identity.
///
/// Every call to [`Selection::select`] or [`Selection::clear`] invalidates all
/// earlier tickets, including tickets for the same key.
#[derive(Debug, Clone)]
pub struct Selection<K> {
    current: Option<K>,
    generation: u64,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self {
            current: None,
            generation: 0,
        }
    }
}

impl<K> Selection<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `key` and returns the ticket for requests made on its behalf.
    pub fn select(&mut self, key: K) -> Ticket {
        self.generation += 1;
        self.current = Some(key);
        Ticket(self.generation)
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation && self.current.is_some()
    }

    /// Runs `f` with the selected key and `value` if `ticket` is still
    /// current; otherwise drops `value`. Returns whether `f` ran.
    pub fn apply<T, F>(&self, ticket: Ticket, value: T, f: F) -> bool
    where
        F: FnOnce(&K, T),
    {
        match &self.current {
            Some(key) if ticket.0 == self.generation => {
                f(key, value);
                true
            }
            _ => {
                debug!(ticket = ticket.0, current = self.generation; "Dropping stale response");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_selection_wins() {
        let mut selection = Selection::new();
        let first = selection.select("ds-1");
        let second = selection.select("ds-2");

        let mut applied = Vec::new();
        // The response for ds-1 arrives late and is dropped.
        assert!(!selection.apply(first, "rows of ds-1", |_, value| applied.push(value)));
        assert!(selection.apply(second, "rows of ds-2", |key, value| {
            assert_eq!(*key, "ds-2");
            applied.push(value);
        }));

        assert_eq!(applied, vec!["rows of ds-2"]);
    }

    #[test]
    fn test_reselecting_same_key_invalidates_old_ticket() {
        let mut selection = Selection::new();
        let old = selection.select(1);
        let new = selection.select(1);

        assert!(!selection.is_current(old));
        assert!(selection.is_current(new));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut selection = Selection::new();
        let ticket = selection.select("t1");
        selection.clear();

        assert!(selection.current().is_none());
        assert!(!selection.apply(ticket, (), |_, _| panic!("stale value applied")));
    }
}
