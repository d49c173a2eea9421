//! Newest-first lists fed by both bulk fetches and push events.
//!
//! A bulk fetch replaces the whole list, but push events can arrive while a
//! fetch is still in flight. [`Feed`] remembers items pushed since each
//! outstanding fetch was issued and re-applies them on top of the fetched
//! payload, so a late fetch never erases a live update.

/// Identifies one outstanding bulk fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// A newest-first list of alerts or records.
#[derive(Debug, Clone)]
pub struct Feed<T> {
    items: Vec<T>,
    /// Sequence number assigned to the next pushed item.
    next_seq: u64,
    /// Items pushed while at least one fetch was outstanding, oldest first.
    live: Vec<(u64, T)>,
    /// Tickets of fetches that have not completed yet.
    outstanding: Vec<u64>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_seq: 0,
            live: Vec::new(),
            outstanding: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq> Feed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current items, newest first.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any fetch is still outstanding.
    pub fn in_flight(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Insert a pushed item at the front.
    pub fn prepend(&mut self, item: T) {
        if !self.outstanding.is_empty() {
            self.live.push((self.next_seq, item.clone()));
        }
        self.next_seq += 1;
        self.items.insert(0, item);
    }

    /// Note that a fetch is being issued.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.outstanding.push(self.next_seq);
        FetchTicket(self.next_seq)
    }

    /// Replace the list with a fetched payload.
    ///
    /// Items pushed since `ticket` was issued that the payload does not
    /// already contain stay on top, newest first.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, payload: Vec<T>) {
        let pushed: Vec<T> = self
            .live
            .iter()
            .filter(|(seq, item)| *seq >= ticket.0 && !payload.contains(item))
            .map(|(_, item)| item.clone())
            .collect();

        let mut items = Vec::with_capacity(pushed.len() + payload.len());
        items.extend(pushed.into_iter().rev());
        items.extend(payload);
        self.items = items;

        self.settle(ticket);
    }

    /// Drop a failed fetch, leaving the list unchanged.
    pub fn abandon_fetch(&mut self, ticket: FetchTicket) {
        self.settle(ticket);
    }

    fn settle(&mut self, ticket: FetchTicket) {
        if let Some(pos) = self.outstanding.iter().position(|t| *t == ticket.0) {
            self.outstanding.remove(pos);
        }
        match self.outstanding.iter().min() {
            Some(&oldest) => self.live.retain(|(seq, _)| *seq >= oldest),
            None => self.live.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_puts_newest_first() {
        let mut feed = Feed::new();
        feed.prepend(1);
        feed.prepend(2);
        assert_eq!(feed.items(), &[2, 1]);
    }

    #[test]
    fn test_fetch_replaces_wholesale() {
        let mut feed = Feed::new();
        feed.prepend(99);

        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, vec![3, 2, 1]);
        assert_eq!(feed.items(), &[3, 2, 1]);

        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, vec![3, 2, 1]);
        assert_eq!(feed.items(), &[3, 2, 1]);
        assert!(!feed.in_flight());
    }

    #[test]
    fn test_items_pushed_during_fetch_survive() {
        let mut feed = Feed::new();
        let ticket = feed.begin_fetch();
        feed.prepend(10);
        feed.prepend(11);

        feed.complete_fetch(ticket, vec![2, 1]);
        assert_eq!(feed.items(), &[11, 10, 2, 1]);
    }

    #[test]
    fn test_pushed_item_already_in_payload_is_not_duplicated() {
        let mut feed = Feed::new();
        let ticket = feed.begin_fetch();
        feed.prepend(10);

        feed.complete_fetch(ticket, vec![10, 1]);
        assert_eq!(feed.items(), &[10, 1]);
    }

    #[test]
    fn test_failed_fetch_leaves_items() {
        let mut feed = Feed::new();
        feed.prepend(1);
        let ticket = feed.begin_fetch();
        feed.prepend(2);
        feed.abandon_fetch(ticket);

        assert_eq!(feed.items(), &[2, 1]);
        assert!(!feed.in_flight());
    }

    #[test]
    fn test_overlapping_fetches_keep_live_items_until_both_settle() {
        let mut feed = Feed::new();
        let first = feed.begin_fetch();
        feed.prepend(5);
        let second = feed.begin_fetch();
        feed.prepend(6);

        feed.complete_fetch(second, vec![1]);
        assert_eq!(feed.items(), &[6, 1]);

        feed.complete_fetch(first, vec![1]);
        assert_eq!(feed.items(), &[6, 5, 1]);
    }

    #[test]
    fn test_push_without_fetch_is_not_tracked() {
        let mut feed = Feed::new();
        feed.prepend(1);
        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, vec![]);
        assert!(feed.is_empty());
    }
}
