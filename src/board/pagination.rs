//! Round-grouped history pagination.
//!
//! History is paged by round rather than by event count: page `i` holds the
//! rounds at positions `i*k .. i*k + k` of the distinct round numbers in
//! descending order, so page 0 is always the most recent rounds.

use std::collections::BTreeMap;

use crate::data_fetcher::models::Event;

/// One round of a history page, events newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundGroup {
    pub round: u32,
    pub events: Vec<Event>,
}

/// A page of rounds plus the navigation flags for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundPage {
    pub index: usize,
    pub rounds: Vec<RoundGroup>,
    pub has_newer: bool,
    pub has_older: bool,
}

impl RoundPage {
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.rounds.iter().map(|r| r.events.len()).sum()
    }
}

/// Loaded history grouped by round, together with the current page index.
#[derive(Debug, Clone, Default)]
pub struct RoundCursor {
    /// Round number to its events; iteration is ascending, pages read it in reverse.
    rounds: BTreeMap<u32, Vec<Event>>,
    rounds_per_page: usize,
    index: usize,
}

impl RoundCursor {
    /// Groups `events` by round. A page size of zero is treated as one.
    pub fn new(events: Vec<Event>, rounds_per_page: usize) -> Self {
        let mut rounds: BTreeMap<u32, Vec<Event>> = BTreeMap::new();
        for event in events {
            rounds.entry(event.round).or_default().push(event);
        }
        for events in rounds.values_mut() {
            events.sort_by(|a, b| b.kickoff.cmp(&a.kickoff).then(b.id.cmp(&a.id)));
        }
        Self {
            rounds,
            rounds_per_page: rounds_per_page.max(1),
            index: 0,
        }
    }

    /// A cursor with nothing loaded yet.
    pub fn empty(rounds_per_page: usize) -> Self {
        Self::new(Vec::new(), rounds_per_page)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rounds_per_page(&self) -> usize {
        self.rounds_per_page
    }

    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn has_newer(&self) -> bool {
        self.index > 0
    }

    pub fn has_older(&self) -> bool {
        (self.index + 1) * self.rounds_per_page < self.rounds.len()
    }

    /// Moves one page back in time. Returns false at the oldest page.
    pub fn older(&mut self) -> bool {
        if self.has_older() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Moves one page forward in time. Returns false at the newest page.
    pub fn newer(&mut self) -> bool {
        if self.has_newer() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// The current page.
    pub fn page(&self) -> RoundPage {
        let start = self.index * self.rounds_per_page;
        let rounds = self
            .rounds
            .iter()
            .rev()
            .skip(start)
            .take(self.rounds_per_page)
            .map(|(round, events)| RoundGroup {
                round: *round,
                events: events.clone(),
            })
            .collect();
        RoundPage {
            index: self.index,
            rounds,
            has_newer: self.has_newer(),
            has_older: self.has_older(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing_utils::TestDataBuilder;

    fn history_for_rounds(rounds: std::ops::RangeInclusive<u32>) -> Vec<Event> {
        rounds
            .flat_map(|round| {
                (0..2).map(move |n| {
                    TestDataBuilder::finished_event(i64::from(round) * 10 + n, round, 1, 0)
                })
            })
            .collect()
    }

    fn round_numbers(page: &RoundPage) -> Vec<u32> {
        page.rounds.iter().map(|r| r.round).collect()
    }

    #[test]
    fn test_boundary_rounds_ten_to_five_page_size_three() {
        let mut cursor = RoundCursor::new(history_for_rounds(5..=10), 3);
        assert_eq!(cursor.total_rounds(), 6);

        let first = cursor.page();
        assert_eq!(round_numbers(&first), vec![10, 9, 8]);
        assert!(!first.has_newer);
        assert!(first.has_older);

        assert!(cursor.older());
        let second = cursor.page();
        assert_eq!(round_numbers(&second), vec![7, 6, 5]);
        assert!(second.has_newer);
        assert!(!second.has_older);

        assert!(!cursor.older());
        assert_eq!(cursor.index(), 1);

        assert!(cursor.newer());
        assert!(!cursor.newer());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_events_within_round_newest_first() {
        let mut early = TestDataBuilder::finished_event(1, 4, 0, 0);
        early.kickoff = TestDataBuilder::kickoff("2024-10-05T13:30:00Z");
        let mut late = TestDataBuilder::finished_event(2, 4, 2, 1);
        late.kickoff = TestDataBuilder::kickoff("2024-10-06T17:30:00Z");

        let cursor = RoundCursor::new(vec![early, late], 3);
        let page = cursor.page();
        let ids: Vec<i64> = page.rounds[0].events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(page.event_count(), 2);
    }

    #[test]
    fn test_partial_last_page() {
        let mut cursor = RoundCursor::new(history_for_rounds(1..=4), 3);
        cursor.older();
        let page = cursor.page();
        assert_eq!(round_numbers(&page), vec![1]);
        assert!(!page.has_older);
    }

    #[test]
    fn test_zero_page_size_clamped() {
        let cursor = RoundCursor::new(history_for_rounds(1..=2), 0);
        assert_eq!(cursor.rounds_per_page(), 1);
        assert_eq!(round_numbers(&cursor.page()), vec![2]);
        assert!(cursor.has_older());
    }

    #[test]
    fn test_empty_history() {
        let mut cursor = RoundCursor::empty(3);
        let page = cursor.page();
        assert!(page.is_empty());
        assert!(!page.has_newer && !page.has_older);
        assert!(!cursor.older());
    }

    #[test]
    fn test_reset_returns_to_newest() {
        let mut cursor = RoundCursor::new(history_for_rounds(1..=9), 2);
        cursor.older();
        cursor.older();
        assert_eq!(cursor.index(), 2);
        cursor.reset();
        assert_eq!(round_numbers(&cursor.page()), vec![9, 8]);
    }
}
