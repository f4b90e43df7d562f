//! Board filter set and the immutable snapshot the scheduler captures.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::config::{Config, parse_competition_list};
use crate::constants::window::MAX_DAYS;
use crate::data_fetcher::models::WindowQuery;
use crate::error::AppError;

/// What the board is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSet {
    pub competitions: Vec<String>,
    pub season: Option<i32>,
    pub days_back: u32,
    pub days_ahead: u32,
}

impl FilterSet {
    /// Builds a filter set, normalizing competitions and clamping days to
    /// `0..=365`. An empty competition list falls back to `default_competitions`.
    pub fn new<S: AsRef<str>>(
        competitions: &[S],
        season: Option<i32>,
        days_back: u32,
        days_ahead: u32,
        default_competitions: &[String],
    ) -> Self {
        let joined = competitions
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        let mut codes = parse_competition_list(&joined);
        if codes.is_empty() {
            codes = default_competitions.to_vec();
        }
        Self {
            competitions: codes,
            season,
            days_back: days_back.min(MAX_DAYS),
            days_ahead: days_ahead.min(MAX_DAYS),
        }
    }

    /// Filter set from the configured defaults.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.default_competitions,
            config.default_season,
            config.days_back,
            config.days_ahead,
            &config.default_competitions,
        )
    }

    /// Same filters with other competitions; an empty list keeps `defaults`.
    pub fn with_competitions<S: AsRef<str>>(&self, competitions: &[S], defaults: &[String]) -> Self {
        Self::new(
            competitions,
            self.season,
            self.days_back,
            self.days_ahead,
            defaults,
        )
    }

    pub fn with_season(&self, season: Option<i32>) -> Self {
        Self {
            season,
            ..self.clone()
        }
    }

    pub fn with_days(&self, days_back: u32, days_ahead: u32) -> Self {
        Self {
            days_back: days_back.min(MAX_DAYS),
            days_ahead: days_ahead.min(MAX_DAYS),
            ..self.clone()
        }
    }

    /// True when moving from `self` to `next` invalidates the loaded history.
    /// Only competitions and season matter; the day range does not.
    pub fn history_changed(&self, next: &FilterSet) -> bool {
        self.competitions != next.competitions || self.season != next.season
    }

    /// Query for the primary window fetch.
    pub fn window_query(&self) -> Result<WindowQuery, AppError> {
        WindowQuery::new(
            &self.competitions,
            self.season,
            self.days_back,
            self.days_ahead,
        )
    }

    /// Explicit season, or the season running on `today`.
    pub fn season_or_current(&self, today: NaiveDate) -> i32 {
        self.season.unwrap_or_else(|| season_for_date(today))
    }

    /// Freezes the filters for the refresh cycle of `generation`.
    pub fn snapshot(&self, generation: u64) -> FilterSnapshot {
        FilterSnapshot {
            filters: Arc::new(self.clone()),
            generation,
        }
    }
}

/// Season (by starting year) that `date` falls in. Seasons start in July.
pub fn season_for_date(date: NaiveDate) -> i32 {
    if date.month() >= 7 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Read-only filter set shared with an armed refresh cycle.
///
/// Later filter changes build a new snapshot, they never mutate an armed one.
/// The generation identifies the filter change the snapshot belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    filters: Arc<FilterSet>,
    generation: u64,
}

impl FilterSnapshot {
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::ops::Deref for FilterSnapshot {
    type Target = FilterSet;

    fn deref(&self) -> &FilterSet {
        &self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        vec!["bl1".to_string()]
    }

    #[test]
    fn test_empty_competitions_fall_back_to_defaults() {
        let empty: [&str; 0] = [];
        let filters = FilterSet::new(&empty, None, 7, 7, &defaults());
        assert_eq!(filters.competitions, vec!["bl1"]);

        let blank = FilterSet::new(&[" ", ","], None, 7, 7, &defaults());
        assert_eq!(blank.competitions, vec!["bl1"]);
    }

    #[test]
    fn test_days_are_clamped() {
        let filters = FilterSet::new(&["bl2"], Some(2024), 9_999, 400, &defaults());
        assert_eq!(filters.days_back, 365);
        assert_eq!(filters.days_ahead, 365);
        assert!(filters.window_query().is_ok());
    }

    #[test]
    fn test_history_changed_ignores_day_range() {
        let base = FilterSet::new(&["bl1"], Some(2024), 7, 7, &defaults());
        assert!(!base.history_changed(&base.with_days(1, 30)));
        assert!(base.history_changed(&base.with_season(Some(2023))));
        assert!(base.history_changed(&base.with_competitions(&["bl1", "bl2"], &defaults())));
    }

    #[test]
    fn test_season_for_date() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(season_for_date(date(2024, 8, 23)), 2024);
        assert_eq!(season_for_date(date(2025, 3, 1)), 2024);
        assert_eq!(season_for_date(date(2025, 7, 1)), 2025);

        let explicit = FilterSet::new(&["bl1"], Some(2019), 7, 7, &defaults());
        assert_eq!(explicit.season_or_current(date(2025, 3, 1)), 2019);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let base = FilterSet::new(&["BL1"], None, 7, 7, &defaults());
        let snap = base.snapshot(4);
        let changed = base.with_season(Some(2022));
        assert_eq!(snap.season, None);
        assert_eq!(changed.season, Some(2022));
        assert_eq!(snap.competitions, vec!["bl1"]);
        assert_eq!(snap.generation(), 4);
    }
}
