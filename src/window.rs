//! window.rs
//!
//! The reporting period: one UTC calendar year, inclusive at both ends
//! (`YYYY-01-01T00:00:00Z` ..= `YYYY-12-31T23:59:59Z`).
//!
//! The same window drives three provider-facing representations:
//!   • the in-process filter over `pushed_at`
//!   • the `since`/`until` parameters of the commits endpoint
//!   • the `created:` qualifier of the issue search

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// First year a GitHub account can have activity in
pub const MIN_YEAR: i32 = 2008;
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    year: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ActivityWindow {
    /// Window covering `year`, or `None` outside `MIN_YEAR..=MAX_YEAR`.
    pub fn for_year(year: i32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
        let end = Utc.with_ymd_and_hms(year, 12, 31, 23, 59, 59).single()?;
        Some(Self { year, start, end })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// `since` parameter for the commits endpoint
    pub fn since_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `until` parameter for the commits endpoint
    pub fn until_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Date range for the search `created:` qualifier, e.g. `2025-01-01..2025-12-31`
    pub fn created_range(&self) -> String {
        format!(
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window() -> ActivityWindow {
        ActivityWindow::for_year(2025).unwrap()
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let w = window();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();

        assert!(w.contains(start));
        assert!(w.contains(end));
        assert!(!w.contains(start - Duration::seconds(1)));
        assert!(!w.contains(end + Duration::seconds(1)));
    }

    #[test]
    fn test_provider_params() {
        let w = window();
        assert_eq!(w.since_param(), "2025-01-01T00:00:00Z");
        assert_eq!(w.until_param(), "2025-12-31T23:59:59Z");
        assert_eq!(w.created_range(), "2025-01-01..2025-12-31");
    }

    #[test]
    fn test_year_range() {
        assert!(ActivityWindow::for_year(2007).is_none());
        assert!(ActivityWindow::for_year(10_000).is_none());
        assert_eq!(ActivityWindow::for_year(2008).map(|w| w.year()), Some(2008));
    }

    #[test]
    fn test_leap_year_end() {
        let w = ActivityWindow::for_year(2024).unwrap();
        assert!(w.contains(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()));
        assert!(w.start() <= w.end());
    }
}
