//! Time window filtering for the closed/open area chart.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::str::FromStr;

use crate::api::types::ChartAreaPoint;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
  #[default]
  All,
  Last90Days,
  Last30Days,
}

impl TimeRange {
  fn window(self) -> Option<Duration> {
    match self {
      Self::All => None,
      Self::Last90Days => Some(Duration::days(90)),
      Self::Last30Days => Some(Duration::days(30)),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Last90Days => "90d",
      Self::Last30Days => "30d",
    }
  }
}

impl FromStr for TimeRange {
  type Err = std::convert::Infallible;

  /// Unrecognized ranges mean the full series.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "90d" => Self::Last90Days,
      "30d" => Self::Last30Days,
      _ => Self::All,
    })
  }
}

/// Parse an API date: RFC 3339 timestamp or a bare `YYYY-MM-DD`.
pub fn parse_point_date(date: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(date, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

/// Sort ascending by date and keep the points inside `range`.
///
/// The window is anchored on the latest date in the data, not on the current
/// time. Points whose date does not parse sort first and are dropped by any
/// windowed range.
pub fn filter_by_time_range(points: &[ChartAreaPoint], range: TimeRange) -> Vec<ChartAreaPoint> {
  let mut dated: Vec<(Option<DateTime<Utc>>, &ChartAreaPoint)> = points
    .iter()
    .map(|point| (parse_point_date(&point.date), point))
    .collect();
  dated.sort_by_key(|(date, _)| *date);

  let Some(window) = range.window() else {
    return dated.into_iter().map(|(_, point)| point.clone()).collect();
  };

  let Some(anchor) = dated.iter().filter_map(|(date, _)| *date).max() else {
    return Vec::new();
  };
  let cutoff = anchor - window;

  dated
    .into_iter()
    .filter(|(date, _)| date.is_some_and(|d| d >= cutoff))
    .map(|(_, point)| point.clone())
    .collect()
}
