//! Client meetings table: filtering and ordering.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

use super::time_range::parse_point_date;
use crate::api::types::ClientMeeting;

/// Table filters. `None` disables a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingFilter {
  /// Case-insensitive match against client name and email
  pub search: Option<String>,
  pub salesman: Option<String>,
  pub closed: Option<bool>,
}

impl MeetingFilter {
  pub fn matches(&self, meeting: &ClientMeeting) -> bool {
    if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
      let needle = search.trim().to_lowercase();
      if !meeting.name.to_lowercase().contains(&needle)
        && !meeting.email.to_lowercase().contains(&needle)
      {
        return false;
      }
    }

    if let Some(salesman) = &self.salesman {
      if &meeting.salesman_name != salesman {
        return false;
      }
    }

    self.closed.map_or(true, |closed| meeting.closed == closed)
  }
}

pub fn filter_meetings(meetings: &[ClientMeeting], filter: &MeetingFilter) -> Vec<ClientMeeting> {
  meetings
    .iter()
    .filter(|m| filter.matches(m))
    .cloned()
    .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
  #[default]
  Date,
  Name,
  Salesman,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

/// Table ordering. The default shows the most recent meetings first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeetingSort {
  pub field: SortField,
  pub direction: SortDirection,
}

impl FromStr for MeetingSort {
  type Err = String;

  /// Parses `field` or `field:asc|desc`, e.g. `name:asc`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (field, direction) = s.split_once(':').unwrap_or((s, "desc"));

    let field = match field {
      "date" => SortField::Date,
      "name" => SortField::Name,
      "salesman" => SortField::Salesman,
      other => return Err(format!("Unknown sort field: {}", other)),
    };
    let direction = match direction {
      "asc" => SortDirection::Asc,
      "desc" => SortDirection::Desc,
      other => return Err(format!("Unknown sort direction: {}", other)),
    };

    Ok(Self { field, direction })
  }
}

/// Sort in place. Ties keep their incoming order.
pub fn sort_meetings(meetings: &mut [ClientMeeting], sort: MeetingSort) {
  meetings.sort_by(|a, b| {
    let ordering = compare(a, b, sort.field);
    match sort.direction {
      SortDirection::Asc => ordering,
      SortDirection::Desc => ordering.reverse(),
    }
  });
}

fn compare(a: &ClientMeeting, b: &ClientMeeting, field: SortField) -> Ordering {
  match field {
    SortField::Date => parse_point_date(&a.date).cmp(&parse_point_date(&b.date)),
    SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    SortField::Salesman => a
      .salesman_name
      .to_lowercase()
      .cmp(&b.salesman_name.to_lowercase()),
  }
}

/// Header counts for the meetings table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingsSummary {
  pub total_meetings: usize,
  /// Meetings dated in the same calendar month and year as `now`
  pub this_month: usize,
  pub open_meetings: usize,
  pub closed_meetings: usize,
}

/// Count meetings by state and by whether they fall in `now`'s month.
///
/// Dates that do not parse are left out of `this_month` only.
pub fn meetings_summary(meetings: &[ClientMeeting], now: DateTime<Utc>) -> MeetingsSummary {
  meetings
    .iter()
    .fold(MeetingsSummary::default(), |mut summary, meeting| {
      summary.total_meetings += 1;
      if meeting.closed {
        summary.closed_meetings += 1;
      } else {
        summary.open_meetings += 1;
      }
      if parse_point_date(&meeting.date)
        .is_some_and(|date| date.year() == now.year() && date.month() == now.month())
      {
        summary.this_month += 1;
      }
      summary
    })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn meeting(id: u64, name: &str, salesman: &str, date: &str, closed: bool) -> ClientMeeting {
    ClientMeeting {
      id,
      name: name.to_string(),
      email: format!("{}@mail.cl", name.to_lowercase()),
      phone: "+56 9 1234 5678".to_string(),
      salesman_name: salesman.to_string(),
      salesman_id: 1,
      date: date.to_string(),
      closed,
      transcription: String::new(),
      created_at: "2024-01-01T00:00:00Z".to_string(),
      updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
  }

  fn meetings() -> Vec<ClientMeeting> {
    vec![
      meeting(1, "Camila", "Toro", "2024-03-02", true),
      meeting(2, "andres", "Boris", "2024-01-15", false),
      meeting(3, "Beatriz", "Toro", "2024-02-20", false),
    ]
  }

  fn ids(meetings: &[ClientMeeting]) -> Vec<u64> {
    meetings.iter().map(|m| m.id).collect()
  }

  #[test]
  fn test_default_filter_keeps_everything() {
    assert_eq!(filter_meetings(&meetings(), &MeetingFilter::default()).len(), 3);
  }

  #[test]
  fn test_search_matches_name_or_email() {
    let filter = MeetingFilter {
      search: Some("CAMI".to_string()),
      ..Default::default()
    };
    assert_eq!(ids(&filter_meetings(&meetings(), &filter)), vec![1]);

    let filter = MeetingFilter {
      search: Some("beatriz@".to_string()),
      ..Default::default()
    };
    assert_eq!(ids(&filter_meetings(&meetings(), &filter)), vec![3]);
  }

  #[test]
  fn test_filters_combine() {
    let filter = MeetingFilter {
      search: None,
      salesman: Some("Toro".to_string()),
      closed: Some(false),
    };
    assert_eq!(ids(&filter_meetings(&meetings(), &filter)), vec![3]);
  }

  #[test]
  fn test_sort_by_date_desc_by_default() {
    let mut rows = meetings();
    sort_meetings(&mut rows, MeetingSort::default());
    assert_eq!(ids(&rows), vec![1, 3, 2]);
  }

  #[test]
  fn test_sort_by_name_ignores_case() {
    let mut rows = meetings();
    sort_meetings(&mut rows, "name:asc".parse().unwrap());
    assert_eq!(ids(&rows), vec![2, 3, 1]);
  }

  #[test]
  fn test_sort_by_salesman_is_stable() {
    let mut rows = meetings();
    sort_meetings(
      &mut rows,
      MeetingSort {
        field: SortField::Salesman,
        direction: SortDirection::Asc,
      },
    );
    assert_eq!(ids(&rows), vec![2, 1, 3]);
  }

  #[test]
  fn test_parse_sort() {
    assert_eq!(
      "salesman".parse::<MeetingSort>(),
      Ok(MeetingSort {
        field: SortField::Salesman,
        direction: SortDirection::Desc
      })
    );
    assert!("price:asc".parse::<MeetingSort>().is_err());
    assert!("date:up".parse::<MeetingSort>().is_err());
  }

  #[test]
  fn test_meetings_summary() {
    let now = DateTime::parse_from_rfc3339("2024-03-15T12:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let mut rows = meetings();
    rows.push(meeting(4, "Diego", "Boris", "2023-03-10", true));
    rows.push(meeting(5, "Elena", "Boris", "2024-03-31T23:00:00Z", false));
    rows.push(meeting(6, "Fabian", "Toro", "someday", false));

    assert_eq!(
      meetings_summary(&rows, now),
      MeetingsSummary {
        total_meetings: 6,
        this_month: 2,
        open_meetings: 4,
        closed_meetings: 2,
      }
    );
  }

  #[test]
  fn test_meetings_summary_empty() {
    assert_eq!(meetings_summary(&[], Utc::now()), MeetingsSummary::default());
  }
}
