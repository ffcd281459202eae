//! Success rate breakdowns and their three-bucket coloring.

use serde::Serialize;

use super::category::{label_for, Category, CommercialSector, LeadSource};
use crate::api::types::{CommercialSectorSuccessRate, LeadSourceSuccessRate};

pub const GREEN: &str = "hsl(142, 76%, 36%)";
pub const RED: &str = "hsl(0, 84%, 60%)";
pub const AMBER: &str = "hsl(43, 89%, 38%)";

/// Step color for a success percentage: `>= 60` green, `<= 40` red, amber between.
pub fn success_rate_color(rate: f64) -> &'static str {
  if rate >= 60.0 {
    GREEN
  } else if rate <= 40.0 {
    RED
  } else {
    AMBER
  }
}

/// Raw success rate record for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessRateInput {
  pub category: String,
  pub closed: i64,
  pub not_closed: i64,
  pub success_rate: f64,
}

impl From<&LeadSourceSuccessRate> for SuccessRateInput {
  fn from(item: &LeadSourceSuccessRate) -> Self {
    Self {
      category: item.lead_source.clone(),
      closed: item.closed,
      not_closed: item.not_closed,
      success_rate: item.success_rate,
    }
  }
}

impl From<&CommercialSectorSuccessRate> for SuccessRateInput {
  fn from(item: &CommercialSectorSuccessRate) -> Self {
    Self {
      category: item.commercial_sector.clone(),
      closed: item.closed,
      not_closed: item.not_closed,
      success_rate: item.success_rate,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRateEntry {
  pub category: String,
  pub closed: i64,
  pub not_closed: i64,
  pub success_rate: f64,
  /// Always `closed + not_closed`
  pub total: i64,
  pub color_token: String,
  pub label: String,
  pub closed_color: String,
  pub not_closed_color: String,
}

/// Derive display entries. Rates and counts are passed through unclamped.
pub fn to_success_rate_entries<C: Category>(raw: &[SuccessRateInput]) -> Vec<SuccessRateEntry> {
  raw
    .iter()
    .map(|item| SuccessRateEntry {
      category: item.category.clone(),
      closed: item.closed,
      not_closed: item.not_closed,
      success_rate: item.success_rate,
      total: item.closed.saturating_add(item.not_closed),
      color_token: success_rate_color(item.success_rate).to_string(),
      label: label_for::<C>(&item.category),
      closed_color: GREEN.to_string(),
      not_closed_color: RED.to_string(),
    })
    .collect()
}

pub fn lead_source_success_entries(raw: &[LeadSourceSuccessRate]) -> Vec<SuccessRateEntry> {
  let inputs: Vec<SuccessRateInput> = raw.iter().map(SuccessRateInput::from).collect();
  to_success_rate_entries::<LeadSource>(&inputs)
}

/// Also used for a single salesman's per-sector breakdown.
pub fn commercial_sector_success_entries(
  raw: &[CommercialSectorSuccessRate],
) -> Vec<SuccessRateEntry> {
  let inputs: Vec<SuccessRateInput> = raw.iter().map(SuccessRateInput::from).collect();
  to_success_rate_entries::<CommercialSector>(&inputs)
}

/// Totals across a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRateSummary {
  pub total: i64,
  pub closed: i64,
  pub not_closed: i64,
  /// Rounded percentage, 0 when there is nothing to rate
  pub overall_rate: i64,
}

pub fn success_rate_summary(entries: &[SuccessRateEntry]) -> SuccessRateSummary {
  let total = entries.iter().map(|e| e.total).fold(0, i64::saturating_add);
  let closed = entries.iter().map(|e| e.closed).fold(0, i64::saturating_add);
  let not_closed = entries
    .iter()
    .map(|e| e.not_closed)
    .fold(0, i64::saturating_add);

  let overall_rate = if total != 0 {
    (closed as f64 / total as f64 * 100.0).round() as i64
  } else {
    0
  };

  SuccessRateSummary {
    total,
    closed,
    not_closed,
    overall_rate,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(category: &str, closed: i64, not_closed: i64, success_rate: f64) -> SuccessRateInput {
    SuccessRateInput {
      category: category.to_string(),
      closed,
      not_closed,
      success_rate,
    }
  }

  #[test]
  fn test_color_boundaries() {
    assert_eq!(success_rate_color(60.0), GREEN);
    assert_eq!(success_rate_color(60.1), GREEN);
    assert_eq!(success_rate_color(100.0), GREEN);
    assert_eq!(success_rate_color(59.9), AMBER);
    assert_eq!(success_rate_color(50.0), AMBER);
    assert_eq!(success_rate_color(40.1), AMBER);
    assert_eq!(success_rate_color(40.0), RED);
    assert_eq!(success_rate_color(0.0), RED);
  }

  #[test]
  fn test_out_of_range_rates_are_not_clamped() {
    assert_eq!(success_rate_color(150.0), GREEN);
    assert_eq!(success_rate_color(-5.0), RED);

    let entries = to_success_rate_entries::<LeadSource>(&[input("EVENT", 1, 1, 250.0)]);
    assert_eq!(entries[0].success_rate, 250.0);
  }

  #[test]
  fn test_organic_search_entry() {
    let entries = to_success_rate_entries::<LeadSource>(&[input("ORGANIC_SEARCH", 7, 1, 87.5)]);

    let entry = &entries[0];
    assert_eq!(entry.total, 8);
    assert_eq!(entry.color_token, GREEN);
    assert_eq!(entry.label, "Organic Search");
    assert_eq!(entry.closed_color, GREEN);
    assert_eq!(entry.not_closed_color, RED);
  }

  #[test]
  fn test_lead_source_records() {
    let raw = vec![
      LeadSourceSuccessRate {
        lead_source: "REFERRAL".to_string(),
        closed: 11,
        not_closed: 8,
        success_rate: 57.89,
      },
      LeadSourceSuccessRate {
        lead_source: "OTHER".to_string(),
        closed: 0,
        not_closed: 1,
        success_rate: 0.0,
      },
    ];
    let entries = lead_source_success_entries(&raw);

    assert_eq!(entries[0].color_token, AMBER);
    assert_eq!(entries[0].total, 19);
    assert_eq!(entries[1].color_token, RED);
    assert_eq!(entries[1].label, "Other");
  }

  #[test]
  fn test_sector_records_unknown_category() {
    let raw = vec![CommercialSectorSuccessRate {
      commercial_sector: "MINING".to_string(),
      closed: 2,
      not_closed: 2,
      success_rate: 50.0,
    }];
    let entries = commercial_sector_success_entries(&raw);
    assert_eq!(entries[0].label, "MINING");
    assert_eq!(entries[0].color_token, AMBER);
  }

  #[test]
  fn test_summary() {
    let entries = to_success_rate_entries::<CommercialSector>(&[
      input("RETAIL", 3, 1, 75.0),
      input("ENERGY", 1, 3, 25.0),
    ]);
    let summary = success_rate_summary(&entries);
    assert_eq!(summary.total, 8);
    assert_eq!(summary.closed, 4);
    assert_eq!(summary.not_closed, 4);
    assert_eq!(summary.overall_rate, 50);

    assert_eq!(success_rate_summary(&[]).overall_rate, 0);
  }

  #[test]
  fn test_negative_counts_from_the_wire() {
    let raw: Vec<LeadSourceSuccessRate> = serde_json::from_str(
      r#"[{"leadSource":"EVENT","closed":-1,"notClosed":3,"successRate":120}]"#,
    )
    .unwrap();

    let entries = lead_source_success_entries(&raw);
    assert_eq!(entries[0].closed, -1);
    assert_eq!(entries[0].total, 2);
    assert_eq!(entries[0].success_rate, 120.0);
    assert_eq!(entries[0].color_token, GREEN);
    assert_eq!(success_rate_summary(&entries).overall_rate, -50);
  }

  #[test]
  fn test_total_saturates() {
    let entries = to_success_rate_entries::<LeadSource>(&[input("EVENT", i64::MAX, 1, 99.0)]);
    assert_eq!(entries[0].total, i64::MAX);
  }
}
