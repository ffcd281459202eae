//! Salesman performance series and new-leads totals.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::api::types::{NewLeads, SalesmanPerformance};

/// Closed and open meetings for one salesman in one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
  pub total: i64,
  pub closed: i64,
}

/// One month with a value per salesman. Salesmen without data read zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
  pub month: String,
  pub by_salesman: BTreeMap<String, MonthTotals>,
}

/// Running totals up to and including `month`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
  pub month: String,
  pub total: i64,
  pub closed: i64,
}

/// Salesmen named in `selected`, or all of them when the selection is empty.
fn selected_salesmen<'a>(
  performance: &'a [SalesmanPerformance],
  selected: &[String],
) -> Vec<&'a SalesmanPerformance> {
  performance
    .iter()
    .filter(|p| selected.is_empty() || selected.contains(&p.salesman_name))
    .collect()
}

/// Distinct months across the selection, ascending (`YYYY-MM` sorts lexically).
fn months(performance: &[&SalesmanPerformance]) -> Vec<String> {
  performance
    .iter()
    .flat_map(|p| p.data.iter().map(|m| m.month.clone()))
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

fn totals_for(salesman: &SalesmanPerformance, month: &str) -> Option<MonthTotals> {
  salesman
    .data
    .iter()
    .find(|m| m.month == month)
    .map(|m| MonthTotals {
      total: m.total_meetings,
      closed: m.closed_meetings,
    })
}

pub fn monthly_breakdown(
  performance: &[SalesmanPerformance],
  selected: &[String],
) -> Vec<MonthlyBreakdown> {
  let salesmen = selected_salesmen(performance, selected);

  months(&salesmen)
    .into_iter()
    .map(|month| {
      let by_salesman = salesmen
        .iter()
        .map(|s| {
          (
            s.salesman_name.clone(),
            totals_for(s, &month).unwrap_or_default(),
          )
        })
        .collect();
      MonthlyBreakdown { month, by_salesman }
    })
    .collect()
}

pub fn cumulative_totals(
  performance: &[SalesmanPerformance],
  selected: &[String],
) -> Vec<CumulativePoint> {
  let salesmen = selected_salesmen(performance, selected);
  let mut total: i64 = 0;
  let mut closed: i64 = 0;

  months(&salesmen)
    .into_iter()
    .map(|month| {
      for salesman in &salesmen {
        if let Some(m) = totals_for(salesman, &month) {
          total = i64::saturating_add(total, m.total);
          closed = i64::saturating_add(closed, m.closed);
        }
      }
      CumulativePoint {
        month,
        total,
        closed,
      }
    })
    .collect()
}

/// Totals across the new-leads bar series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeadsSummary {
  pub total_closed: i64,
  pub total_not_closed: i64,
  /// Share of closed meetings with one decimal, `"0.0"` when there are none
  pub closed_percentage: String,
  /// Largest closed + not-closed in any single range
  pub peak: i64,
}

fn saturating_sum(values: impl Iterator<Item = i64>) -> i64 {
  values.fold(0, i64::saturating_add)
}

pub fn summarize_new_leads(leads: &[NewLeads]) -> NewLeadsSummary {
  let total_closed = saturating_sum(leads.iter().map(|l| l.meetings_closed));
  let total_not_closed = saturating_sum(leads.iter().map(|l| l.not_closed));
  let total = total_closed.saturating_add(total_not_closed);

  let closed_percentage = if total == 0 {
    "0.0".to_string()
  } else {
    format!("{:.1}", total_closed as f64 / total as f64 * 100.0)
  };

  NewLeadsSummary {
    total_closed,
    total_not_closed,
    closed_percentage,
    peak: leads
      .iter()
      .map(|l| l.meetings_closed.saturating_add(l.not_closed))
      .max()
      .unwrap_or(0),
  }
}
