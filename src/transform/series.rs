//! Categorical chart series (pie and bar charts).

use serde::Serialize;

use super::category::{color_for, label_for, Category, CommercialSector, LeadSource};
use crate::api::types::{CommercialSectorCount, LeadsSource, Reason};

/// Raw category count as delivered by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
  pub code: String,
  pub quantity: f64,
}

impl From<&LeadsSource> for CategoryCount {
  fn from(item: &LeadsSource) -> Self {
    Self {
      code: item.source.clone(),
      quantity: item.quantity,
    }
  }
}

impl From<&CommercialSectorCount> for CategoryCount {
  fn from(item: &CommercialSectorCount) -> Self {
    Self {
      code: item.commercial_sector.clone(),
      quantity: item.quantity,
    }
  }
}

impl From<&Reason> for CategoryCount {
  fn from(item: &Reason) -> Self {
    Self {
      code: item.reason.clone(),
      quantity: item.quantity,
    }
  }
}

/// One chart-ready slice or bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeriesEntry {
  /// Lowercased raw code
  pub key: String,
  pub value: f64,
  pub color_token: String,
  pub label: String,
}

/// Map raw counts to colored, labeled entries. Never fails on unknown codes.
pub fn to_chart_series<C: Category>(raw: &[CategoryCount]) -> Vec<ChartSeriesEntry> {
  raw
    .iter()
    .enumerate()
    .map(|(index, item)| ChartSeriesEntry {
      key: item.code.to_lowercase(),
      value: item.quantity,
      color_token: color_for::<C>(&item.code, index).to_string(),
      label: label_for::<C>(&item.code),
    })
    .collect()
}

pub fn leads_source_series(raw: &[LeadsSource]) -> Vec<ChartSeriesEntry> {
  let counts: Vec<CategoryCount> = raw.iter().map(CategoryCount::from).collect();
  to_chart_series::<LeadSource>(&counts)
}

pub fn commercial_sector_series(raw: &[CommercialSectorCount]) -> Vec<ChartSeriesEntry> {
  let counts: Vec<CategoryCount> = raw.iter().map(CategoryCount::from).collect();
  to_chart_series::<CommercialSector>(&counts)
}

/// Reasons are free text, so every entry takes a palette color.
pub fn reason_series(raw: &[Reason]) -> Vec<ChartSeriesEntry> {
  let counts: Vec<CategoryCount> = raw.iter().map(CategoryCount::from).collect();
  to_chart_series::<FreeText>(&counts)
}

/// Sum of all values, for the chart's center label.
pub fn series_total(series: &[ChartSeriesEntry]) -> f64 {
  series.iter().map(|entry| entry.value).sum()
}

/// Category with no known codes.
#[derive(Debug, Clone, Copy)]
enum FreeText {}

impl Category for FreeText {
  fn from_code(_code: &str) -> Option<Self> {
    None
  }

  fn label(self) -> &'static str {
    match self {}
  }

  fn color(self) -> Option<&'static str> {
    match self {}
  }
}
