//! Summary card badges and descriptions.

use serde::Serialize;

use crate::api::types::{SectionCards, Trending};

/// Badge style for a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
  Default,
  Destructive,
  Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingInfo {
  pub variant: BadgeVariant,
  pub text: String,
}

/// Signed percentage, e.g. `+5%`, `-3%`, `0%`.
fn signed_percent(value: f64) -> String {
  let sign = if value > 0.0 {
    "+"
  } else if value < 0.0 {
    "-"
  } else {
    ""
  };
  format!("{}{}%", sign, value.abs())
}

pub fn trending_info(trending: Trending, value: f64) -> TrendingInfo {
  match trending {
    Trending::Up => TrendingInfo {
      variant: BadgeVariant::Default,
      text: format!("Trending up {}", signed_percent(value)),
    },
    Trending::Down => TrendingInfo {
      variant: BadgeVariant::Destructive,
      text: format!("Down {}", signed_percent(value)),
    },
    Trending::Stable => TrendingInfo {
      variant: BadgeVariant::Secondary,
      text: "Stable performance".to_string(),
    },
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
  Meetings,
  Closings,
  Rate,
  Average,
}

/// Short description for a summary card, picked from fixed thresholds.
pub fn personalized_description(metric: MetricKind, value: f64, trending: Trending) -> &'static str {
  match (metric, trending) {
    (MetricKind::Meetings, Trending::Up) if value > 100.0 => "Excellent networking activity",
    (MetricKind::Meetings, Trending::Up) => "Good meeting momentum",
    (MetricKind::Meetings, Trending::Down) if value < 50.0 => "Needs more client engagement",
    (MetricKind::Meetings, Trending::Down) => "Meeting activity declining",
    (MetricKind::Meetings, Trending::Stable) if value > 80.0 => "Consistent client engagement",
    (MetricKind::Meetings, Trending::Stable) => "Steady meeting pattern",

    (MetricKind::Closings, Trending::Up) if value > 50.0 => "Outstanding sales performance",
    (MetricKind::Closings, Trending::Up) => "Strong closing trend",
    (MetricKind::Closings, Trending::Down) if value < 20.0 => "Focus on conversion strategies",
    (MetricKind::Closings, Trending::Down) => "Sales need attention",
    (MetricKind::Closings, Trending::Stable) if value > 40.0 => "Reliable sales output",
    (MetricKind::Closings, Trending::Stable) => "Stable closing pattern",

    (MetricKind::Rate, Trending::Up) if value > 70.0 => "Exceptional conversion rate",
    (MetricKind::Rate, Trending::Up) => "Improving efficiency",
    (MetricKind::Rate, Trending::Down) if value < 40.0 => "Conversion needs improvement",
    (MetricKind::Rate, Trending::Down) => "Rate declining",
    (MetricKind::Rate, Trending::Stable) if value > 60.0 => "Good conversion efficiency",
    (MetricKind::Rate, Trending::Stable) => "Average closing rate",

    (MetricKind::Average, Trending::Up) if value > 10.0 => "Exceeding monthly targets",
    (MetricKind::Average, Trending::Up) => "Growing monthly output",
    (MetricKind::Average, Trending::Down) if value < 5.0 => "Below target performance",
    (MetricKind::Average, Trending::Down) => "Monthly output declining",
    (MetricKind::Average, Trending::Stable) if value > 7.0 => "Meeting monthly goals",
    (MetricKind::Average, Trending::Stable) => "Consistent monthly pace",
  }
}

/// One rendered summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCard {
  pub metric: MetricKind,
  pub value: f64,
  pub trending: TrendingInfo,
  pub description: &'static str,
}

fn card(metric: MetricKind, value: f64, trending: Trending, trending_value: f64) -> SummaryCard {
  SummaryCard {
    metric,
    value,
    trending: trending_info(trending, trending_value),
    description: personalized_description(metric, value, trending),
  }
}

/// The four summary cards in display order.
pub fn summary_cards(cards: &SectionCards) -> Vec<SummaryCard> {
  vec![
    card(
      MetricKind::Meetings,
      cards.total_client_meetings,
      cards.total_client_meetings_trending,
      cards.total_client_meetings_trending_value,
    ),
    card(
      MetricKind::Closings,
      cards.total_closings,
      cards.total_closings_trending,
      cards.total_closings_trending_value,
    ),
    card(
      MetricKind::Rate,
      cards.closing_rate,
      cards.closing_rate_trending,
      cards.closing_rate_trending_value,
    ),
    card(
      MetricKind::Average,
      cards.average_closings_per_month,
      cards.average_closings_per_month_trending,
      cards.average_closings_per_month_trending_value,
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_trending_text() {
    assert_eq!(trending_info(Trending::Up, 5.0).text, "Trending up +5%");
    assert_eq!(trending_info(Trending::Down, -3.5).text, "Down -3.5%");
    assert_eq!(trending_info(Trending::Down, 3.0).text, "Down +3%");
    assert_eq!(trending_info(Trending::Up, 0.0).text, "Trending up 0%");
    assert_eq!(trending_info(Trending::Stable, 9.0).text, "Stable performance");
    assert_eq!(
      trending_info(Trending::Down, -1.0).variant,
      BadgeVariant::Destructive
    );
  }

  #[test]
  fn test_descriptions_use_thresholds() {
    assert_eq!(
      personalized_description(MetricKind::Meetings, 101.0, Trending::Up),
      "Excellent networking activity"
    );
    assert_eq!(
      personalized_description(MetricKind::Meetings, 100.0, Trending::Up),
      "Good meeting momentum"
    );
    assert_eq!(
      personalized_description(MetricKind::Rate, 39.0, Trending::Down),
      "Conversion needs improvement"
    );
    assert_eq!(
      personalized_description(MetricKind::Average, 7.0, Trending::Stable),
      "Consistent monthly pace"
    );
  }

  #[test]
  fn test_summary_cards_order() {
    let cards = SectionCards {
      total_client_meetings: 60.0,
      total_client_meetings_trending: Trending::Stable,
      total_client_meetings_trending_value: 0.0,
      total_closings: 25.0,
      total_closings_trending: Trending::Up,
      total_closings_trending_value: 4.0,
      closing_rate: 41.6,
      closing_rate_trending: Trending::Down,
      closing_rate_trending_value: -2.0,
      average_closings_per_month: 12.0,
      average_closings_per_month_trending: Trending::Up,
      average_closings_per_month_trending_value: 1.0,
    };

    let rendered = summary_cards(&cards);
    let metrics: Vec<_> = rendered.iter().map(|c| c.metric).collect();
    assert_eq!(
      metrics,
      vec![
        MetricKind::Meetings,
        MetricKind::Closings,
        MetricKind::Rate,
        MetricKind::Average
      ]
    );
    assert_eq!(rendered[1].trending.text, "Trending up +4%");
    assert_eq!(rendered[3].description, "Exceeding monthly targets");
  }
}
