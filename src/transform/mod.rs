//! Pure functions turning API records into chart-ready shapes.

pub mod category;
pub mod meetings;
pub mod performance;
pub mod series;
pub mod success_rate;
pub mod time_range;
pub mod trending;

pub use meetings::{filter_meetings, meetings_summary, sort_meetings, MeetingFilter, MeetingSort};
pub use performance::{cumulative_totals, monthly_breakdown, summarize_new_leads};
pub use series::{commercial_sector_series, leads_source_series, reason_series, series_total};
pub use success_rate::{
  commercial_sector_success_entries, lead_source_success_entries, success_rate_summary,
};
pub use time_range::{filter_by_time_range, TimeRange};
pub use trending::summary_cards;
