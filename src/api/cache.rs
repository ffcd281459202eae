//! Typed cache keys for API payloads.

use crate::cache::{DatasetKey, Key};

use super::types::{
  ChartAreaPoint, ClientMeeting, CommercialSectorCount, CommercialSectorSuccessRate,
  LeadSourceSuccessRate, LeadsSource, NewLeads, Reason, Salesman, SalesmanPerformance,
  SalesmanSuccessRate, SectionCards,
};

pub const SECTION_CARDS: Key<SectionCards> = Key::new(DatasetKey::SectionCards);
pub const CHART_AREA: Key<Vec<ChartAreaPoint>> = Key::new(DatasetKey::ChartArea);
pub const CLIENT_MEETINGS: Key<Vec<ClientMeeting>> = Key::new(DatasetKey::ClientMeetings);
pub const NEW_LEADS: Key<Vec<NewLeads>> = Key::new(DatasetKey::NewLeads);
pub const REASONS: Key<Vec<Reason>> = Key::new(DatasetKey::Reasons);
pub const LEADS_SOURCE: Key<Vec<LeadsSource>> = Key::new(DatasetKey::LeadsSource);
pub const COMMERCIAL_SECTORS: Key<Vec<CommercialSectorCount>> =
  Key::new(DatasetKey::CommercialSectors);
pub const LEADS_SOURCE_SUCCESS_RATE: Key<Vec<LeadSourceSuccessRate>> =
  Key::new(DatasetKey::LeadsSourceSuccessRate);
pub const COMMERCIAL_SECTOR_SUCCESS_RATE: Key<Vec<CommercialSectorSuccessRate>> =
  Key::new(DatasetKey::CommercialSectorSuccessRate);
pub const SALESMEN: Key<Vec<Salesman>> = Key::new(DatasetKey::Salesmen);
pub const SALESMAN_PERFORMANCE: Key<Vec<SalesmanPerformance>> =
  Key::new(DatasetKey::SalesmanPerformance);

/// Per-salesman success rate breakdown.
pub fn salesman_success_rate(salesman_id: u64) -> Key<Vec<SalesmanSuccessRate>> {
  Key::new(DatasetKey::SalesmanSuccessRate { salesman_id })
}
