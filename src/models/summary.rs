use super::{TravelerCategory, VehicleType};
use crate::logic::EmissionFactorTable;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Key of the per-category breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKey {
    Category(TravelerCategory),
    /// The segment's owning submission could not be found.
    Unresolved,
}

impl CategoryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Category(category) => category.as_str(),
            CategoryKey::Unresolved => "unknown",
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for CategoryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub carbon_footprint: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportTotals {
    pub distance: f64,
    pub trips: u64,
}

/// Event-level rollup, rebuilt on every query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub total_carbon_footprint: f64,
    pub total_distance: f64,
    pub total_hotel_nights: u64,
    pub transport_submissions_count: usize,
    pub accommodation_submissions_count: usize,
    pub by_user_type: BTreeMap<CategoryKey, CategoryTotals>,
    pub by_transport_type: BTreeMap<VehicleType, TransportTotals>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.transport_submissions_count == 0 && self.accommodation_submissions_count == 0
    }

    /// Trees needed to absorb the transport footprint in a year.
    pub fn trees_equivalent(&self, factors: &EmissionFactorTable) -> u64 {
        factors.trees_for(self.total_carbon_footprint)
    }
}
