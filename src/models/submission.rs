use super::{
    lenient_count, lenient_tag, normalize_tag, null_as_zero, Tag, TravelSegment, VehicleType,
};
use crate::logic::Evaluator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role-based classification of a submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TravelerCategory {
    Public,
    Participant,
    EventStaffAccredited,
    InternalStaffOrganization,
    TransportServicesStakeholders,
    Provider,
    Logistics,
    Staff,
    Other,
    /// Upstream supplied a category outside the known set.
    Unrecognized,
}

impl TravelerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelerCategory::Public => "public",
            TravelerCategory::Participant => "participant",
            TravelerCategory::EventStaffAccredited => "event_staff_accredited",
            TravelerCategory::InternalStaffOrganization => "internal_staff_organization",
            TravelerCategory::TransportServicesStakeholders => "transport_services_stakeholders",
            TravelerCategory::Provider => "provider",
            TravelerCategory::Logistics => "logistics",
            TravelerCategory::Staff => "staff",
            TravelerCategory::Other => "other",
            TravelerCategory::Unrecognized => "unrecognized",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_tag(s).as_str() {
            "public" => Some(TravelerCategory::Public),
            "participant" => Some(TravelerCategory::Participant),
            "eventstaffaccredited" => Some(TravelerCategory::EventStaffAccredited),
            "internalstafforganization" => Some(TravelerCategory::InternalStaffOrganization),
            "transportservicesstakeholders" => {
                Some(TravelerCategory::TransportServicesStakeholders)
            }
            "provider" => Some(TravelerCategory::Provider),
            "logistics" => Some(TravelerCategory::Logistics),
            "staff" => Some(TravelerCategory::Staff),
            "other" => Some(TravelerCategory::Other),
            "unrecognized" => Some(TravelerCategory::Unrecognized),
            _ => None,
        }
    }

    /// Categories whose questionnaire asks for accommodation.
    pub fn requires_accommodation(&self) -> bool {
        matches!(
            self,
            TravelerCategory::Public | TravelerCategory::EventStaffAccredited
        )
    }
}

impl std::fmt::Display for TravelerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TravelerCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TravelerCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value).unwrap_or(TravelerCategory::Unrecognized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccreditedRole {
    Loc,
    Vip,
    Timing,
    Photo,
    Media,
    TvProduction,
    SportsDelegations,
    OtherAccreditedRole,
}

impl AccreditedRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccreditedRole::Loc => "loc",
            AccreditedRole::Vip => "vip",
            AccreditedRole::Timing => "timing",
            AccreditedRole::Photo => "photo",
            AccreditedRole::Media => "media",
            AccreditedRole::TvProduction => "tv_production",
            AccreditedRole::SportsDelegations => "sports_delegations",
            AccreditedRole::OtherAccreditedRole => "other_accredited_role",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_tag(s).as_str() {
            "loc" => Some(AccreditedRole::Loc),
            "vip" => Some(AccreditedRole::Vip),
            "timing" => Some(AccreditedRole::Timing),
            "photo" => Some(AccreditedRole::Photo),
            "media" => Some(AccreditedRole::Media),
            "tvproduction" => Some(AccreditedRole::TvProduction),
            "sportsdelegations" => Some(AccreditedRole::SportsDelegations),
            "otheraccreditedrole" => Some(AccreditedRole::OtherAccreditedRole),
            _ => None,
        }
    }
}

impl Tag for AccreditedRole {
    fn parse_tag(s: &str) -> Option<Self> {
        Self::from_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportServiceType {
    SpectatorShuttleBus,
    TeamTransportServices,
}

impl TransportServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportServiceType::SpectatorShuttleBus => "spectator_shuttle_bus",
            TransportServiceType::TeamTransportServices => "team_transport_services",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_tag(s).as_str() {
            "spectatorshuttlebus" => Some(TransportServiceType::SpectatorShuttleBus),
            "teamtransportservices" => Some(TransportServiceType::TeamTransportServices),
            _ => None,
        }
    }
}

impl Tag for TransportServiceType {
    fn parse_tag(s: &str) -> Option<Self> {
        Self::from_str(s)
    }
}

/// One traveler's full questionnaire response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub user_type: TravelerCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type_other_details: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub accredited_role: Option<AccreditedRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accredited_role_other_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_staff_details: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub transport_service_type: Option<TransportServiceType>,
    #[serde(default)]
    pub segments: Vec<TravelSegment>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub hotel_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn new(id: i64, user_type: TravelerCategory) -> Self {
        Self {
            id,
            event_id: None,
            user_type,
            user_type_other_details: None,
            accredited_role: None,
            accredited_role_other_details: None,
            organization_staff_details: None,
            transport_service_type: None,
            segments: Vec::new(),
            hotel_nights: None,
            comments: None,
            created_at: None,
        }
    }

    pub fn with_event(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn with_segment(mut self, segment: TravelSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_hotel_nights(mut self, nights: u32) -> Self {
        self.hotel_nights = Some(nights);
        self
    }

    pub fn with_comments(mut self, comments: &str) -> Self {
        self.comments = Some(comments.to_string());
        self
    }

    pub fn with_role(mut self, role: AccreditedRole) -> Self {
        self.accredited_role = Some(role);
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// True when the submitter's category is asked about accommodation but reported none.
    pub fn missing_accommodation(&self) -> bool {
        self.user_type.requires_accommodation() && self.hotel_nights.unwrap_or(0) == 0
    }

    /// Splits the submission into the rows a store keeps, precomputing each segment's footprint.
    /// Stored distance is the single-occurrence distance, clamped like the evaluator's.
    pub fn to_records(&self, evaluator: &Evaluator<'_>) -> (SubmissionRecord, Vec<SegmentRecord>) {
        let record = SubmissionRecord {
            id: self.id,
            user_type: self.user_type,
            hotel_nights: self.hotel_nights,
        };

        let segments = self
            .segments
            .iter()
            .map(|segment| SegmentRecord {
                submission_id: self.id,
                vehicle_type: segment.vehicle_type,
                distance: segment.distance_km(),
                calculated_footprint: evaluator.segment_footprint(segment),
            })
            .collect();

        (record, segments)
    }
}

/// Stored submission row, as read back for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: i64,
    pub user_type: TravelerCategory,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub hotel_nights: Option<u32>,
}

impl SubmissionRecord {
    pub fn new(id: i64, user_type: TravelerCategory) -> Self {
        Self {
            id,
            user_type,
            hotel_nights: None,
        }
    }

    pub fn with_hotel_nights(mut self, nights: u32) -> Self {
        self.hotel_nights = Some(nights);
        self
    }
}

/// Stored segment row carrying its precomputed footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    pub submission_id: i64,
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub distance: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub calculated_footprint: f64,
}

impl SegmentRecord {
    pub fn new(
        submission_id: i64,
        vehicle_type: Option<VehicleType>,
        distance: f64,
        calculated_footprint: f64,
    ) -> Self {
        Self {
            submission_id,
            vehicle_type,
            distance,
            calculated_footprint,
        }
    }
}
