use super::Evaluator;
use crate::models::{
    AggregateResult, CategoryKey, SegmentRecord, Submission, SubmissionRecord, TravelerCategory,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Rolls stored submissions and their segments up into event totals.
///
/// The result does not depend on input order: segments are summed in a
/// canonical order so floating point totals are reproducible.
pub fn aggregate(submissions: &[SubmissionRecord], segments: &[SegmentRecord]) -> AggregateResult {
    let mut result = AggregateResult::default();

    let mut categories: HashMap<i64, TravelerCategory> = HashMap::with_capacity(submissions.len());
    for submission in submissions {
        categories
            .entry(submission.id)
            .and_modify(|existing| {
                warn!(id = submission.id, "duplicate submission id");
                *existing = (*existing).min(submission.user_type);
            })
            .or_insert(submission.user_type);

        if let Some(nights) = submission.hotel_nights.filter(|n| *n > 0) {
            result.total_hotel_nights += u64::from(nights);
            result.accommodation_submissions_count += 1;
        }
    }

    let with_transport: BTreeSet<i64> = segments.iter().map(|s| s.submission_id).collect();
    result.transport_submissions_count = with_transport.len();

    let mut ordered: Vec<&SegmentRecord> = segments.iter().collect();
    ordered.sort_by(|a, b| {
        a.submission_id
            .cmp(&b.submission_id)
            .then(a.vehicle_type.cmp(&b.vehicle_type))
            .then(a.distance.total_cmp(&b.distance))
            .then(a.calculated_footprint.total_cmp(&b.calculated_footprint))
    });

    for segment in ordered {
        let footprint = non_negative(segment.calculated_footprint);
        let distance = non_negative(segment.distance);

        result.total_carbon_footprint += footprint;
        result.total_distance += distance;

        let key = match categories.get(&segment.submission_id) {
            Some(category) => CategoryKey::Category(*category),
            None => {
                warn!(
                    submission_id = segment.submission_id,
                    "segment references an unknown submission"
                );
                CategoryKey::Unresolved
            }
        };
        let by_user = result.by_user_type.entry(key).or_default();
        by_user.carbon_footprint += footprint;
        by_user.distance += distance;

        match segment.vehicle_type {
            Some(vehicle_type) => {
                let by_transport = result.by_transport_type.entry(vehicle_type).or_default();
                by_transport.distance += distance;
                by_transport.trips += 1;
            }
            None => debug!(
                submission_id = segment.submission_id,
                "segment without a vehicle type left out of the transport breakdown"
            ),
        }
    }

    result
}

/// Derives stored records from full submissions and aggregates them.
pub fn aggregate_submissions(evaluator: &Evaluator<'_>, submissions: &[Submission]) -> AggregateResult {
    let mut records = Vec::with_capacity(submissions.len());
    let mut segments = Vec::new();

    for submission in submissions {
        let (record, submission_segments) = submission.to_records(evaluator);
        records.push(record);
        segments.extend(submission_segments);
    }

    aggregate(&records, &segments)
}

/// Stored numbers that are negative or non-finite count as 0.
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
