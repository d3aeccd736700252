use super::EmissionFactorTable;
use crate::models::{Submission, TravelSegment, Trip, Vehicle, VehicleType};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Maps travel segments onto kg CO2e using a borrowed factor table.
///
/// Never fails: a segment whose categorical fields cannot be resolved
/// contributes zero.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    factors: &'a EmissionFactorTable,
}

/// Distance travelled, in total and per vehicle type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceBreakdown {
    pub total_distance: f64,
    pub by_vehicle_type: BTreeMap<VehicleType, f64>,
}

impl<'a> Evaluator<'a> {
    pub fn new(factors: &'a EmissionFactorTable) -> Self {
        Self { factors }
    }

    pub fn factors(&self) -> &'a EmissionFactorTable {
        self.factors
    }

    pub fn segment_footprint(&self, segment: &TravelSegment) -> f64 {
        match segment.trip() {
            Some(trip) => self.trip_footprint(&trip),
            None => {
                debug!("segment without a vehicle type contributes no emissions");
                0.0
            }
        }
    }

    pub fn trip_footprint(&self, trip: &Trip) -> f64 {
        let f = self.factors;
        let distance = trip.distance_km();
        let passengers = f64::from(trip.passengers());

        let per_occurrence = match trip.vehicle() {
            Vehicle::Walking | Vehicle::Bicycle => 0.0,
            Vehicle::Car { fuel } => match fuel.and_then(|fuel| f.car.get(fuel)) {
                Some(factor) => factor * distance / passengers,
                None => {
                    debug!(?fuel, "car without a tabulated fuel type contributes no emissions");
                    0.0
                }
            },
            Vehicle::Van { fuel, .. } => match fuel.and_then(|fuel| f.van.get(fuel)) {
                Some(factor) => factor * distance / passengers,
                None => {
                    debug!(?fuel, "van without a tabulated fuel type contributes no emissions");
                    0.0
                }
            },
            Vehicle::Motorcycle => {
                // A lone rider is the unset default; assume the usual occupancy
                let occupancy = if trip.passengers() == 1 {
                    f.motorcycle_default_occupancy.max(1)
                } else {
                    trip.passengers()
                };
                f.motorcycle * distance / f64::from(occupancy)
            }
            Vehicle::Bus { compensated } => self.per_passenger(f.bus, trip, compensated),
            Vehicle::Train { compensated } => self.per_passenger(f.train, trip, compensated),
            Vehicle::Plane { compensated } => self.per_passenger(f.plane, trip, compensated),
            Vehicle::Truck { size } => match size.and_then(|size| f.truck.get(size)) {
                Some(factor) => factor * distance,
                None => {
                    debug!(?size, "truck without a tabulated size contributes no emissions");
                    0.0
                }
            },
            Vehicle::Other => f.other * distance,
        };

        per_occurrence * trip.multiplier()
    }

    fn per_passenger(&self, factor: f64, trip: &Trip, compensated: bool) -> f64 {
        let emissions = factor * trip.distance_km() * f64::from(trip.passengers());
        if compensated {
            emissions * self.factors.compensation_factor
        } else {
            emissions
        }
    }

    pub fn hotel_footprint(&self, nights: u32) -> f64 {
        f64::from(nights) * self.factors.hotel_per_night
    }

    pub fn total_footprint(&self, segments: &[TravelSegment], hotel_nights: Option<u32>) -> f64 {
        let transport: f64 = segments.iter().map(|s| self.segment_footprint(s)).sum();
        transport + self.hotel_footprint(hotel_nights.unwrap_or(0))
    }

    pub fn submission_footprint(&self, submission: &Submission) -> f64 {
        self.total_footprint(&submission.segments, submission.hotel_nights)
    }

    pub fn trees_equivalent(&self, total_footprint: f64) -> u64 {
        self.factors.trees_for(total_footprint)
    }

    /// Segments without a vehicle type are left out of both the total and the breakdown.
    pub fn distance_breakdown(&self, segments: &[TravelSegment]) -> DistanceBreakdown {
        let mut breakdown = DistanceBreakdown::default();

        for trip in segments.iter().filter_map(TravelSegment::trip) {
            let distance = trip.total_distance_km();
            breakdown.total_distance += distance;
            *breakdown
                .by_vehicle_type
                .entry(trip.vehicle().vehicle_type())
                .or_insert(0.0) += distance;
        }

        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, SizeClass, TravelerCategory};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn walking_and_cycling_are_free() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        for vehicle_type in [VehicleType::Walking, VehicleType::Bicycle] {
            let segment = TravelSegment::new(vehicle_type, 5000.0)
                .with_frequency(30)
                .with_vehicles(4);
            assert_eq!(evaluator.segment_footprint(&segment), 0.0);
        }
    }

    #[test]
    fn diesel_car_single_driver() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Car, 500.0)
            .with_fuel(FuelType::Diesel)
            .with_passengers(1)
            .with_frequency(1)
            .with_vehicles(1);
        assert_close(evaluator.segment_footprint(&segment), 85.5);
    }

    #[test]
    fn car_burden_is_shared_by_passengers() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Car, 500.0)
            .with_fuel(FuelType::Diesel)
            .with_passengers(5);
        assert_close(evaluator.segment_footprint(&segment), 17.1);
    }

    #[test]
    fn car_with_unknown_or_missing_fuel_is_zero() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let unknown = TravelSegment::new(VehicleType::Car, 500.0).with_fuel(FuelType::Unknown);
        let missing = TravelSegment::new(VehicleType::Van, 500.0);
        assert_eq!(evaluator.segment_footprint(&unknown), 0.0);
        assert_eq!(evaluator.segment_footprint(&missing), 0.0);
    }

    #[test]
    fn van_uses_van_factors() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Van, 100.0)
            .with_fuel(FuelType::Gasoline)
            .with_size(SizeClass::Under7_5t)
            .with_passengers(3);
        assert_close(evaluator.segment_footprint(&segment), 0.297 * 100.0 / 3.0);
    }

    #[test]
    fn motorcycle_assumes_two_riders_by_default() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let default = TravelSegment::new(VehicleType::Motorcycle, 100.0);
        let solo = TravelSegment::new(VehicleType::Motorcycle, 100.0).with_passengers(1);
        let pair = TravelSegment::new(VehicleType::Motorcycle, 100.0).with_passengers(2);
        let trio = TravelSegment::new(VehicleType::Motorcycle, 90.0).with_passengers(3);

        assert_close(evaluator.segment_footprint(&default), 5.15);
        assert_close(evaluator.segment_footprint(&solo), 5.15);
        assert_close(evaluator.segment_footprint(&pair), 5.15);
        assert_close(evaluator.segment_footprint(&trio), 0.103 * 30.0);
    }

    #[test]
    fn compensated_flight_is_halved() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Plane, 1000.0)
            .with_passengers(1)
            .compensated();
        assert_close(evaluator.segment_footprint(&segment), 127.5);
    }

    #[test]
    fn public_transport_multiplies_by_passengers() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let train = TravelSegment::new(VehicleType::Train, 200.0).with_passengers(4);
        let bus = TravelSegment::new(VehicleType::Bus, 50.0)
            .with_passengers(2)
            .compensated();
        assert_close(evaluator.segment_footprint(&train), 0.041 * 200.0 * 4.0);
        assert_close(evaluator.segment_footprint(&bus), 0.027 * 50.0 * 2.0 * 0.5);
    }

    #[test]
    fn truck_needs_a_size() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let sized = TravelSegment::new(VehicleType::Truck, 100.0)
            .with_size(SizeClass::From34To40t)
            .with_passengers(2);
        let no_size = TravelSegment::new(VehicleType::Truck, 100.0);
        // Passengers never divide a truck's emissions
        assert_close(evaluator.segment_footprint(&sized), 85.5);
        assert_eq!(evaluator.segment_footprint(&no_size), 0.0);
    }

    #[test]
    fn other_uses_flat_factor() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Other, 40.0).with_passengers(4);
        assert_close(evaluator.segment_footprint(&segment), 8.0);
    }

    #[test]
    fn vehicles_and_frequency_scale_the_result() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Car, 10.0)
            .with_fuel(FuelType::Gasoline)
            .with_vehicles(3)
            .with_frequency(5);
        assert_close(evaluator.segment_footprint(&segment), 0.192 * 10.0 * 15.0);
    }

    #[test]
    fn missing_vehicle_type_is_zero() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment {
            distance: Some(300.0),
            fuel_type: Some(FuelType::Diesel),
            ..TravelSegment::default()
        };
        assert_eq!(evaluator.segment_footprint(&segment), 0.0);
    }

    #[test]
    fn substitute_table_is_honored() {
        let table = EmissionFactorTable {
            plane: 0.1,
            compensation_factor: 0.25,
            ..EmissionFactorTable::default()
        };
        let evaluator = Evaluator::new(&table);
        let segment = TravelSegment::new(VehicleType::Plane, 1000.0).compensated();
        assert_close(evaluator.segment_footprint(&segment), 25.0);
    }

    #[test]
    fn hotel_and_total_footprint() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        assert_eq!(evaluator.hotel_footprint(0), 0.0);
        assert_eq!(evaluator.hotel_footprint(3), 36.0);

        let segments = vec![
            TravelSegment::new(VehicleType::Car, 500.0).with_fuel(FuelType::Diesel),
            TravelSegment::new(VehicleType::Walking, 3.0),
        ];
        assert_close(evaluator.total_footprint(&segments, Some(2)), 85.5 + 24.0);
        assert_close(evaluator.total_footprint(&segments, None), 85.5);
        assert_eq!(evaluator.total_footprint(&[], None), 0.0);
    }

    #[test]
    fn submission_footprint_includes_hotel() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let submission = Submission::new(1, TravelerCategory::Public)
            .with_segment(TravelSegment::new(VehicleType::Plane, 1000.0))
            .with_hotel_nights(1);
        assert_close(evaluator.submission_footprint(&submission), 255.0 + 12.0);
    }

    #[test]
    fn trees_equivalent_ceils() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        assert_eq!(evaluator.trees_equivalent(22.0), 1);
        assert_eq!(evaluator.trees_equivalent(23.0), 2);
        assert_eq!(evaluator.trees_equivalent(0.0), 0);
    }

    #[test]
    fn distance_breakdown_scales_and_groups() {
        let table = EmissionFactorTable::default();
        let evaluator = Evaluator::new(&table);
        let segments = vec![
            TravelSegment::new(VehicleType::Car, 100.0)
                .with_frequency(2)
                .with_vehicles(3),
            TravelSegment::new(VehicleType::Car, 50.0),
            TravelSegment::new(VehicleType::Train, 300.0),
            TravelSegment {
                distance: Some(1000.0),
                ..TravelSegment::default()
            },
        ];

        let breakdown = evaluator.distance_breakdown(&segments);
        assert_close(breakdown.total_distance, 950.0);
        assert_eq!(breakdown.by_vehicle_type.len(), 2);
        assert_close(breakdown.by_vehicle_type[&VehicleType::Car], 650.0);
        assert_close(breakdown.by_vehicle_type[&VehicleType::Train], 300.0);
    }

    #[test]
    fn distance_breakdown_of_nothing_is_empty() {
        let table = EmissionFactorTable::default();
        let breakdown = Evaluator::new(&table).distance_breakdown(&[]);
        assert_eq!(breakdown, DistanceBreakdown::default());
    }
}
