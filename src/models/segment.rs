use super::{lenient_count, lenient_tag, normalize_tag, Tag};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleType {
    Walking,
    Bicycle,
    Motorcycle,
    Car,
    Van,
    Bus,
    Truck,
    Train,
    Plane,
    Other,
}

/// Whether a tabulated factor is expressed per vehicle or per passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorBasis {
    /// Emission of the whole vehicle; shared occupancy divides it.
    PerVehicleKm,
    /// Already averaged over a typical load factor; occupancy multiplies it.
    PerPassengerKm,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Walking => "walking",
            VehicleType::Bicycle => "bicycle",
            VehicleType::Motorcycle => "motorcycle",
            VehicleType::Car => "car",
            VehicleType::Van => "van",
            VehicleType::Bus => "bus",
            VehicleType::Truck => "truck",
            VehicleType::Train => "train",
            VehicleType::Plane => "plane",
            VehicleType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_tag(s).as_str() {
            "walking" | "walk" => Some(VehicleType::Walking),
            "bicycle" | "bike" => Some(VehicleType::Bicycle),
            "motorcycle" | "motorbike" => Some(VehicleType::Motorcycle),
            "car" => Some(VehicleType::Car),
            "van" => Some(VehicleType::Van),
            "bus" | "coach" => Some(VehicleType::Bus),
            "truck" | "lorry" => Some(VehicleType::Truck),
            "train" | "rail" => Some(VehicleType::Train),
            "plane" | "flight" => Some(VehicleType::Plane),
            "other" => Some(VehicleType::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [VehicleType] {
        &[
            VehicleType::Walking,
            VehicleType::Bicycle,
            VehicleType::Motorcycle,
            VehicleType::Car,
            VehicleType::Van,
            VehicleType::Bus,
            VehicleType::Truck,
            VehicleType::Train,
            VehicleType::Plane,
            VehicleType::Other,
        ]
    }

    pub fn factor_basis(&self) -> FactorBasis {
        match self {
            VehicleType::Bus | VehicleType::Train | VehicleType::Plane => {
                FactorBasis::PerPassengerKm
            }
            _ => FactorBasis::PerVehicleKm,
        }
    }

    /// Vehicles for which a fuel type is collected.
    pub fn uses_fuel(&self) -> bool {
        matches!(
            self,
            VehicleType::Car
                | VehicleType::Van
                | VehicleType::Motorcycle
                | VehicleType::Truck
                | VehicleType::Bus
        )
    }

    /// Vehicles for which a third-party carbon compensation claim is honored.
    pub fn supports_compensation(&self) -> bool {
        matches!(
            self,
            VehicleType::Plane | VehicleType::Train | VehicleType::Bus
        )
    }

    /// Vehicles that can be reported as several units in one segment.
    pub fn supports_multiple_vehicles(&self) -> bool {
        matches!(
            self,
            VehicleType::Car
                | VehicleType::Motorcycle
                | VehicleType::Van
                | VehicleType::Truck
                | VehicleType::Bus
        )
    }
}

impl Tag for VehicleType {
    fn parse_tag(s: &str) -> Option<Self> {
        Self::from_str(s)
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Hybrid,
    PluginHybrid,
    Electric,
    Unknown,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "gasoline",
            FuelType::Diesel => "diesel",
            FuelType::Hybrid => "hybrid",
            FuelType::PluginHybrid => "pluginHybrid",
            FuelType::Electric => "electric",
            FuelType::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_tag(s).as_str() {
            "gasoline" | "petrol" => Some(FuelType::Gasoline),
            "diesel" => Some(FuelType::Diesel),
            "hybrid" => Some(FuelType::Hybrid),
            "pluginhybrid" | "phev" => Some(FuelType::PluginHybrid),
            "electric" | "ev" => Some(FuelType::Electric),
            "unknown" => Some(FuelType::Unknown),
            _ => None,
        }
    }
}

impl Tag for FuelType {
    fn parse_tag(s: &str) -> Option<Self> {
        Self::from_str(s)
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gross vehicle weight bands for vans and trucks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "<7.5t")]
    Under7_5t,
    #[serde(rename = "7.5-12t")]
    From7_5To12t,
    #[serde(rename = "20-26t")]
    From20To26t,
    #[serde(rename = "34-40t")]
    From34To40t,
    #[serde(rename = "50-60t")]
    From50To60t,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Under7_5t => "<7.5t",
            SizeClass::From7_5To12t => "7.5-12t",
            SizeClass::From20To26t => "20-26t",
            SizeClass::From34To40t => "34-40t",
            SizeClass::From50To60t => "50-60t",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match normalize_tag(s).as_str() {
            "<7.5t" | "under7.5t" => Some(SizeClass::Under7_5t),
            "7.512t" => Some(SizeClass::From7_5To12t),
            "2026t" => Some(SizeClass::From20To26t),
            "3440t" => Some(SizeClass::From34To40t),
            "5060t" => Some(SizeClass::From50To60t),
            _ => None,
        }
    }

    pub fn all() -> &'static [SizeClass] {
        &[
            SizeClass::Under7_5t,
            SizeClass::From7_5To12t,
            SizeClass::From20To26t,
            SizeClass::From34To40t,
            SizeClass::From50To60t,
        ]
    }

    /// Vans only come in the two lightest bands.
    pub fn fits_van(&self) -> bool {
        matches!(self, SizeClass::Under7_5t | SizeClass::From7_5To12t)
    }
}

impl Tag for SizeClass {
    fn parse_tag(s: &str) -> Option<Self> {
        Self::from_str(s)
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One reported leg of travel, as submitted. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelSegment {
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle_type: Option<VehicleType>,
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub fuel_type: Option<FuelType>,
    #[serde(
        default,
        alias = "vanSize",
        alias = "truckSize",
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub vehicle_size_class: Option<SizeClass>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub passengers: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_vehicles: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_compensated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type_other_details: Option<String>,
}

impl TravelSegment {
    pub fn new(vehicle_type: VehicleType, distance: f64) -> Self {
        Self {
            vehicle_type: Some(vehicle_type),
            distance: Some(distance),
            ..Self::default()
        }
    }

    pub fn with_fuel(mut self, fuel: FuelType) -> Self {
        self.fuel_type = Some(fuel);
        self
    }

    pub fn with_size(mut self, size: SizeClass) -> Self {
        self.vehicle_size_class = Some(size);
        self
    }

    pub fn with_passengers(mut self, passengers: u32) -> Self {
        self.passengers = Some(passengers);
        self
    }

    pub fn with_vehicles(mut self, count: u32) -> Self {
        self.number_of_vehicles = Some(count);
        self
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn compensated(mut self) -> Self {
        self.carbon_compensated = Some(true);
        self
    }

    pub fn with_route(mut self, origin: &str, destination: &str) -> Self {
        self.origin = Some(origin.to_string());
        self.destination = Some(destination.to_string());
        self
    }

    /// Single-occurrence distance, with missing, negative or non-finite values read as 0.
    pub fn distance_km(&self) -> f64 {
        clamp_distance(self.distance.unwrap_or(0.0))
    }

    /// Resolves the raw record into a normalized trip.
    /// Returns `None` when no vehicle type was reported.
    pub fn trip(&self) -> Option<Trip> {
        let vehicle_type = self.vehicle_type?;
        let compensated = self.carbon_compensated.unwrap_or(false);

        let vehicle = match vehicle_type {
            VehicleType::Walking => Vehicle::Walking,
            VehicleType::Bicycle => Vehicle::Bicycle,
            VehicleType::Motorcycle => Vehicle::Motorcycle,
            VehicleType::Car => Vehicle::Car {
                fuel: self.fuel_type,
            },
            VehicleType::Van => Vehicle::Van {
                fuel: self.fuel_type,
                size: self.vehicle_size_class.filter(SizeClass::fits_van),
            },
            VehicleType::Bus => Vehicle::Bus { compensated },
            VehicleType::Truck => Vehicle::Truck {
                size: self.vehicle_size_class,
            },
            VehicleType::Train => Vehicle::Train { compensated },
            VehicleType::Plane => Vehicle::Plane { compensated },
            VehicleType::Other => Vehicle::Other,
        };

        let mut trip = Trip::new(vehicle, self.distance.unwrap_or(0.0));
        if let Some(passengers) = self.passengers {
            trip = trip.with_passengers(passengers);
        }
        if let Some(count) = self.number_of_vehicles {
            trip = trip.with_vehicles(count);
        }
        if let Some(frequency) = self.frequency {
            trip = trip.with_frequency(frequency);
        }
        Some(trip)
    }
}

/// A vehicle carrying only the attributes its emission rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vehicle {
    Walking,
    Bicycle,
    Motorcycle,
    Car {
        fuel: Option<FuelType>,
    },
    Van {
        fuel: Option<FuelType>,
        size: Option<SizeClass>,
    },
    Bus {
        compensated: bool,
    },
    Truck {
        size: Option<SizeClass>,
    },
    Train {
        compensated: bool,
    },
    Plane {
        compensated: bool,
    },
    Other,
}

impl Vehicle {
    pub fn vehicle_type(&self) -> VehicleType {
        match self {
            Vehicle::Walking => VehicleType::Walking,
            Vehicle::Bicycle => VehicleType::Bicycle,
            Vehicle::Motorcycle => VehicleType::Motorcycle,
            Vehicle::Car { .. } => VehicleType::Car,
            Vehicle::Van { .. } => VehicleType::Van,
            Vehicle::Bus { .. } => VehicleType::Bus,
            Vehicle::Truck { .. } => VehicleType::Truck,
            Vehicle::Train { .. } => VehicleType::Train,
            Vehicle::Plane { .. } => VehicleType::Plane,
            Vehicle::Other => VehicleType::Other,
        }
    }
}

/// A validated segment: counts are at least one and distance is finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trip {
    vehicle: Vehicle,
    distance_km: f64,
    passengers: u32,
    vehicles: u32,
    frequency: u32,
}

impl Trip {
    pub fn new(vehicle: Vehicle, distance_km: f64) -> Self {
        Self {
            vehicle,
            distance_km: clamp_distance(distance_km),
            passengers: 1,
            vehicles: 1,
            frequency: 1,
        }
    }

    pub fn with_passengers(mut self, passengers: u32) -> Self {
        self.passengers = passengers.max(1);
        self
    }

    pub fn with_vehicles(mut self, count: u32) -> Self {
        self.vehicles = count.max(1);
        self
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency.max(1);
        self
    }

    pub fn vehicle(&self) -> Vehicle {
        self.vehicle
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn passengers(&self) -> u32 {
        self.passengers
    }

    pub fn vehicles(&self) -> u32 {
        self.vehicles
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Number of times the per-occurrence value is counted.
    pub fn multiplier(&self) -> f64 {
        f64::from(self.vehicles) * f64::from(self.frequency)
    }

    /// Distance over all repetitions and vehicle units.
    pub fn total_distance_km(&self) -> f64 {
        self.distance_km * self.multiplier()
    }
}

fn clamp_distance(km: f64) -> f64 {
    if km.is_finite() && km > 0.0 {
        km
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_from_str_valid() {
        assert_eq!(VehicleType::from_str("car"), Some(VehicleType::Car));
        assert_eq!(VehicleType::from_str("Plane"), Some(VehicleType::Plane));
        assert_eq!(VehicleType::from_str(" BUS "), Some(VehicleType::Bus));
        assert_eq!(VehicleType::from_str("motorbike"), Some(VehicleType::Motorcycle));
    }

    #[test]
    fn vehicle_type_from_str_invalid() {
        assert_eq!(VehicleType::from_str("spaceship"), None);
        assert_eq!(VehicleType::from_str(""), None);
    }

    #[test]
    fn vehicle_type_round_trip() {
        for vehicle_type in VehicleType::all() {
            assert_eq!(
                VehicleType::from_str(vehicle_type.as_str()),
                Some(*vehicle_type),
                "Round-trip failed for {:?}",
                vehicle_type
            );
        }
    }

    #[test]
    fn factor_basis_by_vehicle() {
        assert_eq!(VehicleType::Car.factor_basis(), FactorBasis::PerVehicleKm);
        assert_eq!(VehicleType::Truck.factor_basis(), FactorBasis::PerVehicleKm);
        assert_eq!(VehicleType::Other.factor_basis(), FactorBasis::PerVehicleKm);
        assert_eq!(VehicleType::Bus.factor_basis(), FactorBasis::PerPassengerKm);
        assert_eq!(VehicleType::Train.factor_basis(), FactorBasis::PerPassengerKm);
        assert_eq!(VehicleType::Plane.factor_basis(), FactorBasis::PerPassengerKm);
    }

    #[test]
    fn conditional_field_rules() {
        assert!(VehicleType::Bus.uses_fuel());
        assert!(!VehicleType::Train.uses_fuel());
        assert!(VehicleType::Bus.supports_compensation());
        assert!(!VehicleType::Car.supports_compensation());
        assert!(VehicleType::Truck.supports_multiple_vehicles());
        assert!(!VehicleType::Plane.supports_multiple_vehicles());
    }

    #[test]
    fn fuel_type_from_str() {
        assert_eq!(FuelType::from_str("pluginHybrid"), Some(FuelType::PluginHybrid));
        assert_eq!(FuelType::from_str("plug-in hybrid"), Some(FuelType::PluginHybrid));
        assert_eq!(FuelType::from_str("petrol"), Some(FuelType::Gasoline));
        assert_eq!(FuelType::from_str("hydrogen"), None);
    }

    #[test]
    fn size_class_round_trip() {
        for size in SizeClass::all() {
            assert_eq!(SizeClass::from_str(size.as_str()), Some(*size));
        }
        assert_eq!(SizeClass::from_str("12t"), None);
    }

    #[test]
    fn van_only_keeps_light_bands() {
        let van = TravelSegment::new(VehicleType::Van, 10.0).with_size(SizeClass::From20To26t);
        assert_eq!(
            van.trip().map(|t| t.vehicle()),
            Some(Vehicle::Van {
                fuel: None,
                size: None
            })
        );

        let light = TravelSegment::new(VehicleType::Van, 10.0).with_size(SizeClass::From7_5To12t);
        assert_eq!(
            light.trip().map(|t| t.vehicle()),
            Some(Vehicle::Van {
                fuel: None,
                size: Some(SizeClass::From7_5To12t)
            })
        );
    }

    #[test]
    fn trip_defaults_counts_to_one() {
        let segment = TravelSegment {
            vehicle_type: Some(VehicleType::Car),
            passengers: Some(0),
            number_of_vehicles: Some(0),
            ..TravelSegment::default()
        };
        let trip = segment.trip().expect("car segment resolves");
        assert_eq!(trip.passengers(), 1);
        assert_eq!(trip.vehicles(), 1);
        assert_eq!(trip.frequency(), 1);
        assert_eq!(trip.distance_km(), 0.0);
    }

    #[test]
    fn trip_clamps_bad_distance() {
        assert_eq!(TravelSegment::new(VehicleType::Car, -5.0).trip().map(|t| t.distance_km()), Some(0.0));
        assert_eq!(
            TravelSegment::new(VehicleType::Car, f64::NAN).trip().map(|t| t.distance_km()),
            Some(0.0)
        );
    }

    #[test]
    fn compensation_only_on_public_transport() {
        let train = TravelSegment::new(VehicleType::Train, 100.0).compensated();
        assert_eq!(
            train.trip().map(|t| t.vehicle()),
            Some(Vehicle::Train { compensated: true })
        );

        // A car has no place to carry the flag
        let car = TravelSegment::new(VehicleType::Car, 100.0).compensated();
        assert_eq!(car.trip().map(|t| t.vehicle()), Some(Vehicle::Car { fuel: None }));
    }

    #[test]
    fn segment_distance_is_clamped_without_a_vehicle_type() {
        let segment = TravelSegment {
            distance: Some(-40.0),
            ..TravelSegment::default()
        };
        assert_eq!(segment.distance_km(), 0.0);
        assert_eq!(TravelSegment::default().distance_km(), 0.0);
        assert_eq!(TravelSegment::new(VehicleType::Bus, 12.5).distance_km(), 12.5);
    }

    #[test]
    fn bad_counts_fall_back_to_one() {
        let json = r#"{"vehicleType": "car", "distance": 30, "passengers": -1, "numberOfVehicles": 2.5, "frequency": "3"}"#;
        let segment: TravelSegment = serde_json::from_str(json).expect("segment parses");
        assert_eq!(segment.passengers, None);
        assert_eq!(segment.number_of_vehicles, None);
        assert_eq!(segment.frequency, Some(3));

        let trip = segment.trip().expect("car segment resolves");
        assert_eq!(trip.passengers(), 1);
        assert_eq!(trip.vehicles(), 1);
        assert_eq!(trip.frequency(), 3);
    }

    #[test]
    fn route_round_trips_through_json() {
        let segment = TravelSegment::new(VehicleType::Train, 640.0).with_route("Lyon", "Geneva");
        let json = serde_json::to_value(&segment).expect("segment serializes");
        assert_eq!(json["origin"], "Lyon");
        assert_eq!(json["destination"], "Geneva");

        let back: TravelSegment = serde_json::from_value(json).expect("segment parses");
        assert_eq!(back, segment);
    }

    #[test]
    fn missing_vehicle_type_has_no_trip() {
        let segment = TravelSegment {
            distance: Some(40.0),
            ..TravelSegment::default()
        };
        assert!(segment.trip().is_none());
    }

    #[test]
    fn segment_deserializes_leniently() {
        let json = r#"{
            "vehicleType": "car",
            "fuelType": "hydrogen",
            "truckSize": "34-40t",
            "passengers": 3,
            "distance": 120.5
        }"#;
        let segment: TravelSegment = serde_json::from_str(json).expect("segment parses");
        assert_eq!(segment.vehicle_type, Some(VehicleType::Car));
        assert_eq!(segment.fuel_type, None);
        assert_eq!(segment.vehicle_size_class, Some(SizeClass::From34To40t));
        assert_eq!(segment.passengers, Some(3));
        assert_eq!(segment.frequency, None);
    }

    #[test]
    fn segment_with_unknown_vehicle_type_parses() {
        let segment: TravelSegment =
            serde_json::from_str(r#"{"vehicleType": "hovercraft", "distance": 3}"#)
                .expect("segment parses");
        assert_eq!(segment.vehicle_type, None);
        assert_eq!(segment.distance, Some(3.0));
    }
}
