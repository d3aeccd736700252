use crate::error::{EventPrintError, Result};
use crate::models::{FactorBasis, FuelType, SizeClass, VehicleType};
use serde::{Deserialize, Serialize};

/// Per-km factors by fuel, in kg CO2e per vehicle-km.
/// A fuel left out of a table contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelFactors {
    #[serde(default)]
    pub gasoline: Option<f64>,
    #[serde(default)]
    pub diesel: Option<f64>,
    #[serde(default)]
    pub hybrid: Option<f64>,
    #[serde(default)]
    pub plugin_hybrid: Option<f64>,
    #[serde(default)]
    pub electric: Option<f64>,
}

impl FuelFactors {
    pub fn get(&self, fuel: FuelType) -> Option<f64> {
        match fuel {
            FuelType::Gasoline => self.gasoline,
            FuelType::Diesel => self.diesel,
            FuelType::Hybrid => self.hybrid,
            FuelType::PluginHybrid => self.plugin_hybrid,
            FuelType::Electric => self.electric,
            FuelType::Unknown => None,
        }
    }

    fn values(&self) -> [Option<f64>; 5] {
        [
            self.gasoline,
            self.diesel,
            self.hybrid,
            self.plugin_hybrid,
            self.electric,
        ]
    }
}

/// Per-km factors by truck weight band, in kg CO2e per vehicle-km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeFactors {
    #[serde(rename = "<7.5t", default)]
    pub under_7_5t: Option<f64>,
    #[serde(rename = "7.5-12t", default)]
    pub from_7_5_to_12t: Option<f64>,
    #[serde(rename = "20-26t", default)]
    pub from_20_to_26t: Option<f64>,
    #[serde(rename = "34-40t", default)]
    pub from_34_to_40t: Option<f64>,
    #[serde(rename = "50-60t", default)]
    pub from_50_to_60t: Option<f64>,
}

impl SizeFactors {
    pub fn get(&self, size: SizeClass) -> Option<f64> {
        match size {
            SizeClass::Under7_5t => self.under_7_5t,
            SizeClass::From7_5To12t => self.from_7_5_to_12t,
            SizeClass::From20To26t => self.from_20_to_26t,
            SizeClass::From34To40t => self.from_34_to_40t,
            SizeClass::From50To60t => self.from_50_to_60t,
        }
    }

    fn values(&self) -> [Option<f64>; 5] {
        [
            self.under_7_5t,
            self.from_7_5_to_12t,
            self.from_20_to_26t,
            self.from_34_to_40t,
            self.from_50_to_60t,
        ]
    }
}

/// Read-only emission reference data, in kg CO2e.
///
/// Car, van, motorcycle, truck and other factors are per vehicle-km;
/// bus, train and plane factors are per passenger-km. Walking and
/// cycling are always zero and are not tabulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmissionFactorTable {
    pub version: String,
    pub car: FuelFactors,
    pub van: FuelFactors,
    pub motorcycle: f64,
    pub bus: f64,
    pub train: f64,
    pub plane: f64,
    pub truck: SizeFactors,
    pub other: f64,
    pub hotel_per_night: f64,
    pub tree_absorption_per_year: f64,
    /// Share of emissions left after a carbon compensation claim.
    pub compensation_factor: f64,
    /// Riders assumed on a motorcycle reported with a single passenger.
    pub motorcycle_default_occupancy: u32,
}

impl Default for EmissionFactorTable {
    fn default() -> Self {
        Self {
            version: "2024.1".into(),
            car: FuelFactors {
                gasoline: Some(0.192),
                diesel: Some(0.171),
                hybrid: Some(0.111),
                plugin_hybrid: Some(0.092),
                electric: Some(0.053),
            },
            van: FuelFactors {
                gasoline: Some(0.297),
                diesel: Some(0.265),
                hybrid: Some(0.172),
                plugin_hybrid: Some(0.142),
                electric: Some(0.082),
            },
            motorcycle: 0.103,
            bus: 0.027,
            train: 0.041,
            plane: 0.255,
            truck: SizeFactors {
                under_7_5t: Some(0.459),
                from_7_5_to_12t: Some(0.563),
                from_20_to_26t: Some(0.679),
                from_34_to_40t: Some(0.855),
                from_50_to_60t: Some(0.932),
            },
            other: 0.2,
            hotel_per_night: 12.0,
            tree_absorption_per_year: 22.0,
            compensation_factor: 0.5,
            motorcycle_default_occupancy: 2,
        }
    }
}

impl EmissionFactorTable {
    /// Rejects tables that would make footprints negative or undefined.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("motorcycle", self.motorcycle),
            ("bus", self.bus),
            ("train", self.train),
            ("plane", self.plane),
            ("other", self.other),
            ("hotelPerNight", self.hotel_per_night),
            ("compensationFactor", self.compensation_factor),
        ];
        for (name, value) in scalars {
            check_factor(name, value)?;
        }

        for (name, values) in [
            ("car", self.car.values()),
            ("van", self.van.values()),
            ("truck", self.truck.values()),
        ] {
            for value in values.into_iter().flatten() {
                check_factor(name, value)?;
            }
        }

        if !(self.tree_absorption_per_year.is_finite() && self.tree_absorption_per_year > 0.0) {
            return Err(EventPrintError::InvalidData(format!(
                "treeAbsorptionPerYear must be positive, got {}",
                self.tree_absorption_per_year
            )));
        }

        if self.motorcycle_default_occupancy == 0 {
            return Err(EventPrintError::InvalidData(
                "motorcycleDefaultOccupancy must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Trees needed to absorb `footprint_kg` in one year, rounded up.
    pub fn trees_for(&self, footprint_kg: f64) -> u64 {
        if !footprint_kg.is_finite() || footprint_kg <= 0.0 {
            return 0;
        }
        (footprint_kg / self.tree_absorption_per_year).ceil() as u64
    }

    /// Flattened listing of every tabulated factor.
    pub fn entries(&self) -> Vec<FactorEntry> {
        let mut entries = Vec::new();

        for vehicle_type in VehicleType::all() {
            let basis = vehicle_type.factor_basis();
            match vehicle_type {
                VehicleType::Walking | VehicleType::Bicycle => {
                    entries.push(FactorEntry::new(*vehicle_type, None, 0.0, basis));
                }
                VehicleType::Car | VehicleType::Van => {
                    let fuels = if *vehicle_type == VehicleType::Car {
                        &self.car
                    } else {
                        &self.van
                    };
                    for fuel in [
                        FuelType::Gasoline,
                        FuelType::Diesel,
                        FuelType::Hybrid,
                        FuelType::PluginHybrid,
                        FuelType::Electric,
                    ] {
                        if let Some(value) = fuels.get(fuel) {
                            entries.push(FactorEntry::new(
                                *vehicle_type,
                                Some(fuel.as_str()),
                                value,
                                basis,
                            ));
                        }
                    }
                }
                VehicleType::Truck => {
                    for size in SizeClass::all() {
                        if let Some(value) = self.truck.get(*size) {
                            entries.push(FactorEntry::new(
                                *vehicle_type,
                                Some(size.as_str()),
                                value,
                                basis,
                            ));
                        }
                    }
                }
                VehicleType::Motorcycle => {
                    entries.push(FactorEntry::new(*vehicle_type, None, self.motorcycle, basis))
                }
                VehicleType::Bus => {
                    entries.push(FactorEntry::new(*vehicle_type, None, self.bus, basis))
                }
                VehicleType::Train => {
                    entries.push(FactorEntry::new(*vehicle_type, None, self.train, basis))
                }
                VehicleType::Plane => {
                    entries.push(FactorEntry::new(*vehicle_type, None, self.plane, basis))
                }
                VehicleType::Other => {
                    entries.push(FactorEntry::new(*vehicle_type, None, self.other, basis))
                }
            }
        }

        entries
    }
}

fn check_factor(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EventPrintError::InvalidData(format!(
            "factor '{}' must be a non-negative number, got {}",
            name, value
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorEntry {
    pub vehicle_type: VehicleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<&'static str>,
    pub kg_per_km: f64,
    pub basis: FactorBasis,
}

impl FactorEntry {
    fn new(
        vehicle_type: VehicleType,
        variant: Option<&'static str>,
        kg_per_km: f64,
        basis: FactorBasis,
    ) -> Self {
        Self {
            vehicle_type,
            variant,
            kg_per_km,
            basis,
        }
    }
}
