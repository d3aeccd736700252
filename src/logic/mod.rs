pub mod aggregation;
pub mod calculations;
pub mod factors;

pub use aggregation::{aggregate, aggregate_submissions};
pub use calculations::{DistanceBreakdown, Evaluator};
pub use factors::{EmissionFactorTable, FactorEntry, FuelFactors, SizeFactors};
