//! Carbon footprint estimation for event travel.
//!
//! [`logic::Evaluator`] turns reported travel segments into kg CO2e using an
//! [`logic::EmissionFactorTable`]; [`logic::aggregate`] rolls stored submissions
//! and segments up into an [`models::AggregateResult`] for the whole event.

pub mod config;
pub mod datasources;
pub mod error;
pub mod logic;
pub mod models;

pub use error::{EventPrintError, Result};
