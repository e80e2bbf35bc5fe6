pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::ServiceClient;
pub use crate::core::{
    directory::AirportDirectory,
    estimator::{LocalHeuristicEstimator, RemoteEstimator},
    form::{FormController, FormPhase},
    session::{FormInput, FormSession},
};
pub use domain::model::{
    Airport, AirportId, AirportIds, AirportListing, DelayProbability, EstimationResult,
    TravelPeriod,
};
pub use domain::ports::{AirportService, ConfigProvider, DelayEstimator, EstimationStrategy};
pub use utils::error::{FlightDelayError, Result};
