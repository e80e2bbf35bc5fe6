pub mod directory;
pub mod estimator;
pub mod form;
pub mod session;

pub use crate::domain::model::{Airport, AirportId, EstimationResult, TravelPeriod};
pub use crate::domain::ports::{AirportService, ConfigProvider, DelayEstimator};
pub use crate::utils::error::Result;
