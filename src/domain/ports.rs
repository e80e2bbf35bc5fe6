use crate::domain::model::{AirportId, AirportListing, DelayProbability, RouteQuery};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub trait AirportService: Send + Sync {
    fn origins(&self) -> impl std::future::Future<Output = Result<AirportListing>> + Send;
    fn destinations(
        &self,
        origin: AirportId,
    ) -> impl std::future::Future<Output = Result<AirportListing>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EstimationStrategy {
    Local,
    #[default]
    Remote,
}

pub trait ConfigProvider: Send + Sync {
    fn service_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn strategy(&self) -> EstimationStrategy;
}

/// Produces a delay probability for a complete route. The form only ever
/// talks to this trait, so strategies can be swapped freely.
#[async_trait]
pub trait DelayEstimator: Send + Sync {
    async fn estimate(&self, route: &RouteQuery) -> Result<DelayProbability>;

    fn name(&self) -> &'static str;
}
