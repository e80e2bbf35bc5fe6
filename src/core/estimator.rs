use crate::adapters::http::ServiceClient;
use crate::domain::model::{Airport, DelayProbability, RouteQuery};
use crate::domain::ports::{ConfigProvider, DelayEstimator, EstimationStrategy};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Month;
use rand::Rng;
use std::ops::Range;

pub const BUSY_AIRPORTS: [&str; 4] = ["JFK", "LAX", "ORD", "ATL"];

const BASE_PROBABILITY_RANGE: Range<f64> = 15.0..25.0;

pub fn month_factor(month: Month) -> f64 {
    match month {
        Month::December | Month::January | Month::February => 1.5,
        Month::July | Month::August => 1.3,
        _ => 1.0,
    }
}

pub fn airport_factor(departure: &Airport, arrival: &Airport) -> f64 {
    let is_busy = |airport: &Airport| BUSY_AIRPORTS.contains(&airport.code());
    if is_busy(departure) || is_busy(arrival) {
        1.2
    } else {
        1.0
    }
}

/// Seasonal and hub-traffic heuristic on top of a random base rate.
///
/// The result is not capped at 100%.
#[derive(Debug, Clone, Default)]
pub struct LocalHeuristicEstimator {
    fixed_base: Option<f64>,
}

impl LocalHeuristicEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `base` instead of drawing a random base probability.
    pub fn with_fixed_base(base: f64) -> Self {
        Self {
            fixed_base: Some(base),
        }
    }

    fn base_probability(&self) -> f64 {
        self.fixed_base
            .unwrap_or_else(|| rand::thread_rng().gen_range(BASE_PROBABILITY_RANGE))
    }

    pub fn compute(&self, route: &RouteQuery) -> DelayProbability {
        let base = self.base_probability();
        let percent =
            base * month_factor(route.month) * airport_factor(&route.departure, &route.arrival);
        DelayProbability::from_percent(percent)
    }
}

#[async_trait]
impl DelayEstimator for LocalHeuristicEstimator {
    async fn estimate(&self, route: &RouteQuery) -> Result<DelayProbability> {
        let probability = self.compute(route);
        tracing::debug!(
            "Local estimate {} -> {} in {}: {}%",
            route.departure,
            route.arrival,
            route.month.name(),
            probability
        );
        Ok(probability)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Asks the delay estimation service for the route's probability.
#[derive(Debug, Clone)]
pub struct RemoteEstimator {
    client: ServiceClient,
}

impl RemoteEstimator {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DelayEstimator for RemoteEstimator {
    async fn estimate(&self, route: &RouteQuery) -> Result<DelayProbability> {
        let fraction = self
            .client
            .delay_probability(route.departure.id, route.arrival.id, route.month)
            .await?;
        Ok(DelayProbability::from_fraction(fraction))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

pub fn build_estimator<C: ConfigProvider + ?Sized>(config: &C) -> Result<Box<dyn DelayEstimator>> {
    let estimator: Box<dyn DelayEstimator> = match config.strategy() {
        EstimationStrategy::Local => Box::new(LocalHeuristicEstimator::new()),
        EstimationStrategy::Remote => {
            Box::new(RemoteEstimator::new(ServiceClient::from_config(config)?))
        }
    };
    tracing::info!("Using {} delay estimator", estimator.name());
    Ok(estimator)
}
