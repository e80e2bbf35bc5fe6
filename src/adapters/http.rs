use crate::domain::model::{Airport, AirportId, AirportIds, AirportListing};
use crate::domain::ports::{AirportService, ConfigProvider};
use crate::utils::error::{FlightDelayError, Result};
use chrono::Month;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Airport lists come in two shapes: `[[id, name], ...]` and the older
/// label-only `["name", ...]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AirportEntry {
    Pair(AirportId, String),
    Label(String),
}

#[derive(Debug, Deserialize)]
struct AirportsPayload {
    airports: Vec<AirportEntry>,
}

#[derive(Debug, Deserialize)]
struct DelayPayload {
    probability: f64,
}

/// HTTP client for the airport and delay estimation service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.service_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        tracing::debug!("Response status: {}", response.status());

        let body = response.error_for_status()?.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| FlightDelayError::malformed(format!("{} from {}", e, path)))
    }

    async fn get_airports(&self, path: &str) -> Result<AirportListing> {
        let payload: AirportsPayload = self.get_json(path).await?;
        Ok(into_airports(payload.airports))
    }

    /// Raw probability in [0, 1] for one route and month.
    pub async fn delay_probability(
        &self,
        departure: AirportId,
        arrival: AirportId,
        month: Month,
    ) -> Result<f64> {
        let path = format!("/delay/{}/{}/{}", departure, arrival, month.name());
        let payload: DelayPayload = self.get_json(&path).await?;

        if !payload.probability.is_finite() || !(0.0..=1.0).contains(&payload.probability) {
            return Err(FlightDelayError::malformed(format!(
                "probability {} outside [0, 1]",
                payload.probability
            )));
        }
        Ok(payload.probability)
    }
}

impl AirportService for ServiceClient {
    async fn origins(&self) -> Result<AirportListing> {
        self.get_airports("/airports/origin").await
    }

    async fn destinations(&self, origin: AirportId) -> Result<AirportListing> {
        self.get_airports(&format!("/airports/origin/{}/destinations", origin))
            .await
    }
}

fn into_airports(entries: Vec<AirportEntry>) -> AirportListing {
    let ids = if entries.iter().any(|e| matches!(e, AirportEntry::Label(_))) {
        AirportIds::Positional
    } else {
        AirportIds::Service
    };
    let mut seen = HashSet::new();
    let mut airports = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let airport = match entry {
            AirportEntry::Pair(id, name) => Airport::new(id, name),
            // label-only lists get positional ids starting at 1
            AirportEntry::Label(name) => Airport::new(index as AirportId + 1, name),
        };

        if !seen.insert(airport.id) {
            tracing::warn!("Dropping duplicate airport id {} ({})", airport.id, airport.name);
            continue;
        }
        airports.push(airport);
    }

    AirportListing { airports, ids }
}
