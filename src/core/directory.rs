use crate::domain::model::{Airport, AirportId, AirportIds, AirportListing, DirectorySnapshot};
use std::collections::HashSet;
use crate::domain::ports::AirportService;
use crate::utils::error::Result;

/// A destinations load that has been issued but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationsRequest {
    pub origin: AirportId,
    ticket: u64,
}

/// The completion of a [`DestinationsRequest`], ready to be applied.
#[derive(Debug)]
pub struct DestinationsResponse {
    pub origin: AirportId,
    ticket: u64,
    outcome: Result<AirportListing>,
}

/// Client-side cache of origin and per-origin destination lists.
///
/// Load failures never escape: they are logged, the loading flag is
/// cleared and the affected list stays empty.
pub struct AirportDirectory<S: AirportService> {
    service: S,
    snapshot: DirectorySnapshot,
    origins_loading: bool,
    pending: Option<DestinationsRequest>,
    next_ticket: u64,
}

impl<S: AirportService> AirportDirectory<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            snapshot: DirectorySnapshot::default(),
            origins_loading: false,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn snapshot(&self) -> &DirectorySnapshot {
        &self.snapshot
    }

    pub fn origins(&self) -> &[Airport] {
        &self.snapshot.origins
    }

    pub fn destinations(&self, origin: AirportId) -> &[Airport] {
        self.snapshot.destinations(origin)
    }

    pub fn is_loading_origins(&self) -> bool {
        self.origins_loading
    }

    pub fn is_loading_destinations(&self) -> bool {
        self.pending.is_some()
    }

    pub async fn load_origins(&mut self) {
        self.origins_loading = true;

        match self.service.origins().await {
            Ok(listing) => {
                tracing::info!("Loaded {} origin airports", listing.airports.len());
                self.snapshot.origins = listing.airports;
            }
            Err(e) => {
                tracing::warn!("Failed to load origin airports: {}", e);
                self.snapshot.origins.clear();
            }
        }

        self.origins_loading = false;
    }

    /// Marks a destinations load for `origin` as the current one. Any
    /// earlier request still in flight becomes stale.
    pub fn begin_destinations(&mut self, origin: AirportId) -> DestinationsRequest {
        self.next_ticket += 1;
        let request = DestinationsRequest {
            origin,
            ticket: self.next_ticket,
        };
        self.pending = Some(request);
        request
    }

    pub async fn fetch_destinations(&self, request: &DestinationsRequest) -> DestinationsResponse {
        tracing::debug!("Fetching destinations for origin {}", request.origin);
        DestinationsResponse {
            origin: request.origin,
            ticket: request.ticket,
            outcome: self.service.destinations(request.origin).await,
        }
    }

    /// Applies a completed load. Returns `false` when the response was for
    /// a request that has since been superseded; it is then dropped.
    pub fn apply_destinations(&mut self, response: DestinationsResponse) -> bool {
        if self.pending.map(|p| p.ticket) != Some(response.ticket) {
            tracing::debug!(
                "Discarding stale destinations response for origin {}",
                response.origin
            );
            return false;
        }
        self.pending = None;

        let destinations = match response.outcome {
            Ok(listing) => {
                let destinations = match listing.ids {
                    AirportIds::Service => listing.airports,
                    AirportIds::Positional => self.match_origin_ids(listing.airports),
                };
                tracing::info!(
                    "Loaded {} destinations for origin {}",
                    destinations.len(),
                    response.origin
                );
                destinations
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load destinations for origin {}: {}",
                    response.origin,
                    e
                );
                Vec::new()
            }
        };
        self.snapshot
            .destinations_by_origin
            .insert(response.origin, destinations);
        true
    }

    /// Positional ids from a label-only destinations list say nothing about
    /// origin ids. Airports also listed as origins take the origin's id,
    /// the rest get fresh ids above every origin id.
    fn match_origin_ids(&self, destinations: Vec<Airport>) -> Vec<Airport> {
        let origins = &self.snapshot.origins;
        let mut next_id = origins.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let mut used = HashSet::new();

        destinations
            .into_iter()
            .filter_map(|airport| {
                let id = origins
                    .iter()
                    .find(|o| o.name == airport.name)
                    .map(|o| o.id)
                    .unwrap_or_else(|| {
                        let id = next_id;
                        next_id += 1;
                        id
                    });
                used.insert(id).then(|| Airport::new(id, airport.name))
            })
            .collect()
    }

    pub async fn load_destinations(&mut self, origin: AirportId) {
        let request = self.begin_destinations(origin);
        let response = self.fetch_destinations(&request).await;
        self.apply_destinations(response);
    }
}
