use crate::core::directory::{AirportDirectory, DestinationsRequest, DestinationsResponse};
use crate::domain::model::{
    Airport, AirportId, EstimationResult, RouteQuery, SelectionState, TravelPeriod,
};
use crate::domain::ports::{AirportService, DelayEstimator};
use crate::utils::error::{FlightDelayError, Result};
use crate::utils::validation::validate_required_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    OriginsLoading,
    Ready,
    DestinationsLoading,
    Submitting,
    ResultShown,
}

/// Drives the delay form: cascading airport selection, then estimation.
///
/// One controller is one mounted form. Dropping it tears everything down.
pub struct FormController<S: AirportService> {
    directory: AirportDirectory<S>,
    estimator: Box<dyn DelayEstimator>,
    selection: SelectionState,
    result: Option<EstimationResult>,
    phase: FormPhase,
}

impl<S: AirportService> FormController<S> {
    pub fn new(directory: AirportDirectory<S>, estimator: Box<dyn DelayEstimator>) -> Self {
        Self {
            directory,
            estimator,
            selection: SelectionState::default(),
            result: None,
            phase: FormPhase::Idle,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn result(&self) -> Option<&EstimationResult> {
        self.result.as_ref()
    }

    pub fn origins(&self) -> &[Airport] {
        self.directory.origins()
    }

    pub fn is_loading_origins(&self) -> bool {
        self.directory.is_loading_origins()
    }

    pub fn is_loading_destinations(&self) -> bool {
        self.directory.is_loading_destinations()
    }

    /// Destinations for the current departure, minus the departure itself
    /// (matched by id or by label).
    pub fn arrival_candidates(&self) -> Vec<&Airport> {
        let Some(departure) = self.selection.departure else {
            return Vec::new();
        };
        let departure_name = self
            .directory
            .snapshot()
            .origin(departure)
            .map(|a| a.name.as_str());

        self.directory
            .destinations(departure)
            .iter()
            .filter(|a| a.id != departure && Some(a.name.as_str()) != departure_name)
            .collect()
    }

    pub fn can_submit(&self) -> bool {
        self.selection.is_complete() && self.phase != FormPhase::Submitting
    }

    pub async fn mount(&mut self) {
        self.phase = FormPhase::OriginsLoading;
        self.directory.load_origins().await;
        self.phase = FormPhase::Ready;
    }

    /// Sets the departure and returns the destinations load it triggers.
    /// The arrival is cleared since it belonged to the old origin.
    pub fn select_departure(&mut self, origin: AirportId) -> Result<DestinationsRequest> {
        if self.directory.snapshot().origin(origin).is_none() {
            return Err(FlightDelayError::validation(
                "departure",
                format!("unknown origin airport {}", origin),
            ));
        }

        tracing::info!("Departure changed to {}", origin);
        self.selection.departure = Some(origin);
        self.selection.arrival = None;
        self.phase = FormPhase::DestinationsLoading;
        Ok(self.directory.begin_destinations(origin))
    }

    pub async fn fetch_destinations(&self, request: &DestinationsRequest) -> DestinationsResponse {
        self.directory.fetch_destinations(request).await
    }

    pub fn complete_destinations(&mut self, response: DestinationsResponse) {
        if self.directory.apply_destinations(response)
            && self.phase == FormPhase::DestinationsLoading
        {
            self.phase = FormPhase::Ready;
        }
    }

    pub async fn change_departure(&mut self, origin: AirportId) -> Result<()> {
        let request = self.select_departure(origin)?;
        let response = self.fetch_destinations(&request).await;
        self.complete_destinations(response);
        Ok(())
    }

    pub fn select_arrival(&mut self, arrival: AirportId) -> Result<()> {
        if !self.arrival_candidates().iter().any(|a| a.id == arrival) {
            return Err(FlightDelayError::validation(
                "arrival",
                format!("airport {} is not a destination of the selected departure", arrival),
            ));
        }
        self.selection.arrival = Some(arrival);
        Ok(())
    }

    pub fn set_travel_period(&mut self, period: TravelPeriod) {
        self.selection.travel = Some(period);
    }

    fn route_query(&self) -> Result<RouteQuery> {
        let departure_id = *validate_required_field("departure", &self.selection.departure)?;
        let arrival_id = *validate_required_field("arrival", &self.selection.arrival)?;
        let travel = validate_required_field("travel_period", &self.selection.travel)?;

        let departure = self
            .directory
            .snapshot()
            .origin(departure_id)
            .cloned()
            .ok_or_else(|| FlightDelayError::validation("departure", "no longer listed"))?;
        let arrival = self
            .directory
            .destinations(departure_id)
            .iter()
            .find(|a| a.id == arrival_id)
            .cloned()
            .ok_or_else(|| FlightDelayError::validation("arrival", "no longer listed"))?;

        Ok(RouteQuery {
            departure,
            arrival,
            month: travel.month(),
        })
    }

    /// Validates the selection, then asks the estimator. A failed estimate
    /// leaves no result behind.
    pub async fn submit(&mut self) -> Result<&EstimationResult> {
        let route = self.route_query()?;

        self.phase = FormPhase::Submitting;
        tracing::info!(
            "Estimating delay for {} -> {} in {}",
            route.departure,
            route.arrival,
            route.month.name()
        );

        match self.estimator.estimate(&route).await {
            Ok(probability) => {
                self.phase = FormPhase::ResultShown;
                let result = self.result.insert(EstimationResult::new(probability));
                Ok(&*result)
            }
            Err(e) => {
                tracing::warn!("Delay estimation failed: {}", e);
                self.result = None;
                self.phase = FormPhase::Ready;
                Err(e)
            }
        }
    }

    /// Clears the selection and result. Origins stay loaded.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.result = None;
        if self.phase != FormPhase::Idle {
            self.phase = FormPhase::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::tests::FakeAirportService;
    use crate::core::estimator::LocalHeuristicEstimator;
    use crate::domain::model::DelayProbability;
    use async_trait::async_trait;
    use chrono::{Month, NaiveDate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingEstimator {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl DelayEstimator for CountingEstimator {
        async fn estimate(&self, _route: &RouteQuery) -> Result<DelayProbability> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(FlightDelayError::malformed("estimator down"))
            } else {
                Ok(DelayProbability::from_fraction(0.22))
            }
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn controller(fail: bool) -> (FormController<FakeAirportService>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let estimator = CountingEstimator {
            calls: calls.clone(),
            fail,
        };
        let directory = AirportDirectory::new(FakeAirportService::sample());
        (FormController::new(directory, Box::new(estimator)), calls)
    }

    #[tokio::test]
    async fn test_mount_loads_origins() {
        let (mut form, _) = controller(false);
        assert_eq!(form.phase(), FormPhase::Idle);

        form.mount().await;

        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(!form.is_loading_origins());
        assert_eq!(form.origins().len(), 3);
    }

    #[tokio::test]
    async fn test_departure_change_clears_arrival() {
        let (mut form, _) = controller(false);
        form.mount().await;
        form.change_departure(1).await.unwrap();
        form.select_arrival(2).unwrap();

        let request = form.select_departure(2).unwrap();
        assert_eq!(form.phase(), FormPhase::DestinationsLoading);
        assert_eq!(form.selection().arrival, None);

        let response = form.fetch_destinations(&request).await;
        form.complete_destinations(response);
        assert_eq!(form.phase(), FormPhase::Ready);
    }

    #[tokio::test]
    async fn test_unknown_departure_rejected() {
        let (mut form, _) = controller(false);
        form.mount().await;

        let err = form.select_departure(42).unwrap_err();
        assert!(matches!(err, FlightDelayError::ValidationError { .. }));
        assert_eq!(form.selection().departure, None);
    }

    #[tokio::test]
    async fn test_arrival_candidates_exclude_departure() {
        let (mut form, _) = controller(false);
        form.mount().await;
        // DEN's destination list includes DEN itself
        form.change_departure(4).await.unwrap();

        let ids: Vec<AirportId> = form.arrival_candidates().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5]);
        assert!(form.select_arrival(4).is_err());
        assert!(form.select_arrival(5).is_ok());
    }

    #[tokio::test]
    async fn test_switching_origin_before_response_shows_latest_only() {
        let (mut form, _) = controller(false);
        form.mount().await;

        let jfk = form.select_departure(1).unwrap();
        let lax = form.select_departure(2).unwrap();
        let lax_response = form.fetch_destinations(&lax).await;
        let jfk_response = form.fetch_destinations(&jfk).await;

        form.complete_destinations(lax_response);
        form.complete_destinations(jfk_response);

        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.selection().departure, Some(2));
        let names: Vec<&str> = form.arrival_candidates().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["JFK", "DEN"]);
    }

    #[tokio::test]
    async fn test_stale_response_while_newer_pending_keeps_loading() {
        let (mut form, _) = controller(false);
        form.mount().await;

        let jfk = form.select_departure(1).unwrap();
        let jfk_response = form.fetch_destinations(&jfk).await;
        let _lax = form.select_departure(2).unwrap();

        form.complete_destinations(jfk_response);
        assert_eq!(form.phase(), FormPhase::DestinationsLoading);
        assert!(form.is_loading_destinations());
        assert!(form.arrival_candidates().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_submit_makes_no_estimate() {
        let (mut form, calls) = controller(false);
        form.mount().await;
        assert!(form.submit().await.is_err());

        form.change_departure(1).await.unwrap();
        assert!(form.submit().await.is_err());

        form.select_arrival(2).unwrap();
        assert!(!form.can_submit());
        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, FlightDelayError::ValidationError { ref field, .. } if field == "travel_period"));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(form.result().is_none());
    }

    #[tokio::test]
    async fn test_submit_shows_result() {
        let (mut form, calls) = controller(false);
        form.mount().await;
        form.change_departure(1).await.unwrap();
        form.select_arrival(2).unwrap();
        form.set_travel_period(TravelPeriod::Date(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()));
        assert!(form.can_submit());

        let result = form.submit().await.unwrap();
        assert_eq!(result.to_string(), "22.0%");
        assert_eq!(form.phase(), FormPhase::ResultShown);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_discards_previous_result() {
        let (mut form, _) = controller(false);
        form.mount().await;
        form.change_departure(1).await.unwrap();
        form.select_arrival(2).unwrap();
        form.set_travel_period(TravelPeriod::Month(Month::May));
        form.submit().await.unwrap();

        form.estimator = Box::new(CountingEstimator {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        });
        let err = form.submit().await.unwrap_err();

        assert!(err.is_network_failure());
        assert!(form.result().is_none());
        assert_eq!(form.phase(), FormPhase::Ready);
    }

    #[tokio::test]
    async fn test_reset_keeps_origins() {
        let directory = AirportDirectory::new(FakeAirportService::sample());
        let mut form = FormController::new(directory, Box::new(LocalHeuristicEstimator::new()));
        form.mount().await;
        form.change_departure(1).await.unwrap();
        form.select_arrival(3).unwrap();
        form.set_travel_period(TravelPeriod::Month(Month::December));
        form.submit().await.unwrap();

        form.reset();

        assert_eq!(form.phase(), FormPhase::Ready);
        assert_eq!(form.selection(), &SelectionState::default());
        assert!(form.result().is_none());
        assert_eq!(form.origins().len(), 3);
    }

    #[tokio::test]
    async fn test_label_only_destinations_keep_all_arrivals() {
        let service = FakeAirportService::with_labels(
            &["JFK - New York", "LAX - Los Angeles", "ORD - Chicago"],
            &[
                (1, vec!["LAX - Los Angeles", "ORD - Chicago"]),
                (2, vec!["JFK - New York", "LAX - Los Angeles"]),
            ],
        );
        let mut form = FormController::new(
            AirportDirectory::new(service),
            Box::new(LocalHeuristicEstimator::new()),
        );
        form.mount().await;

        form.change_departure(1).await.unwrap();
        let names: Vec<&str> = form.arrival_candidates().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["LAX - Los Angeles", "ORD - Chicago"]);
        assert!(form.select_arrival(2).is_ok());

        form.change_departure(2).await.unwrap();
        let names: Vec<&str> = form.arrival_candidates().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["JFK - New York"]);
    }
}
