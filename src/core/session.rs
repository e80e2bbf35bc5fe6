use crate::adapters::http::ServiceClient;
use crate::core::directory::AirportDirectory;
use crate::core::estimator::build_estimator;
use crate::core::form::FormController;
use crate::domain::model::{Airport, AirportId, EstimationResult, TravelPeriod};
use crate::domain::ports::{AirportService, ConfigProvider};
use crate::utils::error::{FlightDelayError, Result};

/// Field values as typed by the user. Airports may be given by id or code.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub travel: Option<TravelPeriod>,
}

/// Finds an airport by numeric id or by code, ignoring case.
pub fn resolve_airport<'a, I>(airports: I, key: &str) -> Option<AirportId>
where
    I: IntoIterator<Item = &'a Airport>,
{
    let key = key.trim();
    let by_id = key.parse::<AirportId>().ok();
    airports
        .into_iter()
        .find(|a| Some(a.id) == by_id || a.code().eq_ignore_ascii_case(key))
        .map(|a| a.id)
}

/// One mounted form fed from [`FormInput`], the way the CLI uses it.
pub struct FormSession<S: AirportService> {
    form: FormController<S>,
}

impl FormSession<ServiceClient> {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let directory = AirportDirectory::new(ServiceClient::from_config(config)?);
        let estimator = build_estimator(config)?;
        Ok(Self::new(FormController::new(directory, estimator)))
    }
}

impl<S: AirportService> FormSession<S> {
    pub fn new(form: FormController<S>) -> Self {
        Self { form }
    }

    pub fn form(&self) -> &FormController<S> {
        &self.form
    }

    /// Mounts the form and applies the given fields in order: departure,
    /// arrival, travel period.
    pub async fn prepare(&mut self, input: &FormInput) -> Result<()> {
        self.form.mount().await;

        if let Some(key) = &input.departure {
            let origin = resolve_airport(self.form.origins(), key).ok_or_else(|| {
                FlightDelayError::validation("departure", format!("no origin airport '{}'", key))
            })?;
            self.form.change_departure(origin).await?;
        }

        if let Some(key) = &input.arrival {
            let arrival = resolve_airport(self.form.arrival_candidates(), key).ok_or_else(|| {
                FlightDelayError::validation("arrival", format!("no destination airport '{}'", key))
            })?;
            self.form.select_arrival(arrival)?;
        }

        if let Some(period) = input.travel {
            self.form.set_travel_period(period);
        }

        Ok(())
    }

    pub async fn submit(&mut self) -> Result<EstimationResult> {
        self.form.submit().await.cloned()
    }

    pub async fn run(&mut self, input: &FormInput) -> Result<EstimationResult> {
        self.prepare(input).await?;
        self.submit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::tests::FakeAirportService;
    use crate::core::estimator::LocalHeuristicEstimator;
    use chrono::Month;

    fn session() -> FormSession<FakeAirportService> {
        let directory = AirportDirectory::new(FakeAirportService::sample());
        FormSession::new(FormController::new(
            directory,
            Box::new(LocalHeuristicEstimator::with_fixed_base(20.0)),
        ))
    }

    #[test]
    fn test_resolve_airport_by_id_or_code() {
        let airports = [Airport::new(1, "JFK - New York"), Airport::new(2, "LAX")];
        assert_eq!(resolve_airport(&airports, "2"), Some(2));
        assert_eq!(resolve_airport(&airports, "jfk"), Some(1));
        assert_eq!(resolve_airport(&airports, "ORD"), None);
    }

    #[tokio::test]
    async fn test_run_with_codes() {
        let mut session = session();
        let input = FormInput {
            departure: Some("JFK".to_string()),
            arrival: Some("ord".to_string()),
            travel: Some(TravelPeriod::Month(Month::August)),
        };

        let result = session.run(&input).await.unwrap();

        // 20 * 1.3 * 1.2
        assert_eq!(result.to_string(), "31.2%");
        assert!(result.advisory().is_some());
    }

    #[tokio::test]
    async fn test_unknown_arrival_is_validation_error() {
        let mut session = session();
        let input = FormInput {
            departure: Some("1".to_string()),
            arrival: Some("BOS".to_string()),
            travel: Some(TravelPeriod::Month(Month::May)),
        };

        let err = session.run(&input).await.unwrap_err();
        assert!(matches!(err, FlightDelayError::ValidationError { ref field, .. } if field == "arrival"));
    }

    #[tokio::test]
    async fn test_missing_period_blocks_submit() {
        let mut session = session();
        let input = FormInput {
            departure: Some("1".to_string()),
            arrival: Some("2".to_string()),
            travel: None,
        };

        assert!(session.run(&input).await.is_err());
        assert!(session.form().result().is_none());
    }
}
