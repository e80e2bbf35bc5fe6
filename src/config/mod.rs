pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::core::session::FormInput;
    use crate::domain::model::TravelPeriod;
    use crate::domain::ports::{ConfigProvider, EstimationStrategy};
    use crate::utils::error::Result;
    use crate::utils::validation::{validate_positive_number, validate_url, Validate};
    use chrono::{Month, NaiveDate};
    use clap::Parser;
    use std::time::Duration;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "flight-delay")]
    #[command(about = "Estimate the chance of a flight delay between two airports")]
    pub struct CliConfig {
        /// Base URL of the airport and delay estimation service
        #[arg(long, default_value = "http://localhost:5000")]
        pub service_url: String,

        #[arg(long, default_value = "10")]
        pub timeout_seconds: u64,

        #[arg(long, value_enum, default_value_t = EstimationStrategy::Remote)]
        pub strategy: EstimationStrategy,

        /// TOML file with service and estimator settings; replaces the flags above
        #[arg(short, long)]
        pub config: Option<String>,

        /// Departure airport, by id or code
        #[arg(long)]
        pub from: Option<String>,

        /// Arrival airport, by id or code
        #[arg(long)]
        pub to: Option<String>,

        /// Month of travel, e.g. "July"
        #[arg(long, conflicts_with = "date")]
        pub month: Option<Month>,

        /// Date of travel (YYYY-MM-DD)
        #[arg(long)]
        pub date: Option<NaiveDate>,

        /// List origin airports, and the arrival candidates when --from is set
        #[arg(long)]
        pub list: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        pub fn travel_period(&self) -> Option<TravelPeriod> {
            self.date
                .map(TravelPeriod::Date)
                .or(self.month.map(TravelPeriod::Month))
        }

        pub fn form_input(&self) -> FormInput {
            FormInput {
                departure: self.from.clone(),
                arrival: self.to.clone(),
                travel: self.travel_period(),
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn service_url(&self) -> &str {
            &self.service_url
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_seconds)
        }

        fn strategy(&self) -> EstimationStrategy {
            self.strategy
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_url("service_url", &self.service_url)?;
            validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::parse_from(["flight-delay"]);
            assert_eq!(config.service_url(), "http://localhost:5000");
            assert_eq!(config.strategy(), EstimationStrategy::Remote);
            assert_eq!(config.request_timeout(), Duration::from_secs(10));
            assert!(config.travel_period().is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_form_flags() {
            let config = CliConfig::parse_from([
                "flight-delay",
                "--strategy",
                "local",
                "--from",
                "JFK",
                "--to",
                "2",
                "--date",
                "2025-07-04",
            ]);
            let input = config.form_input();

            assert_eq!(config.strategy(), EstimationStrategy::Local);
            assert_eq!(input.departure.as_deref(), Some("JFK"));
            assert_eq!(input.arrival.as_deref(), Some("2"));
            assert_eq!(input.travel.map(|t| t.month()), Some(Month::July));
        }

        #[test]
        fn test_month_and_date_conflict() {
            let parsed = CliConfig::try_parse_from([
                "flight-delay",
                "--month",
                "July",
                "--date",
                "2025-07-04",
            ]);
            assert!(parsed.is_err());
        }

        #[test]
        fn test_zero_timeout_rejected() {
            let config = CliConfig::parse_from(["flight-delay", "--timeout-seconds", "0"]);
            assert!(config.validate().is_err());
        }
    }
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;
