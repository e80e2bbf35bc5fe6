use clap::Parser;
use flight_delay::utils::{logger, validation::Validate};
use flight_delay::{CliConfig, ConfigProvider, FlightDelayError, FormSession, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting flight-delay");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings: Box<dyn ConfigProvider> = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)
                .and_then(|config| config.validate().map(|_| config))
                .unwrap_or_else(|e| exit_with(&e));
            Box::new(config)
        }
        None => {
            if let Err(e) = cli.validate() {
                exit_with(&e);
            }
            Box::new(cli.clone())
        }
    };

    let mut session = FormSession::from_config(settings.as_ref()).unwrap_or_else(|e| exit_with(&e));
    let input = cli.form_input();

    if cli.list {
        if let Err(e) = session.prepare(&input).await {
            exit_with(&e);
        }
        let form = session.form();

        println!("Origin airports:");
        for airport in form.origins() {
            println!("  {:>4}  {}", airport.id, airport);
        }
        if form.selection().departure.is_some() {
            println!("Arrival airports:");
            for airport in form.arrival_candidates() {
                println!("  {:>4}  {}", airport.id, airport);
            }
        }
        return Ok(());
    }

    match session.run(&input).await {
        Ok(result) => {
            tracing::info!("✅ Estimate ready: {}", result);
            println!("Delay probability: {}", result);
            if let Some(advisory) = result.advisory() {
                println!("⚠️  {}", advisory);
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &FlightDelayError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
