use clap::Parser;
use std::sync::Arc;
use trike_fare::config::cli::{Command, QuoteArgs};
use trike_fare::utils::error::ErrorSeverity;
use trike_fare::utils::{logger, validation::Validate};
use trike_fare::{
    CliConfig, CsvLocationCatalog, FareConfig, FareEngine, FareError, FareQuote,
    JsonLinesAuditRecorder, Result,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting trike-fare CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let json_output = matches!(&cli.command, Command::Quote(args) if args.json);

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Fare calculation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        if json_output {
            match serde_json::to_string_pretty(&e.to_descriptor()) {
                Ok(body) => println!("{}", body),
                Err(_) => eprintln!("❌ {}", e.user_friendly_message()),
            }
        } else {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        }

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            FareConfig::from_file(path)?
        }
        None => FareConfig::default(),
    };
    if let Some(catalog) = &cli.catalog {
        config.locations.catalog = Some(catalog.clone());
    }
    if let Some(audit_log) = &cli.audit_log {
        config.audit.log_path = Some(audit_log.clone());
    }

    config.validate()?;

    match &cli.command {
        Command::Quote(args) => quote(&config, args).await,
        Command::History { requester } => history(&config, requester.as_deref()).await,
    }
}

async fn quote(config: &FareConfig, args: &QuoteArgs) -> Result<()> {
    let catalog = config
        .catalog_path()
        .ok_or_else(|| FareError::MissingConfigError {
            field: "locations.catalog".to_string(),
        })?;

    let store = CsvLocationCatalog::from_path(catalog)?;
    tracing::info!("📍 Loaded {} locations from {}", store.len(), catalog);

    let mut engine = FareEngine::new(
        Arc::new(store),
        config.distance_resolver()?,
        config.fare_schedule()?,
    );
    if let Some(log_path) = config.audit_log_path() {
        engine = engine
            .with_audit(Arc::new(JsonLinesAuditRecorder::new(log_path)))
            .with_audit_timeout(config.audit_timeout());
    }

    let quote = engine.calculate(&args.to_request()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        print_quote(&quote);
    }
    Ok(())
}

fn print_quote(quote: &FareQuote) {
    println!(
        "🛺 {} → {}",
        quote.origin_location.name, quote.destination_location.name
    );
    println!(
        "📏 Distance: {:.2} km ({})",
        quote.distance.kilometers, quote.method
    );
    if let Some(duration) = &quote.route.duration {
        match &duration.text {
            Some(text) => println!("⏱️ Travel time: {}", text),
            None => println!("⏱️ Travel time: {} s", duration.seconds),
        }
    }

    let breakdown = &quote.fare.breakdown;
    println!("💰 Base fare: ₱{:.2}", breakdown.base_fare);
    if let Some(discount) = &quote.discount_info {
        println!(
            "🎟️ {} discount ({}%): -₱{:.2}",
            discount.passenger_category,
            (discount.discount_rate * rust_decimal::Decimal::ONE_HUNDRED).normalize(),
            quote.fare.discount_applied
        );
    }
    println!("✅ Fare: ₱{:.2}", quote.fare.fare);

    if let Some(notice) = &quote.notice {
        println!("ℹ️ {}", notice);
    }
}

async fn history(config: &FareConfig, requester: Option<&str>) -> Result<()> {
    let log_path = config
        .audit_log_path()
        .ok_or_else(|| FareError::MissingConfigError {
            field: "audit.log_path".to_string(),
        })?;

    let records = JsonLinesAuditRecorder::new(log_path)
        .history(requester)
        .await?;

    if records.is_empty() {
        println!("No fare calculations recorded yet.");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {} → {}  {:.2} km  {}  ₱{:.2}{}",
            record.calculated_at.format("%Y-%m-%d %H:%M:%S"),
            record.origin.name,
            record.destination.name,
            record.distance.kilometers,
            record.passenger_category,
            record.fare.final_fare,
            record
                .requester
                .as_deref()
                .map(|r| format!("  ({})", r))
                .unwrap_or_default()
        );
    }
    tracing::info!("Listed {} fare calculations", records.len());
    Ok(())
}
