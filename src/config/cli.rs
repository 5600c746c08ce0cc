use crate::domain::model::{CalculationRequest, DistanceMethod, PassengerCategory};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "trike-fare")]
#[command(about = "Tricycle fare calculator for Basey, Samar")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Location catalog (CSV), overrides `locations.catalog`
    #[arg(long)]
    pub catalog: Option<String>,

    /// Audit log (JSON lines), overrides `audit.log_path`
    #[arg(long)]
    pub audit_log: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Price a trip between two catalog locations
    Quote(QuoteArgs),
    /// List recorded fare calculations
    History {
        /// Only show calculations made by this requester
        #[arg(long)]
        requester: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(short, long)]
    pub origin: String,

    #[arg(short, long)]
    pub destination: String,

    #[arg(short, long, value_enum, default_value_t = PassengerCategory::Regular)]
    pub passenger: PassengerCategory,

    #[arg(short, long, value_enum, default_value_t = DistanceMethod::GoogleMaps)]
    pub method: DistanceMethod,

    #[arg(long)]
    pub requester: Option<String>,

    /// Print the quote as JSON
    #[arg(long)]
    pub json: bool,
}

impl QuoteArgs {
    pub fn to_request(&self) -> CalculationRequest {
        let request = CalculationRequest::new(self.origin.clone(), self.destination.clone())
            .passenger(self.passenger)
            .method(self.method);

        match &self.requester {
            Some(requester) => request.requester(requester.clone()),
            None => request,
        }
    }
}
