pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::FareConfig;

pub use adapters::{CsvLocationCatalog, InMemoryLocationStore, JsonLinesAuditRecorder};
pub use core::{
    assembler::FareQuote, distance::DistanceResolver, engine::FareEngine, fare::FareSchedule,
};
pub use domain::model::{CalculationRequest, DistanceMethod, PassengerCategory};
pub use utils::error::{FareError, Result};
