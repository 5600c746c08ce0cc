// Adapters layer: concrete implementations of the domain ports.

pub mod audit;
pub mod locations;
pub mod routing;

pub use audit::{InMemoryAuditRecorder, JsonLinesAuditRecorder};
pub use locations::{CsvLocationCatalog, InMemoryLocationStore};
pub use routing::GoogleDistanceMatrixProvider;
