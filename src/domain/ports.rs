use crate::domain::model::{Coordinates, FareCalculationRecord, Location, RouteMeasurement};
use crate::utils::error::{Result, RoutingError};
use async_trait::async_trait;

/// Read access to the location store. Unknown or retired ids fail with
/// `FareError::LocationNotFound`.
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get_location(&self, id: &str) -> Result<Location>;
}

/// An external service that measures road distance between two points.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn measure(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> std::result::Result<RouteMeasurement, RoutingError>;
}

#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(&self, record: &FareCalculationRecord) -> Result<()>;
}
