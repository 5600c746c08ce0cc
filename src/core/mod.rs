pub mod assembler;
pub mod distance;
pub mod engine;
pub mod fare;
pub mod geo;
pub mod locations;

pub use crate::domain::model::{
    CalculationRequest, Coordinates, DistanceMethod, DistanceResult, FareBreakdown,
    FareCalculationRecord, Location, PassengerCategory,
};
pub use crate::domain::ports::{AuditRecorder, LocationStore, RoutingProvider};
pub use crate::utils::error::Result;
