use crate::core::assembler::{assemble, FareQuote};
use crate::core::distance::DistanceResolver;
use crate::core::fare::FareSchedule;
use crate::core::locations::CoordinateResolver;
use crate::domain::model::{CalculationRequest, FareCalculationRecord};
use crate::domain::ports::{AuditRecorder, LocationStore};
use crate::utils::error::{FareError, Result};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Prices one trip per call. Holds no per-request state, so a single
/// engine can serve concurrent requests behind an `Arc`.
pub struct FareEngine {
    locations: CoordinateResolver,
    distances: DistanceResolver,
    schedule: FareSchedule,
    audit: Option<Arc<dyn AuditRecorder>>,
    audit_timeout: Duration,
}

impl FareEngine {
    pub fn new(store: Arc<dyn LocationStore>, distances: DistanceResolver, schedule: FareSchedule) -> Self {
        Self {
            locations: CoordinateResolver::new(store),
            distances,
            schedule,
            audit: None,
            audit_timeout: DEFAULT_AUDIT_TIMEOUT,
        }
    }

    pub fn with_audit(mut self, recorder: Arc<dyn AuditRecorder>) -> Self {
        self.audit = Some(recorder);
        self
    }

    /// Upper bound on a single audit write. The quote is returned once it
    /// expires, recorded or not.
    pub fn with_audit_timeout(mut self, timeout: Duration) -> Self {
        self.audit_timeout = timeout;
        self
    }

    pub fn schedule(&self) -> &FareSchedule {
        &self.schedule
    }

    pub async fn calculate(&self, request: &CalculationRequest) -> Result<FareQuote> {
        tracing::debug!(
            "Calculating fare {} -> {} ({}, {})",
            request.origin_id,
            request.destination_id,
            request.passenger_category,
            request.method
        );

        if request.origin_id == request.destination_id {
            return Err(FareError::SameLocation);
        }

        let (origin, destination) = self
            .locations
            .resolve_pair(&request.origin_id, &request.destination_id)
            .await?;

        let distance = self
            .distances
            .resolve(origin.coordinates, destination.coordinates, request.method)
            .await?;

        let breakdown = self
            .schedule
            .rate(distance.kilometers, request.passenger_category)?;

        tracing::info!(
            "✅ {} -> {}: {:.2} km via {}, fare ₱{}",
            origin.name,
            destination.name,
            distance.kilometers,
            distance.method_used,
            breakdown.final_fare
        );

        if let Some(recorder) = &self.audit {
            let record = FareCalculationRecord {
                origin: origin.clone(),
                destination: destination.clone(),
                distance: distance.clone(),
                passenger_category: request.passenger_category,
                fare: breakdown.clone(),
                requester: request.requester.clone(),
                calculated_at: chrono::Utc::now(),
            };
            match tokio::time::timeout(self.audit_timeout, recorder.record(&record)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("⚠️ Fare calculation was not recorded: {}", e),
                Err(_) => tracing::warn!(
                    "⚠️ Fare calculation was not recorded: audit write took longer than {:?}",
                    self.audit_timeout
                ),
            }
        }

        Ok(assemble(
            origin,
            destination,
            request.method,
            request.passenger_category,
            distance,
            breakdown,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audit::InMemoryAuditRecorder;
    use crate::adapters::locations::InMemoryLocationStore;
    use crate::core::geo::HaversineEstimator;
    use crate::domain::model::{
        Coordinates, DistanceMethod, Location, LocationCategory, PassengerCategory,
    };
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn catalog() -> Arc<dyn LocationStore> {
        Arc::new(InMemoryLocationStore::from_locations(vec![
            Location {
                id: "a".to_string(),
                name: "Point A".to_string(),
                category: LocationCategory::Barangay,
                coordinates: Coordinates::new(10.0, 125.0),
                barangay: None,
            },
            Location {
                id: "b".to_string(),
                name: "Point B".to_string(),
                category: LocationCategory::Sitio,
                coordinates: Coordinates::new(10.05, 125.05),
                barangay: Some("Point A".to_string()),
            },
            Location {
                id: "twin".to_string(),
                name: "Point A annex".to_string(),
                category: LocationCategory::Landmark,
                coordinates: Coordinates::new(10.0, 125.0),
                barangay: None,
            },
        ]))
    }

    fn engine() -> FareEngine {
        FareEngine::new(
            catalog(),
            DistanceResolver::offline(HaversineEstimator::default()),
            FareSchedule::default(),
        )
    }

    struct BrokenRecorder;

    #[async_trait]
    impl AuditRecorder for BrokenRecorder {
        async fn record(&self, _record: &FareCalculationRecord) -> Result<()> {
            Err(FareError::AuditError {
                message: "disk full".to_string(),
            })
        }
    }

    struct HangingRecorder;

    #[async_trait]
    impl AuditRecorder for HangingRecorder {
        async fn record(&self, _record: &FareCalculationRecord) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_same_id_rejected() {
        let request = CalculationRequest::new("a", "a");
        let result = engine().calculate(&request).await;
        assert!(matches!(result, Err(FareError::SameLocation)));
    }

    #[tokio::test]
    async fn test_same_coordinates_rejected() {
        let request = CalculationRequest::new("a", "twin").method(DistanceMethod::Haversine);
        let result = engine().calculate(&request).await;
        assert!(matches!(result, Err(FareError::SameLocation)));
    }

    #[tokio::test]
    async fn test_unknown_location() {
        let request = CalculationRequest::new("a", "nowhere");
        let result = engine().calculate(&request).await;
        assert!(matches!(result, Err(FareError::LocationNotFound { .. })));
    }

    #[tokio::test]
    async fn test_offline_google_request_falls_back() {
        let request = CalculationRequest::new("a", "b").passenger(PassengerCategory::Student);
        let quote = engine().calculate(&request).await.unwrap();

        assert_eq!(quote.method, DistanceMethod::Haversine);
        assert!(quote.fallback);
        assert_eq!(
            quote.fare.fare,
            quote.fare.breakdown.base_fare - quote.fare.breakdown.discount_amount
        );
        assert!(quote.fare.breakdown.base_fare > dec!(15.00));
    }

    #[tokio::test]
    async fn test_identical_requests_price_identically() {
        let engine = engine();
        let request = CalculationRequest::new("a", "b")
            .passenger(PassengerCategory::Pwd)
            .method(DistanceMethod::Haversine);

        let first = engine.calculate(&request).await.unwrap();
        let second = engine.calculate(&request).await.unwrap();
        assert_eq!(first.fare.breakdown, second.fare.breakdown);
    }

    #[tokio::test]
    async fn test_successful_calculation_is_recorded() {
        let recorder = Arc::new(InMemoryAuditRecorder::default());
        let engine = engine().with_audit(recorder.clone());
        let request = CalculationRequest::new("a", "b")
            .method(DistanceMethod::Haversine)
            .requester("juan");

        engine.calculate(&request).await.unwrap();
        let _ = engine.calculate(&CalculationRequest::new("a", "a")).await;

        let records = recorder.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].requester.as_deref(), Some("juan"));
        assert_eq!(records[0].origin.id, "a");
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_calculation() {
        let engine = engine().with_audit(Arc::new(BrokenRecorder));
        let request = CalculationRequest::new("a", "b").method(DistanceMethod::Haversine);
        assert!(engine.calculate(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_stalled_audit_write_does_not_hold_back_quote() {
        let engine = engine()
            .with_audit(Arc::new(HangingRecorder))
            .with_audit_timeout(Duration::from_millis(50));
        let request = CalculationRequest::new("a", "b").method(DistanceMethod::Haversine);

        let quote = tokio::time::timeout(Duration::from_secs(3), engine.calculate(&request))
            .await
            .expect("calculate returned while the recorder was stalled")
            .unwrap();
        assert_eq!(quote.method, DistanceMethod::Haversine);
    }
}
