use crate::core::geo::HaversineEstimator;
use crate::domain::model::{Coordinates, DistanceMethod, DistanceResult, TravelDuration};
use crate::domain::ports::RoutingProvider;
use crate::utils::error::{FareError, Result, RoutingError};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Methods to try, in order, for a preferred method.
pub fn attempt_plan(preferred: DistanceMethod) -> &'static [DistanceMethod] {
    match preferred {
        DistanceMethod::GoogleMaps => &[DistanceMethod::GoogleMaps, DistanceMethod::Haversine],
        DistanceMethod::Haversine => &[DistanceMethod::Haversine],
    }
}

struct Measured {
    kilometers: f64,
    duration: Option<TravelDuration>,
}

enum AttemptError {
    /// The method could not produce a distance; try the next one.
    Recoverable(String),
    /// The method produced a distance that must not be priced.
    Fatal(FareError),
}

/// Resolves trip distance with the routing provider first and the local
/// haversine estimate as fallback. Provider failures never escape: they
/// show up as `fallback = true` on the result.
pub struct DistanceResolver {
    provider: Option<Arc<dyn RoutingProvider>>,
    estimator: HaversineEstimator,
    provider_timeout: Duration,
}

impl DistanceResolver {
    pub fn new(provider: Option<Arc<dyn RoutingProvider>>, estimator: HaversineEstimator) -> Self {
        Self {
            provider,
            estimator,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Haversine only; `GOOGLE_MAPS` requests always fall back.
    pub fn offline(estimator: HaversineEstimator) -> Self {
        Self::new(None, estimator)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub async fn resolve(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        preferred: DistanceMethod,
    ) -> Result<DistanceResult> {
        if origin == destination {
            return Err(FareError::SameLocation);
        }

        let mut failures = Vec::new();
        for (index, method) in attempt_plan(preferred).iter().copied().enumerate() {
            match self.attempt(method, origin, destination).await {
                Ok(measured) => {
                    let fallback = index > 0;
                    if fallback {
                        tracing::warn!(
                            "⚠️ {} unavailable, fare priced with {} ({:.3} km)",
                            preferred,
                            method,
                            measured.kilometers
                        );
                    }
                    return Ok(DistanceResult {
                        kilometers: measured.kilometers,
                        duration: measured.duration,
                        method_used: method,
                        fallback,
                    });
                }
                Err(AttemptError::Recoverable(reason)) => {
                    tracing::warn!("{} failed: {}", method, reason);
                    failures.push(format!("{}: {}", method, reason));
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
            }
        }

        Err(FareError::DistanceProviderUnavailable {
            message: failures.join("; "),
        })
    }

    async fn attempt(
        &self,
        method: DistanceMethod,
        origin: Coordinates,
        destination: Coordinates,
    ) -> std::result::Result<Measured, AttemptError> {
        match method {
            DistanceMethod::GoogleMaps => self.measure_with_provider(origin, destination).await,
            DistanceMethod::Haversine => self
                .estimator
                .estimate_km(origin, destination)
                .map(|kilometers| Measured {
                    kilometers,
                    duration: None,
                })
                .map_err(|err| AttemptError::Recoverable(err.to_string())),
        }
    }

    async fn measure_with_provider(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> std::result::Result<Measured, AttemptError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            AttemptError::Recoverable(
                RoutingError::NotConfigured("no routing provider".to_string()).to_string(),
            )
        })?;

        tracing::debug!(
            "Asking {} for {:?} -> {:?}",
            provider.name(),
            origin,
            destination
        );

        let measurement =
            match tokio::time::timeout(self.provider_timeout, provider.measure(origin, destination))
                .await
            {
                Ok(Ok(measurement)) => measurement,
                Ok(Err(err)) => return Err(AttemptError::Recoverable(err.to_string())),
                Err(_) => {
                    return Err(AttemptError::Recoverable(
                        RoutingError::Timeout(self.provider_timeout).to_string(),
                    ))
                }
            };

        let kilometers = measurement.distance_meters / 1000.0;
        if !kilometers.is_finite() || kilometers < 0.0 {
            tracing::error!(
                "❌ {} reported an impossible distance: {} m",
                provider.name(),
                measurement.distance_meters
            );
            return Err(AttemptError::Fatal(FareError::InvalidDistance {
                distance_km: kilometers,
            }));
        }

        if kilometers == 0.0 {
            return Err(AttemptError::Recoverable(
                RoutingError::Malformed("zero distance between distinct points".to_string())
                    .to_string(),
            ));
        }

        Ok(Measured {
            kilometers,
            duration: measurement.duration,
        })
    }
}
