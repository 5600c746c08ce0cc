use crate::domain::model::Coordinates;
use crate::utils::error::{FareError, Result};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Roads in Basey run about 40% longer than the straight line between
/// two points.
pub const DEFAULT_ROAD_FACTOR: f64 = 1.4;

/// Great-circle distance in kilometers.
pub fn haversine_km(origin: Coordinates, destination: Coordinates) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = destination.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (destination.longitude - origin.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Local road-distance estimate: haversine times a correction factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaversineEstimator {
    road_factor: f64,
}

impl HaversineEstimator {
    pub fn new(road_factor: f64) -> Self {
        Self { road_factor }
    }

    pub fn road_factor(&self) -> f64 {
        self.road_factor
    }

    pub fn estimate_km(&self, origin: Coordinates, destination: Coordinates) -> Result<f64> {
        if !self.road_factor.is_finite() || self.road_factor < 1.0 {
            return Err(FareError::DistanceProviderUnavailable {
                message: format!("road factor {} is not usable", self.road_factor),
            });
        }

        let straight = haversine_km(origin, destination);
        if !straight.is_finite() {
            return Err(FareError::DistanceProviderUnavailable {
                message: format!(
                    "haversine produced no distance for {:?} -> {:?}",
                    origin, destination
                ),
            });
        }

        Ok(straight * self.road_factor)
    }
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ROAD_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_latitude() {
        let km = haversine_km(Coordinates::new(0.0, 125.0), Coordinates::new(1.0, 125.0));
        assert!((km - 111.195).abs() < 0.001, "got {}", km);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Coordinates::new(11.2806, 125.0683);
        let b = Coordinates::new(11.2589, 125.1187);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_applies_road_factor() {
        let origin = Coordinates::new(10.0, 125.0);
        let destination = Coordinates::new(10.05, 125.05);

        let straight = haversine_km(origin, destination);
        assert!(straight > 7.7 && straight < 7.9, "got {}", straight);

        let estimate = HaversineEstimator::default()
            .estimate_km(origin, destination)
            .unwrap();
        assert!((estimate - straight * 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_unusable_road_factor_is_reported() {
        let estimator = HaversineEstimator::new(f64::NAN);
        let result = estimator.estimate_km(Coordinates::new(10.0, 125.0), Coordinates::new(10.1, 125.0));
        assert!(matches!(
            result,
            Err(FareError::DistanceProviderUnavailable { .. })
        ));
    }
}
