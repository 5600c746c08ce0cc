use crate::adapters::routing::{GoogleDistanceMatrixProvider, DEFAULT_DISTANCE_MATRIX_ENDPOINT};
use crate::core::distance::{DistanceResolver, DEFAULT_PROVIDER_TIMEOUT};
use crate::core::engine::DEFAULT_AUDIT_TIMEOUT;
use crate::core::fare::{FareSchedule, CONCESSION_DISCOUNT_RATE, FLAG_DOWN_DISTANCE_KM, FLAG_DOWN_FARE, PER_KM_RATE};
use crate::core::geo::{HaversineEstimator, DEFAULT_ROAD_FACTOR};
use crate::domain::model::PassengerCategory;
use crate::domain::ports::RoutingProvider;
use crate::utils::error::{FareError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FareConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub haversine: HaversineConfig,
    #[serde(default)]
    pub fare: FareScheduleConfig,
    #[serde(default)]
    pub locations: LocationsConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HaversineConfig {
    pub road_factor: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FareScheduleConfig {
    pub flag_down_fare: Option<f64>,
    pub flag_down_distance_km: Option<f64>,
    pub per_km_rate: Option<f64>,
    pub discounts: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationsConfig {
    pub catalog: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    pub log_path: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl FareConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FareError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FareError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are
    /// left in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FareError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn provider_enabled(&self) -> bool {
        self.provider.enabled.unwrap_or(true)
    }

    pub fn provider_endpoint(&self) -> &str {
        self.provider
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_DISTANCE_MATRIX_ENDPOINT)
    }

    /// The API key, if one is set. A `${VAR}` placeholder whose variable was
    /// never exported counts as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }

    pub fn provider_timeout(&self) -> Duration {
        self.provider
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT)
    }

    pub fn road_factor(&self) -> f64 {
        self.haversine.road_factor.unwrap_or(DEFAULT_ROAD_FACTOR)
    }

    pub fn catalog_path(&self) -> Option<&str> {
        self.locations.catalog.as_deref()
    }

    pub fn audit_log_path(&self) -> Option<&str> {
        self.audit.log_path.as_deref()
    }

    pub fn audit_timeout(&self) -> Duration {
        self.audit
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_AUDIT_TIMEOUT)
    }

    pub fn fare_schedule(&self) -> Result<FareSchedule> {
        let fare = &self.fare;
        let flag_down_fare = to_decimal("fare.flag_down_fare", fare.flag_down_fare, FLAG_DOWN_FARE)?;
        let flag_down_distance_km = to_decimal(
            "fare.flag_down_distance_km",
            fare.flag_down_distance_km,
            FLAG_DOWN_DISTANCE_KM,
        )?;
        let per_km_rate = to_decimal("fare.per_km_rate", fare.per_km_rate, PER_KM_RATE)?;

        let discounts = match &fare.discounts {
            Some(table) => table
                .iter()
                .map(|(name, rate)| {
                    let field = format!("fare.discounts.{}", name);
                    let category = parse_category(&field, name)?;
                    to_decimal(&field, Some(*rate), Decimal::ZERO).map(|rate| (category, rate))
                })
                .collect::<Result<HashMap<_, _>>>()?,
            None => [
                PassengerCategory::Senior,
                PassengerCategory::Pwd,
                PassengerCategory::Student,
            ]
            .into_iter()
            .map(|category| (category, CONCESSION_DISCOUNT_RATE))
            .collect(),
        };

        Ok(FareSchedule::new(
            flag_down_fare,
            flag_down_distance_km,
            per_km_rate,
            discounts,
        ))
    }

    pub fn distance_resolver(&self) -> Result<DistanceResolver> {
        let estimator = HaversineEstimator::new(self.road_factor());

        let provider: Option<Arc<dyn RoutingProvider>> = if self.provider_enabled() {
            if self.api_key().is_none() {
                tracing::warn!("⚠️ No routing API key configured, distances will use haversine");
            }
            let provider = GoogleDistanceMatrixProvider::new(
                self.provider_endpoint(),
                self.api_key().map(str::to_string),
                self.provider_timeout(),
            )?;
            Some(Arc::new(provider) as Arc<dyn RoutingProvider>)
        } else {
            None
        };

        Ok(DistanceResolver::new(provider, estimator).with_timeout(self.provider_timeout()))
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.provider_enabled() {
            validation::validate_url("provider.endpoint", self.provider_endpoint())?;
        }
        if let Some(api_key) = &self.provider.api_key {
            validation::validate_non_empty_string("provider.api_key", api_key)?;
        }
        if let Some(timeout) = self.provider.timeout_ms {
            validation::validate_range("provider.timeout_ms", timeout, 1, 60_000)?;
        }

        validation::validate_range("haversine.road_factor", self.road_factor(), 1.0, 3.0)?;

        let fare = &self.fare;
        if let Some(value) = fare.flag_down_fare {
            validation::validate_range("fare.flag_down_fare", value, 0.0, 10_000.0)?;
        }
        if let Some(value) = fare.flag_down_distance_km {
            validation::validate_range("fare.flag_down_distance_km", value, 0.0, 1_000.0)?;
        }
        if let Some(value) = fare.per_km_rate {
            validation::validate_range("fare.per_km_rate", value, 0.0, 10_000.0)?;
        }
        if let Some(discounts) = &fare.discounts {
            for (name, rate) in discounts {
                let field = format!("fare.discounts.{}", name);
                let category = parse_category(&field, name)?;
                if category == PassengerCategory::Regular && *rate != 0.0 {
                    return Err(FareError::InvalidConfigValueError {
                        field,
                        value: rate.to_string(),
                        reason: "REGULAR passengers are never discounted".to_string(),
                    });
                }
                validation::validate_range(&field, *rate, 0.0, 1.0)?;
            }
        }

        if let Some(catalog) = self.catalog_path() {
            validation::validate_path("locations.catalog", catalog)?;
            validation::validate_file_extension("locations.catalog", catalog, &["csv"])?;
        }
        if let Some(log_path) = self.audit_log_path() {
            validation::validate_path("audit.log_path", log_path)?;
        }
        if let Some(timeout) = self.audit.timeout_ms {
            validation::validate_range("audit.timeout_ms", timeout, 1, 60_000)?;
        }

        Ok(())
    }
}

impl Validate for FareConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn parse_category(field: &str, name: &str) -> Result<PassengerCategory> {
    name.parse().map_err(|reason: String| FareError::InvalidConfigValueError {
        field: field.to_string(),
        value: name.to_string(),
        reason,
    })
}

fn to_decimal(field: &str, value: Option<f64>, default: Decimal) -> Result<Decimal> {
    match value {
        None => Ok(default),
        Some(raw) => Decimal::from_f64(raw).ok_or_else(|| FareError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "not representable as a money amount".to_string(),
        }),
    }
}
