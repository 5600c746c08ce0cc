use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `lat,lng` as routing services expect it in query strings.
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationCategory {
    Barangay,
    Landmark,
    Sitio,
    Poblacion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub category: LocationCategory,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barangay: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerCategory {
    #[default]
    Regular,
    Senior,
    Pwd,
    Student,
}

impl PassengerCategory {
    pub const ALL: [PassengerCategory; 4] = [
        PassengerCategory::Regular,
        PassengerCategory::Senior,
        PassengerCategory::Pwd,
        PassengerCategory::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerCategory::Regular => "REGULAR",
            PassengerCategory::Senior => "SENIOR",
            PassengerCategory::Pwd => "PWD",
            PassengerCategory::Student => "STUDENT",
        }
    }
}

impl FromStr for PassengerCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PassengerCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown passenger category '{}'", s))
    }
}

impl fmt::Display for PassengerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceMethod {
    #[default]
    GoogleMaps,
    Haversine,
}

impl DistanceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMethod::GoogleMaps => "GOOGLE_MAPS",
            DistanceMethod::Haversine => "HAVERSINE",
        }
    }
}

impl fmt::Display for DistanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDuration {
    pub seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// What a routing provider reports for one origin/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMeasurement {
    pub distance_meters: f64,
    pub duration: Option<TravelDuration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub kilometers: f64,
    pub duration: Option<TravelDuration>,
    pub method_used: DistanceMethod,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_fare: Decimal,
    #[serde(rename = "discount_applied", with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(rename = "fare", with = "rust_decimal::serde::float")]
    pub final_fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub flag_down_fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub flag_down_distance_km: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub additional_distance_km: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub additional_fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub origin_id: String,
    pub destination_id: String,
    #[serde(default)]
    pub passenger_category: PassengerCategory,
    #[serde(default)]
    pub method: DistanceMethod,
    #[serde(default)]
    pub requester: Option<String>,
}

impl CalculationRequest {
    pub fn new(origin_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            origin_id: origin_id.into(),
            destination_id: destination_id.into(),
            passenger_category: PassengerCategory::default(),
            method: DistanceMethod::default(),
            requester: None,
        }
    }

    pub fn passenger(mut self, category: PassengerCategory) -> Self {
        self.passenger_category = category;
        self
    }

    pub fn method(mut self, method: DistanceMethod) -> Self {
        self.method = method;
        self
    }

    pub fn requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }
}

/// One completed calculation, as handed to the audit recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareCalculationRecord {
    pub origin: Location,
    pub destination: Location,
    pub distance: DistanceResult,
    pub passenger_category: PassengerCategory,
    pub fare: FareBreakdown,
    pub requester: Option<String>,
    pub calculated_at: DateTime<Utc>,
}
