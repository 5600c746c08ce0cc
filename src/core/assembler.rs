use crate::domain::model::{
    DistanceMethod, DistanceResult, FareBreakdown, Location, PassengerCategory, TravelDuration,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const FALLBACK_NOTICE: &str =
    "Using GPS calculation as fallback. Distance estimated using road network multiplier.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub kilometers: f64,
    pub meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub duration: Option<TravelDuration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub fare: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_applied: Decimal,
    pub breakdown: FareBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountInfo {
    pub passenger_category: PassengerCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_rate: Decimal,
}

/// The priced response handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub distance: DistanceSummary,
    pub route: RouteSummary,
    pub fare: FareSummary,
    pub method: DistanceMethod,
    pub requested_method: DistanceMethod,
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub passenger_category: PassengerCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_info: Option<DiscountInfo>,
    pub origin_location: Location,
    pub destination_location: Location,
}

pub fn assemble(
    origin: Location,
    destination: Location,
    requested_method: DistanceMethod,
    passenger_category: PassengerCategory,
    distance: DistanceResult,
    breakdown: FareBreakdown,
) -> FareQuote {
    let discount_info = (breakdown.discount_rate > Decimal::ZERO).then(|| DiscountInfo {
        passenger_category,
        discount_rate: breakdown.discount_rate,
    });

    FareQuote {
        distance: DistanceSummary {
            kilometers: distance.kilometers,
            meters: distance.kilometers * 1000.0,
        },
        route: RouteSummary {
            duration: distance.duration,
        },
        fare: FareSummary {
            fare: breakdown.final_fare,
            discount_applied: breakdown.discount_amount,
            breakdown,
        },
        method: distance.method_used,
        requested_method,
        fallback: distance.fallback,
        notice: distance.fallback.then(|| FALLBACK_NOTICE.to_string()),
        passenger_category,
        discount_info,
        origin_location: origin,
        destination_location: destination,
    }
}
