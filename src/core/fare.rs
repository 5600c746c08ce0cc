//! Tricycle fare schedule (Basey Municipal Ordinance 105, series of 2023).
//!
//! The first 3 km cost a flat ₱15.00; every kilometer beyond that is
//! charged at ₱3.00, pro rata. Senior citizens, PWDs and students get 20%
//! off. Amounts are rounded half-up to centavos.

use crate::domain::model::{FareBreakdown, PassengerCategory};
use crate::utils::error::{FareError, Result};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::HashMap;

pub const FLAG_DOWN_FARE: Decimal = dec!(15.00);
pub const FLAG_DOWN_DISTANCE_KM: Decimal = dec!(3.0);
pub const PER_KM_RATE: Decimal = dec!(3.00);
pub const CONCESSION_DISCOUNT_RATE: Decimal = dec!(0.20);

#[derive(Debug, Clone, PartialEq)]
pub struct FareSchedule {
    pub flag_down_fare: Decimal,
    pub flag_down_distance_km: Decimal,
    pub per_km_rate: Decimal,
    discounts: HashMap<PassengerCategory, Decimal>,
}

impl FareSchedule {
    pub fn new(
        flag_down_fare: Decimal,
        flag_down_distance_km: Decimal,
        per_km_rate: Decimal,
        discounts: HashMap<PassengerCategory, Decimal>,
    ) -> Self {
        Self {
            flag_down_fare,
            flag_down_distance_km,
            per_km_rate,
            discounts,
        }
    }

    pub fn discount_rate(&self, category: PassengerCategory) -> Decimal {
        self.discounts
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn rate(&self, distance_km: f64, category: PassengerCategory) -> Result<FareBreakdown> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            tracing::error!("❌ Refusing to rate invalid distance {} km", distance_km);
            return Err(FareError::InvalidDistance { distance_km });
        }
        let distance = Decimal::from_f64(distance_km)
            .ok_or(FareError::InvalidDistance { distance_km })?;

        let overflow = || {
            tracing::error!("❌ Fare for {} km does not fit a money amount", distance_km);
            FareError::InvalidDistance { distance_km }
        };

        let additional_distance = distance
            .checked_sub(self.flag_down_distance_km)
            .ok_or_else(overflow)?
            .max(Decimal::ZERO);
        let additional_fare = additional_distance
            .checked_mul(self.per_km_rate)
            .ok_or_else(overflow)?;
        let base_fare = round_money(
            self.flag_down_fare
                .checked_add(additional_fare)
                .ok_or_else(overflow)?,
        );

        // The discount comes off the rounded base so that
        // final = base - discount holds to the centavo.
        let discount_rate = self.discount_rate(category);
        let discount_amount = round_money(base_fare.checked_mul(discount_rate).ok_or_else(overflow)?);
        let final_fare = base_fare - discount_amount;

        Ok(FareBreakdown {
            base_fare,
            discount_amount,
            final_fare,
            discount_rate,
            flag_down_fare: self.flag_down_fare,
            flag_down_distance_km: self.flag_down_distance_km,
            additional_distance_km: additional_distance,
            additional_fare: round_money(additional_fare),
            distance_km: distance,
        })
    }
}

impl Default for FareSchedule {
    fn default() -> Self {
        let discounts = [
            PassengerCategory::Senior,
            PassengerCategory::Pwd,
            PassengerCategory::Student,
        ]
        .into_iter()
        .map(|category| (category, CONCESSION_DISCOUNT_RATE))
        .collect();

        Self::new(FLAG_DOWN_FARE, FLAG_DOWN_DISTANCE_KM, PER_KM_RATE, discounts)
    }
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
