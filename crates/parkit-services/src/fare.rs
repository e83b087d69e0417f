//! Fare engine
//!
//! Prices a stay from its entry and exit times, the spot category and the
//! vehicle's loyalty status. The computation is pure: no store access, no
//! clock, no side effects.
//!
//! Pricing rules:
//! 1. The stay is measured in hours and rounded to 2 decimals (half-up)
//! 2. Stays within the grace period are billed as zero hours
//! 3. Billable hours are multiplied by the category's hourly rate
//! 4. Recurring vehicles get the loyalty discount
//! 5. The result is rounded half-up to whole cents

use chrono::{DateTime, Utc};
use parkit_core::{
    config::FareConfig,
    models::{ParkingType, Ticket},
    FareError,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use tracing::debug;

use crate::constants::{
    DEFAULT_DISCOUNT_FACTOR, DEFAULT_FREE_HOURS, DURATION_SCALE, MILLIS_PER_HOUR, PRICE_SCALE,
};

/// Rate table and pricing parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FareSchedule {
    rates: HashMap<ParkingType, Decimal>,
    free_hours: Decimal,
    discount_factor: Decimal,
}

impl FareSchedule {
    /// Empty rate table with the standard grace period and discount
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            free_hours: DEFAULT_FREE_HOURS,
            discount_factor: DEFAULT_DISCOUNT_FACTOR,
        }
    }

    /// Set the hourly rate (in cents) for a category
    ///
    /// Negative rates are clamped to zero so a fare is never negative.
    pub fn with_rate(mut self, parking_type: ParkingType, rate_per_hour: Decimal) -> Self {
        self.rates.insert(parking_type, rate_per_hour.max(Decimal::ZERO));
        self
    }

    /// Hourly rate for a category, if one is configured
    pub fn rate_for(&self, parking_type: ParkingType) -> Option<Decimal> {
        self.rates.get(&parking_type).copied()
    }

    pub fn free_hours(&self) -> Decimal {
        self.free_hours
    }

    pub fn discount_factor(&self) -> Decimal {
        self.discount_factor
    }
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self::from(&FareConfig::default())
    }
}

impl From<&FareConfig> for FareSchedule {
    fn from(config: &FareConfig) -> Self {
        let percent = Decimal::from(config.recurring_discount_percent.min(100));

        Self {
            rates: HashMap::new(),
            free_hours: Decimal::from(config.free_minutes.max(0)) / Decimal::from(60),
            discount_factor: (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED,
        }
        .with_rate(ParkingType::Car, Decimal::from(config.car_rate_per_hour))
        .with_rate(ParkingType::Bike, Decimal::from(config.bike_rate_per_hour))
    }
}

/// Fare engine
#[derive(Debug, Clone, Default)]
pub struct FareCalculator {
    schedule: FareSchedule,
}

impl FareCalculator {
    pub fn new(schedule: FareSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &FareSchedule {
        &self.schedule
    }

    /// Length of a stay in hours, rounded half-up to 2 decimals
    fn duration_hours(in_time: DateTime<Utc>, out_time: DateTime<Utc>) -> Decimal {
        let millis = (out_time - in_time).num_milliseconds();

        (Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR))
            .round_dp_with_strategy(DURATION_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Compute the price of a stay
    ///
    /// # Errors
    ///
    /// - `InvalidDuration` when `out_time` is missing or before `in_time`
    /// - `UnknownVehicleType` when the category has no configured rate
    pub fn calculate(
        &self,
        in_time: DateTime<Utc>,
        out_time: Option<DateTime<Utc>>,
        parking_type: ParkingType,
        discount: bool,
    ) -> Result<Decimal, FareError> {
        let out_time = out_time.ok_or_else(|| {
            FareError::InvalidDuration(format!("out time is missing (in time {})", in_time))
        })?;

        if out_time < in_time {
            return Err(FareError::InvalidDuration(format!(
                "out time {} is before in time {}",
                out_time, in_time
            )));
        }

        let rate = self
            .schedule
            .rate_for(parking_type)
            .ok_or_else(|| FareError::UnknownVehicleType(parking_type.to_string()))?;

        let hours = Self::duration_hours(in_time, out_time);
        let billable_hours = if hours <= self.schedule.free_hours {
            Decimal::ZERO
        } else {
            hours
        };

        let mut price = billable_hours * rate;
        if discount {
            price *= self.schedule.discount_factor;
        }

        let price = price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

        debug!(
            "Fare for {} over {}h (billable {}h, discount={}): {}",
            parking_type, hours, billable_hours, discount, price
        );

        Ok(price)
    }

    /// Compute the price of a closed ticket and store it on the ticket
    ///
    /// On error the ticket is left untouched.
    pub fn calculate_for_ticket(&self, ticket: &mut Ticket, discount: bool) -> Result<(), FareError> {
        ticket.price = self.calculate(
            ticket.in_time,
            ticket.out_time,
            ticket.parking_spot.parking_type,
            discount,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use parkit_core::models::ParkingSpot;
    use rust_decimal_macros::dec;

    fn calculator() -> FareCalculator {
        FareCalculator::default()
    }

    fn rate(parking_type: ParkingType) -> Decimal {
        FareSchedule::default().rate_for(parking_type).unwrap()
    }

    fn whole_cents(amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    fn fare(stay: Duration, parking_type: ParkingType, discount: bool) -> Decimal {
        let in_time = Utc::now();
        calculator()
            .calculate(in_time, Some(in_time + stay), parking_type, discount)
            .unwrap()
    }

    #[test]
    fn test_schedule_from_default_config() {
        let schedule = FareSchedule::default();
        assert_eq!(schedule.rate_for(ParkingType::Car), Some(dec!(150)));
        assert_eq!(schedule.rate_for(ParkingType::Bike), Some(dec!(100)));
        assert_eq!(schedule.free_hours(), dec!(0.5));
        assert_eq!(schedule.discount_factor(), dec!(0.95));
    }

    #[test]
    fn test_one_hour_costs_hourly_rate() {
        assert_eq!(fare(Duration::hours(1), ParkingType::Car, false), rate(ParkingType::Car));
        assert_eq!(fare(Duration::hours(1), ParkingType::Bike, false), rate(ParkingType::Bike));
    }

    #[test]
    fn test_forty_five_minutes_costs_three_quarters() {
        for parking_type in ParkingType::ALL {
            assert_eq!(
                fare(Duration::minutes(45), parking_type, false),
                whole_cents(dec!(0.75) * rate(parking_type))
            );
        }
        assert_eq!(fare(Duration::minutes(45), ParkingType::Bike, false), dec!(75));
        // 112.5 rounds half-up
        assert_eq!(fare(Duration::minutes(45), ParkingType::Car, false), dec!(113));
    }

    #[test]
    fn test_one_day_costs_twenty_four_hours() {
        for parking_type in ParkingType::ALL {
            assert_eq!(
                fare(Duration::hours(24), parking_type, false),
                dec!(24) * rate(parking_type)
            );
        }
    }

    #[test]
    fn test_grace_period_is_free() {
        for parking_type in ParkingType::ALL {
            for discount in [false, true] {
                assert_eq!(fare(Duration::zero(), parking_type, discount), Decimal::ZERO);
                assert_eq!(fare(Duration::minutes(15), parking_type, discount), Decimal::ZERO);
                assert_eq!(fare(Duration::minutes(30), parking_type, discount), Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_grace_boundary_uses_rounded_duration() {
        // 30 min 17 s is 0.5047h, which rounds to 0.50h and stays free
        let stay = Duration::minutes(30) + Duration::seconds(17);
        assert_eq!(fare(stay, ParkingType::Car, false), Decimal::ZERO);

        // 30 min 18 s is 0.505h, which rounds half-up to 0.51h
        let stay = Duration::minutes(30) + Duration::seconds(18);
        assert_eq!(fare(stay, ParkingType::Car, false), whole_cents(dec!(0.51) * dec!(150)));
    }

    #[test]
    fn test_discount_applies_five_percent() {
        for parking_type in ParkingType::ALL {
            assert_eq!(
                fare(Duration::hours(1), parking_type, true),
                whole_cents(rate(parking_type) * dec!(0.95))
            );
        }
        assert_eq!(fare(Duration::hours(1), ParkingType::Car, true), dec!(143));
        assert_eq!(fare(Duration::hours(1), ParkingType::Bike, true), dec!(95));
    }

    #[test]
    fn test_fare_is_never_negative() {
        for minutes in [0, 1, 29, 31, 59, 61, 90, 600, 1440, 10_000] {
            for parking_type in ParkingType::ALL {
                for discount in [false, true] {
                    assert!(fare(Duration::minutes(minutes), parking_type, discount) >= Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_exit_before_entry_is_invalid() {
        let in_time = Utc::now();
        let result = calculator().calculate(
            in_time,
            Some(in_time - Duration::minutes(1)),
            ParkingType::Bike,
            false,
        );

        assert!(matches!(result, Err(FareError::InvalidDuration(_))));
    }

    #[test]
    fn test_missing_exit_is_invalid() {
        let result = calculator().calculate(Utc::now(), None, ParkingType::Car, false);

        assert!(matches!(result, Err(FareError::InvalidDuration(_))));
    }

    #[test]
    fn test_unconfigured_type_is_unknown() {
        let schedule = FareSchedule::new().with_rate(ParkingType::Car, dec!(150));
        let in_time = Utc::now();

        let result = FareCalculator::new(schedule).calculate(
            in_time,
            Some(in_time + Duration::hours(1)),
            ParkingType::Bike,
            false,
        );

        assert_eq!(
            result,
            Err(FareError::UnknownVehicleType("BIKE".to_string()))
        );
    }

    #[test]
    fn test_custom_config() {
        let config = FareConfig {
            car_rate_per_hour: 200,
            bike_rate_per_hour: 80,
            free_minutes: 15,
            recurring_discount_percent: 10,
        };
        let calculator = FareCalculator::new(FareSchedule::from(&config));
        let in_time = Utc::now();

        let price = calculator
            .calculate(in_time, Some(in_time + Duration::minutes(20)), ParkingType::Car, true)
            .unwrap();
        // 0.33h * 200 * 0.9 = 59.4
        assert_eq!(price, dec!(59));
    }

    #[test]
    fn test_negative_rate_never_yields_negative_fare() {
        let schedule = FareSchedule::new().with_rate(ParkingType::Car, dec!(-150));
        assert_eq!(schedule.rate_for(ParkingType::Car), Some(Decimal::ZERO));

        let in_time = Utc::now();
        let price = FareCalculator::new(schedule)
            .calculate(in_time, Some(in_time + Duration::hours(2)), ParkingType::Car, false)
            .unwrap();

        assert_eq!(price, Decimal::ZERO);
    }

    #[test]
    fn test_calculate_for_ticket() {
        let in_time = Utc::now() - Duration::hours(2);
        let mut ticket = Ticket::new(ParkingSpot::new(1, ParkingType::Car, true), "ABCDEF", in_time);

        assert!(calculator().calculate_for_ticket(&mut ticket, false).is_err());
        assert_eq!(ticket.price, Decimal::ZERO);

        ticket.out_time = Some(in_time + Duration::hours(2));
        calculator().calculate_for_ticket(&mut ticket, false).unwrap();
        assert_eq!(ticket.price, dec!(300));
    }
}
