//! Annualized return calculators for an open position.

use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Calendar days per year used when annualizing returns.
pub const DAYS_PER_YEAR: f64 = 365.24;

/// Direction of an open position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    #[display("long")]
    Long,
    #[display("short")]
    Short,
}

/// Whole days between `purchase` and `now`, truncated.
pub fn days_held(purchase: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - purchase).num_days()
}

/// Annualized return of a position opened at `cost_basis` and marked at `current_price`.
///
/// `((gain + basis) / basis) ^ (365.24 / days) - 1`, where a short position gains
/// when the price falls.
pub fn current_annualized_return(
    current_price: f64,
    cost_basis: f64,
    purchase: DateTime<Utc>,
    now: DateTime<Utc>,
    side: PositionSide,
) -> Result<f64, AnalyticsError> {
    let days = days_held(purchase, now);
    if days <= 0 {
        return Err(AnalyticsError::ReturnUndefined(format!(
            "position held for {days} whole days"
        )));
    }
    if cost_basis.is_nan() || cost_basis <= 0.0 {
        return Err(AnalyticsError::ReturnUndefined(format!(
            "non-positive cost basis {cost_basis}"
        )));
    }

    let gain = match side {
        PositionSide::Long => current_price - cost_basis,
        PositionSide::Short => cost_basis - current_price,
    };

    let annualized = ((gain + cost_basis) / cost_basis).powf(DAYS_PER_YEAR / days as f64) - 1.0;
    if annualized.is_nan() {
        return Err(AnalyticsError::ReturnUndefined(format!(
            "{side} position marked at {current_price} against basis {cost_basis}"
        )));
    }

    Ok(annualized)
}

/// Price at which the position would have compounded at `annual_rate` since `purchase`.
///
/// A short position mirrors the long target around the cost basis.
pub fn target_annualized_price(
    cost_basis: f64,
    annual_rate: f64,
    purchase: DateTime<Utc>,
    now: DateTime<Utc>,
    side: PositionSide,
) -> Result<f64, AnalyticsError> {
    let days = days_held(purchase, now) as f64;
    let base = (1.0 + annual_rate).powf(days / DAYS_PER_YEAR) * cost_basis;

    let target = match side {
        PositionSide::Long => base,
        PositionSide::Short => 2.0 * cost_basis - base,
    };

    if target.is_nan() {
        Err(AnalyticsError::ReturnUndefined(format!(
            "target price at rate {annual_rate} against basis {cost_basis}"
        )))
    } else {
        Ok(target)
    }
}

/// Simple-interest break-even price: `(days * rate / 365 + 1) * basis`.
pub fn simple_target_price(
    cost_basis: f64,
    annual_rate: f64,
    purchase: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let days = days_held(purchase, now) as f64;
    (days * annual_rate / 365.0 + 1.0) * cost_basis
}
