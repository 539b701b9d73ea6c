// pricing/src/curve.rs

use crate::{PricingError, PricingResult};
use launchpad_core::Amount;
use serde::{Deserialize, Serialize};

/// Scale factor for spot-price quotes (price per whole token, 18 decimals)
pub const PRICE_PRECISION: u64 = 1_000_000_000_000_000_000;

/// Divisor deriving the virtual token reserve from the curve allocation
const TOKEN_RESERVE_DIVISOR: u64 = 10;

/// Virtual-reserve parameters for one pairing asset
///
/// `virtual_base_reserve` is denominated in the pairing asset's smallest
/// unit, so a 6-decimal asset and an 18-decimal asset each get a curve in
/// their own magnitude. Depleting the whole token allocation raises
/// exactly `TOKEN_RESERVE_DIVISOR * virtual_base_reserve` of the pairing
/// asset, which bounds sensible graduation thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveParams {
    /// Virtual pairing-asset reserve (Rv)
    pub virtual_base_reserve: Amount,
}

impl CurveParams {
    pub fn new(virtual_base_reserve: Amount) -> Self {
        Self { virtual_base_reserve }
    }
}

impl Default for CurveParams {
    fn default() -> Self {
        // 10,000 whole units at 18 decimals
        Self {
            virtual_base_reserve: Amount::from_units(10_000, 18),
        }
    }
}

/// Constant-product bonding curve over virtual reserves
///
/// Effective reserves at any point on the curve:
///
/// ```text
/// T = Tv + (total_available - sold)      Tv = total_available / 10
/// P = Rv                                 (fixed per pairing asset)
/// ```
///
/// A buy of `x` pairing units moves `P' = P + x` and holds `T * P = T' * P'`,
/// so the output is `T - T'`. Marginal output strictly shrinks as `sold`
/// grows, which is what makes the price path-dependent and monotonic.
pub struct FixedPointCurve;

impl FixedPointCurve {
    /// Quote token output for a post-fee pairing-asset input
    ///
    /// The new token reserve is rounded up, so the buyer never receives
    /// more than the exact real-valued quote.
    pub fn quote_buy(
        amount_in: &Amount,
        sold: &Amount,
        total_available: &Amount,
        params: &CurveParams,
    ) -> PricingResult<Amount> {
        if amount_in.is_zero() {
            return Err(PricingError::InsufficientInput);
        }
        let (token_reserve, base_reserve) = Self::reserves(sold, total_available, params)?;

        let new_base_reserve = base_reserve
            .checked_add(amount_in)
            .ok_or_else(|| PricingError::CalculationError("Base reserve overflow".into()))?;

        let k = token_reserve
            .checked_mul(&base_reserve)
            .ok_or_else(|| PricingError::CalculationError("Invariant overflow".into()))?;
        let new_token_reserve = k
            .checked_div_ceil(&new_base_reserve)
            .ok_or_else(|| PricingError::CalculationError("Division by zero".into()))?;

        token_reserve
            .checked_sub(&new_token_reserve)
            .ok_or_else(|| PricingError::CalculationError("Token reserve underflow".into()))
    }

    /// Quote pairing-asset output for selling tokens back into the curve
    ///
    /// Inverse of `quote_buy`; the new base reserve is rounded up so the
    /// seller never receives more than the exact real-valued quote.
    pub fn quote_sell(
        tokens_in: &Amount,
        sold: &Amount,
        total_available: &Amount,
        params: &CurveParams,
    ) -> PricingResult<Amount> {
        if tokens_in.is_zero() {
            return Err(PricingError::InsufficientInput);
        }
        if tokens_in.inner() > sold.inner() {
            return Err(PricingError::InvalidReserves(
                "Cannot sell more than has been sold".into(),
            ));
        }
        let (token_reserve, base_reserve) = Self::reserves(sold, total_available, params)?;

        let new_token_reserve = token_reserve
            .checked_add(tokens_in)
            .ok_or_else(|| PricingError::CalculationError("Token reserve overflow".into()))?;

        let k = token_reserve
            .checked_mul(&base_reserve)
            .ok_or_else(|| PricingError::CalculationError("Invariant overflow".into()))?;
        let new_base_reserve = k
            .checked_div_ceil(&new_token_reserve)
            .ok_or_else(|| PricingError::CalculationError("Division by zero".into()))?;

        base_reserve
            .checked_sub(&new_base_reserve)
            .ok_or_else(|| PricingError::CalculationError("Base reserve underflow".into()))
    }

    /// Current price per whole token, scaled by `PRICE_PRECISION`
    pub fn spot_price(
        sold: &Amount,
        total_available: &Amount,
        params: &CurveParams,
    ) -> PricingResult<Amount> {
        let (token_reserve, base_reserve) = Self::reserves(sold, total_available, params)?;

        base_reserve
            .checked_mul(&Amount::from_u64(PRICE_PRECISION))
            .and_then(|scaled| scaled.checked_div(&token_reserve))
            .ok_or_else(|| PricingError::CalculationError("Price calculation failed".into()))
    }

    /// Exact pairing-asset input needed to move `sold` from one point to
    /// another, rounded up. Returns zero when `from_sold >= to_sold`.
    pub fn cost_between(
        from_sold: &Amount,
        to_sold: &Amount,
        total_available: &Amount,
        params: &CurveParams,
    ) -> PricingResult<Amount> {
        if from_sold.inner() >= to_sold.inner() {
            return Ok(Amount::zero());
        }
        if to_sold.inner() > total_available.inner() {
            return Err(PricingError::InvalidReserves(
                "Target exceeds curve allocation".into(),
            ));
        }
        let (token_reserve, base_reserve) = Self::reserves(from_sold, total_available, params)?;

        let delta = to_sold
            .checked_sub(from_sold)
            .ok_or_else(|| PricingError::CalculationError("Delta underflow".into()))?;
        let remaining = token_reserve
            .checked_sub(&delta)
            .ok_or_else(|| PricingError::CalculationError("Reserve underflow".into()))?;

        base_reserve
            .checked_mul(&delta)
            .and_then(|numerator| numerator.checked_div_ceil(&remaining))
            .ok_or_else(|| PricingError::CalculationError("Cost calculation failed".into()))
    }

    /// Effective reserves at a point on the curve
    fn reserves(
        sold: &Amount,
        total_available: &Amount,
        params: &CurveParams,
    ) -> PricingResult<(Amount, Amount)> {
        if total_available.is_zero() {
            return Err(PricingError::InvalidReserves("Curve allocation is zero".into()));
        }
        if sold.inner() > total_available.inner() {
            return Err(PricingError::InvalidReserves(
                "Sold amount exceeds curve allocation".into(),
            ));
        }
        if params.virtual_base_reserve.is_zero() {
            return Err(PricingError::InvalidReserves("Virtual base reserve is zero".into()));
        }

        let virtual_token = total_available
            .checked_div(&Amount::from_u64(TOKEN_RESERVE_DIVISOR))
            .ok_or_else(|| PricingError::CalculationError("Division by zero".into()))?;
        let unsold = total_available
            .checked_sub(sold)
            .ok_or_else(|| PricingError::CalculationError("Unsold underflow".into()))?;
        let token_reserve = virtual_token
            .checked_add(&unsold)
            .ok_or_else(|| PricingError::CalculationError("Token reserve overflow".into()))?;

        Ok((token_reserve, params.virtual_base_reserve.clone()))
    }
}
