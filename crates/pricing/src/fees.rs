// pricing/src/fees.rs

use crate::{PricingError, PricingResult};
use launchpad_core::{Amount, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// Maximum trading fee (10%)
pub const MAX_FEE_BPS: u16 = 1_000;

/// Trading-fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingFeeConfig {
    /// Fee on each purchase, in basis points of the input amount
    pub fee_bps: u16,
    /// Share of the fee routed to the persona creator, in basis points
    pub creator_share_bps: u16,
}

impl TradingFeeConfig {
    pub fn new(fee_bps: u16, creator_share_bps: u16) -> PricingResult<Self> {
        let config = Self { fee_bps, creator_share_bps };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.fee_bps > MAX_FEE_BPS {
            return Err(PricingError::FeeTooHigh {
                requested: self.fee_bps,
                limit: MAX_FEE_BPS,
            });
        }
        if self.creator_share_bps as u64 > BPS_DENOMINATOR {
            return Err(PricingError::InvalidFeeRange(format!(
                "Creator share {} exceeds {} bps",
                self.creator_share_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }
}

impl Default for TradingFeeConfig {
    fn default() -> Self {
        Self {
            fee_bps: 100,            // 1%
            creator_share_bps: 5_000, // 50/50 creator/protocol split
        }
    }
}

/// Holding-gated fee-reduction configuration
///
/// The discount (in bps of the fee) interpolates linearly from
/// `min_discount_bps` at `min_holding` of the loyalty asset to
/// `max_discount_bps` at `max_holding`, clamping to the nearer bound
/// outside the range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeReductionConfig {
    /// Loyalty holding at which the discount starts
    pub min_holding: Amount,
    /// Loyalty holding at which the discount is fully earned
    pub max_holding: Amount,
    /// Discount at `min_holding`, in basis points of the fee
    pub min_discount_bps: u16,
    /// Discount at `max_holding`, in basis points of the fee
    pub max_discount_bps: u16,
}

impl FeeReductionConfig {
    pub fn new(
        min_holding: Amount,
        max_holding: Amount,
        min_discount_bps: u16,
        max_discount_bps: u16,
    ) -> PricingResult<Self> {
        let config = Self {
            min_holding,
            max_holding,
            min_discount_bps,
            max_discount_bps,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.min_holding.inner() >= self.max_holding.inner() {
            return Err(PricingError::InvalidFeeRange(
                "Min holding must be below max holding".into(),
            ));
        }
        if self.max_discount_bps as u64 > BPS_DENOMINATOR {
            return Err(PricingError::InvalidMultiplier(format!(
                "Discount {} exceeds {} bps",
                self.max_discount_bps, BPS_DENOMINATOR
            )));
        }
        if self.min_discount_bps > self.max_discount_bps {
            return Err(PricingError::InvalidMultiplier(
                "Discount must not shrink as holdings grow".into(),
            ));
        }
        Ok(())
    }

    /// Discount earned by a loyalty holding, in bps of the fee
    pub fn discount_bps(&self, loyalty_balance: &Amount) -> u64 {
        if loyalty_balance.inner() <= self.min_holding.inner() {
            return self.min_discount_bps as u64;
        }
        if loyalty_balance.inner() >= self.max_holding.inner() {
            return self.max_discount_bps as u64;
        }

        // Linear interpolation inside the range; the result stays below
        // max_discount_bps, so the u64 conversion cannot truncate.
        let span = self
            .max_holding
            .checked_sub(&self.min_holding)
            .unwrap_or_else(|| Amount::from_u64(1));
        let position = loyalty_balance
            .checked_sub(&self.min_holding)
            .unwrap_or_else(Amount::zero);
        let range = (self.max_discount_bps - self.min_discount_bps) as u64;

        let earned = position
            .checked_mul(&Amount::from_u64(range))
            .and_then(|n| n.checked_div(&span))
            .unwrap_or_else(Amount::zero);
        let earned = earned.inner().to_u64_digits().first().copied().unwrap_or(0);

        self.min_discount_bps as u64 + earned
    }
}

impl Default for FeeReductionConfig {
    fn default() -> Self {
        Self {
            min_holding: Amount::from_units(1_000, 18),
            max_holding: Amount::from_units(1_000_000, 18),
            min_discount_bps: 0,
            max_discount_bps: 10_000, // fee fully waived at max holding
        }
    }
}

/// Result of a fee computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Total fee deducted from the input
    pub fee_total: Amount,
    /// Share routed to the persona creator
    pub creator_fee: Amount,
    /// Remainder routed to the protocol treasury
    pub protocol_fee: Amount,
    /// Input remaining after the fee
    pub net_in: Amount,
}

/// Computes trading-fee deduction and the creator/protocol split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeEngine {
    trading: TradingFeeConfig,
    reduction: FeeReductionConfig,
}

impl FeeEngine {
    pub fn new(trading: TradingFeeConfig, reduction: FeeReductionConfig) -> PricingResult<Self> {
        trading.validate()?;
        reduction.validate()?;
        Ok(Self { trading, reduction })
    }

    pub fn trading(&self) -> &TradingFeeConfig {
        &self.trading
    }

    pub fn reduction(&self) -> &FeeReductionConfig {
        &self.reduction
    }

    pub fn set_trading(&mut self, trading: TradingFeeConfig) -> PricingResult<()> {
        trading.validate()?;
        self.trading = trading;
        Ok(())
    }

    pub fn set_reduction(&mut self, reduction: FeeReductionConfig) -> PricingResult<()> {
        reduction.validate()?;
        self.reduction = reduction;
        Ok(())
    }

    /// Compute the fee split for a purchase
    ///
    /// The protocol fee is the exact remainder after the creator share, so
    /// `creator_fee + protocol_fee == fee_total` for every input.
    pub fn compute(
        &self,
        amount_in: &Amount,
        loyalty_balance: &Amount,
    ) -> PricingResult<FeeBreakdown> {
        if amount_in.is_zero() {
            return Err(PricingError::InsufficientInput);
        }

        let base = amount_in
            .mul_div(self.trading.fee_bps as u64, BPS_DENOMINATOR)
            .map_err(|e| PricingError::CalculationError(e.to_string()))?;

        let discount = self.reduction.discount_bps(loyalty_balance);
        let fee_total = base
            .mul_div(BPS_DENOMINATOR - discount, BPS_DENOMINATOR)
            .map_err(|e| PricingError::CalculationError(e.to_string()))?;

        let creator_fee = fee_total
            .mul_div(self.trading.creator_share_bps as u64, BPS_DENOMINATOR)
            .map_err(|e| PricingError::CalculationError(e.to_string()))?;
        let protocol_fee = fee_total
            .checked_sub(&creator_fee)
            .ok_or_else(|| PricingError::CalculationError("Fee split underflow".into()))?;

        let net_in = amount_in
            .checked_sub(&fee_total)
            .ok_or_else(|| PricingError::CalculationError("Fee exceeds input".into()))?;
        if net_in.is_zero() {
            return Err(PricingError::InsufficientInput);
        }

        Ok(FeeBreakdown {
            fee_total,
            creator_fee,
            protocol_fee,
            net_in,
        })
    }
}

impl Default for FeeEngine {
    fn default() -> Self {
        Self {
            trading: TradingFeeConfig::default(),
            reduction: FeeReductionConfig::default(),
        }
    }
}
