// pricing/src/lib.rs

//! Bonding-curve pricing and trading-fee math
//!
//! This crate implements:
//! - The constant-product curve over virtual reserves
//! - Spot price and exact cost-between-points queries
//! - Trading-fee deduction with holding-based fee reduction
//!
//! Everything here is pure integer math; all rounding truncates in the
//! protocol's favor.

pub mod curve;
pub mod fees;

pub use curve::{CurveParams, FixedPointCurve, PRICE_PRECISION};
pub use fees::{FeeBreakdown, FeeEngine, FeeReductionConfig, TradingFeeConfig, MAX_FEE_BPS};

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur in pricing operations
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Input amount is zero after fees")]
    InsufficientInput,

    #[error("Invalid reserves: {0}")]
    InvalidReserves(String),

    #[error("Fee basis points cannot exceed {limit}: {requested}")]
    FeeTooHigh { requested: u16, limit: u16 },

    #[error("Invalid fee range: {0}")]
    InvalidFeeRange(String),

    #[error("Invalid discount multiplier: {0}")]
    InvalidMultiplier(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_imports() {
        // Smoke test
    }
}
