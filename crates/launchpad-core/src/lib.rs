// launchpad-core/src/lib.rs

//! Core value types and the in-memory multi-asset ledger
//!
//! This crate provides:
//! - Amount, Address and asset/persona identifier types
//! - The token ledger holding per-asset balances
//! - Checkpoint/rollback support for atomic operations

pub mod ledger;
pub mod types;

pub use ledger::{AssetInfo, TokenLedger};
pub use types::{Address, Amount, AssetId, PersonaId, Timestamp, BPS_DENOMINATOR};

/// Result type for core ledger operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core ledger operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

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
