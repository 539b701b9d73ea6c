// issuance/src/venue.rs

use crate::{IssuanceError, IssuanceResult};
use launchpad_core::{Amount, AssetId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Liquidity receipt returned by the venue after seeding a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReceipt {
    /// Venue-assigned pool identifier
    pub pool_id: u64,
    pub token_a: AssetId,
    pub token_b: AssetId,
    pub amount_a: Amount,
    pub amount_b: Amount,
}

/// External pooled-liquidity venue
///
/// Accepts two balances and returns a liquidity receipt. Called exactly
/// once per persona, at graduation, never again.
pub trait LiquidityVenue {
    fn create_pool_and_seed(
        &mut self,
        token_a: AssetId,
        amount_a: Amount,
        token_b: AssetId,
        amount_b: Amount,
    ) -> IssuanceResult<PoolReceipt>;
}

/// In-memory liquidity venue keyed by canonical token pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLiquidityVenue {
    pools: HashMap<(AssetId, AssetId), PoolReceipt>,
    next_pool: u64,
}

impl InMemoryLiquidityVenue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical (sorted) representation of a pair
    fn canonical(token_a: AssetId, token_b: AssetId) -> (AssetId, AssetId) {
        if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        }
    }

    pub fn pool(&self, token_a: AssetId, token_b: AssetId) -> Option<&PoolReceipt> {
        self.pools.get(&Self::canonical(token_a, token_b))
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl LiquidityVenue for InMemoryLiquidityVenue {
    fn create_pool_and_seed(
        &mut self,
        token_a: AssetId,
        amount_a: Amount,
        token_b: AssetId,
        amount_b: Amount,
    ) -> IssuanceResult<PoolReceipt> {
        let pair = Self::canonical(token_a, token_b);
        if self.pools.contains_key(&pair) {
            return Err(IssuanceError::PoolAlreadyExists);
        }
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(IssuanceError::InsufficientLiquidity {
                requested: Amount::from_u64(1),
                remaining: Amount::zero(),
            });
        }

        self.next_pool += 1;
        let receipt = PoolReceipt {
            pool_id: self.next_pool,
            token_a,
            token_b,
            amount_a,
            amount_b,
        };
        self.pools.insert(pair, receipt.clone());

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_pool() {
        let mut venue = InMemoryLiquidityVenue::new();
        let receipt = venue
            .create_pool_and_seed(
                AssetId(1),
                Amount::from_u64(1_000),
                AssetId(2),
                Amount::from_u64(500),
            )
            .unwrap();

        assert_eq!(receipt.pool_id, 1);
        assert_eq!(venue.pool_count(), 1);
        assert!(venue.pool(AssetId(2), AssetId(1)).is_some());
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut venue = InMemoryLiquidityVenue::new();
        venue
            .create_pool_and_seed(
                AssetId(1),
                Amount::from_u64(1_000),
                AssetId(2),
                Amount::from_u64(500),
            )
            .unwrap();

        // Same pair in either order
        let result = venue.create_pool_and_seed(
            AssetId(2),
            Amount::from_u64(10),
            AssetId(1),
            Amount::from_u64(10),
        );
        assert!(matches!(result, Err(IssuanceError::PoolAlreadyExists)));
        assert_eq!(venue.pool_count(), 1);
    }

    #[test]
    fn test_zero_seed_rejected() {
        let mut venue = InMemoryLiquidityVenue::new();
        let result = venue.create_pool_and_seed(
            AssetId(1),
            Amount::zero(),
            AssetId(2),
            Amount::from_u64(500),
        );
        assert!(matches!(
            result,
            Err(IssuanceError::InsufficientLiquidity { .. })
        ));
    }
}
