// issuance/src/staking.rs

use crate::{IssuanceError, IssuanceResult};
use launchpad_core::{AssetId, PersonaId, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Staking-rewards collaborator
///
/// Optional registration target: the engine notifies it when a persona
/// graduates. The accrual engine behind it is a separate subsystem; only
/// its allocation bookkeeping is validated here.
pub trait StakingRewards {
    /// A persona's token has moved to pooled-liquidity trading
    fn on_graduation(&mut self, persona: PersonaId, issued_token: AssetId);
}

/// In-memory allocation bookkeeping and graduation log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryStakingRewards {
    /// Reward allocation per pool, in basis points
    allocations: HashMap<AssetId, u64>,
    /// Graduations observed, in arrival order
    graduations: Vec<(PersonaId, AssetId)>,
}

impl InMemoryStakingRewards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one pool's reward allocation. The sum across all pools may
    /// never exceed 100%.
    pub fn set_pool_allocation(&mut self, pool: AssetId, bps: u64) -> IssuanceResult<()> {
        let others: u64 = self
            .allocations
            .iter()
            .filter(|(asset, _)| **asset != pool)
            .map(|(_, allocated)| allocated)
            .sum();
        if others + bps > BPS_DENOMINATOR {
            return Err(IssuanceError::TotalAllocationExceeds100);
        }

        self.allocations.insert(pool, bps);
        Ok(())
    }

    pub fn allocation(&self, pool: AssetId) -> u64 {
        self.allocations.get(&pool).copied().unwrap_or(0)
    }

    pub fn graduations(&self) -> &[(PersonaId, AssetId)] {
        &self.graduations
    }
}

impl StakingRewards for InMemoryStakingRewards {
    fn on_graduation(&mut self, persona: PersonaId, issued_token: AssetId) {
        self.graduations.push((persona, issued_token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_bounded() {
        let mut staking = InMemoryStakingRewards::new();

        staking.set_pool_allocation(AssetId(1), 6_000).unwrap();
        staking.set_pool_allocation(AssetId(2), 4_000).unwrap();

        let result = staking.set_pool_allocation(AssetId(3), 1);
        assert!(matches!(
            result,
            Err(IssuanceError::TotalAllocationExceeds100)
        ));
    }

    #[test]
    fn test_reallocation_replaces() {
        let mut staking = InMemoryStakingRewards::new();

        staking.set_pool_allocation(AssetId(1), 9_000).unwrap();
        // Lowering an existing allocation frees headroom
        staking.set_pool_allocation(AssetId(1), 2_000).unwrap();
        staking.set_pool_allocation(AssetId(2), 8_000).unwrap();

        assert_eq!(staking.allocation(AssetId(1)), 2_000);
        assert_eq!(staking.allocation(AssetId(2)), 8_000);
    }

    #[test]
    fn test_graduation_log() {
        let mut staking = InMemoryStakingRewards::new();
        staking.on_graduation(1, AssetId(5));
        staking.on_graduation(2, AssetId(7));

        assert_eq!(staking.graduations(), &[(1, AssetId(5)), (2, AssetId(7))]);
    }
}
