// issuance/src/treasury.rs

use crate::{IssuanceError, IssuanceResult};
use launchpad_core::{Amount, AssetId, CoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Treasury collaborator
///
/// Receives each persona's treasury-pool token share at graduation and
/// tracks deposited balances per asset.
pub trait TreasuryVault {
    /// Accept a deposit of `amount` of `asset`
    fn deposit(&mut self, asset: AssetId, amount: Amount) -> IssuanceResult<()>;

    /// Total deposited balance held for an asset
    fn deposited_balance(&self, asset: AssetId) -> Amount;
}

/// In-memory treasury with burn-and-claim settlement
///
/// Loyalty-token holders can burn against the vault and claim a
/// proportional share of any subset of deposited assets. The claim list
/// must be strictly ascending by asset id, so each asset settles at most
/// once per claim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryTreasury {
    deposits: HashMap<AssetId, Amount>,
}

impl InMemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Burn `burn_amount` of a loyalty supply of `circulating_supply` and
    /// claim the proportional share of each selected asset.
    ///
    /// Returns the per-asset amounts to transfer; the vault's own
    /// bookkeeping is reduced by the same amounts.
    pub fn claim(
        &mut self,
        burn_amount: &Amount,
        circulating_supply: &Amount,
        assets: &[AssetId],
    ) -> IssuanceResult<Vec<(AssetId, Amount)>> {
        if assets.is_empty() {
            return Err(IssuanceError::InvalidSelection);
        }
        if !assets.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(IssuanceError::InvalidSelection);
        }
        if burn_amount.is_zero() || circulating_supply.is_zero() {
            return Err(IssuanceError::InvalidSelection);
        }
        if burn_amount.inner() > circulating_supply.inner() {
            return Err(IssuanceError::Core(CoreError::InsufficientBalance));
        }

        let mut claimed = Vec::with_capacity(assets.len());
        for &asset in assets {
            let held = self.deposited_balance(asset);
            let share = held
                .checked_mul(burn_amount)
                .and_then(|product| product.checked_div(circulating_supply))
                .ok_or_else(|| {
                    CoreError::CalculationError("Claim share calculation failed".into())
                })?;

            if !share.is_zero() {
                let remaining = held
                    .checked_sub(&share)
                    .ok_or(CoreError::InsufficientBalance)?;
                self.deposits.insert(asset, remaining);
            }
            claimed.push((asset, share));
        }

        Ok(claimed)
    }
}

impl TreasuryVault for InMemoryTreasury {
    fn deposit(&mut self, asset: AssetId, amount: Amount) -> IssuanceResult<()> {
        let balance = self.deposits.entry(asset).or_insert_with(Amount::zero);
        *balance = balance
            .checked_add(&amount)
            .ok_or_else(|| CoreError::CalculationError("Treasury balance overflow".into()))?;
        Ok(())
    }

    fn deposited_balance(&self, asset: AssetId) -> Amount {
        self.deposits.get(&asset).cloned().unwrap_or_else(Amount::zero)
    }
}
