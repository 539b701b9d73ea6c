// launchpad-core/src/ledger.rs

use crate::types::{Address, Amount, AssetId};
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registered asset metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Asset identifier
    pub id: AssetId,
    /// Ticker symbol
    pub symbol: String,
    /// Smallest-unit precision
    pub decimals: u8,
    /// Total minted supply
    pub total_supply: Amount,
}

/// In-memory multi-asset balance ledger
///
/// Models the serialized-execution host ledger: one operation fully
/// completes before the next begins. Callers bracket a compound operation
/// with `checkpoint` and either `commit` or `rollback`, so a failing
/// external call leaves balances exactly as they were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Registered assets
    assets: HashMap<AssetId, AssetInfo>,
    /// Per-asset holder balances
    balances: HashMap<AssetId, HashMap<Address, Amount>>,
    /// Next asset id to assign
    next_asset: u64,
    /// Modification log (for efficient rollback)
    modifications: Vec<LedgerModification>,
}

impl TokenLedger {
    /// Create new empty ledger
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
            balances: HashMap::new(),
            next_asset: 0,
            modifications: Vec::new(),
        }
    }

    /// Register a new fungible asset and return its id
    pub fn register_asset(&mut self, symbol: &str, decimals: u8) -> CoreResult<AssetId> {
        if symbol.is_empty() {
            return Err(CoreError::InvalidAsset("Empty asset symbol".into()));
        }
        if decimals > 18 {
            return Err(CoreError::InvalidAsset(format!(
                "Unsupported precision: {} decimals",
                decimals
            )));
        }

        let id = AssetId(self.next_asset);
        self.next_asset += 1;
        self.assets.insert(
            id,
            AssetInfo {
                id,
                symbol: symbol.to_string(),
                decimals,
                total_supply: Amount::zero(),
            },
        );
        self.balances.insert(id, HashMap::new());

        Ok(id)
    }

    /// Get asset metadata
    pub fn asset(&self, asset: AssetId) -> CoreResult<&AssetInfo> {
        self.assets.get(&asset).ok_or(CoreError::AssetNotFound(asset))
    }

    /// Get total minted supply for an asset
    pub fn total_supply(&self, asset: AssetId) -> CoreResult<Amount> {
        Ok(self.asset(asset)?.total_supply.clone())
    }

    /// Get holder balance (zero for unknown holders)
    pub fn balance_of(&self, asset: AssetId, holder: &Address) -> Amount {
        self.balances
            .get(&asset)
            .and_then(|holders| holders.get(holder))
            .cloned()
            .unwrap_or_else(Amount::zero)
    }

    /// Mint new supply to a holder
    pub fn mint(&mut self, asset: AssetId, to: &Address, amount: &Amount) -> CoreResult<()> {
        if !self.assets.contains_key(&asset) {
            return Err(CoreError::AssetNotFound(asset));
        }

        self.record_balance_modification(asset, *to);
        self.record_supply_modification(asset);

        let balance = self
            .balances
            .get_mut(&asset)
            .ok_or(CoreError::AssetNotFound(asset))?
            .entry(*to)
            .or_insert_with(Amount::zero);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| CoreError::CalculationError("Balance overflow".into()))?;

        let info = self.assets.get_mut(&asset).ok_or(CoreError::AssetNotFound(asset))?;
        info.total_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| CoreError::CalculationError("Supply overflow".into()))?;

        Ok(())
    }

    /// Transfer between holders
    pub fn transfer(
        &mut self,
        asset: AssetId,
        from: &Address,
        to: &Address,
        amount: &Amount,
    ) -> CoreResult<()> {
        if !self.assets.contains_key(&asset) {
            return Err(CoreError::AssetNotFound(asset));
        }
        if amount.is_zero() {
            return Ok(());
        }

        let from_balance = self.balance_of(asset, from);
        if from_balance.inner() < amount.inner() {
            return Err(CoreError::InsufficientBalance);
        }

        self.record_balance_modification(asset, *from);
        self.record_balance_modification(asset, *to);

        let holders = self.balances.get_mut(&asset).ok_or(CoreError::AssetNotFound(asset))?;

        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(CoreError::InsufficientBalance)?;
        holders.insert(*from, new_from);

        let to_balance = holders.entry(*to).or_insert_with(Amount::zero);
        *to_balance = to_balance
            .checked_add(amount)
            .ok_or_else(|| CoreError::CalculationError("Balance overflow".into()))?;

        Ok(())
    }

    /// Begin atomic operation (checkpoint)
    pub fn checkpoint(&mut self) {
        self.modifications.push(LedgerModification::Checkpoint);
    }

    /// Commit atomic operation
    pub fn commit(&mut self) {
        while let Some(mod_type) = self.modifications.pop() {
            if matches!(mod_type, LedgerModification::Checkpoint) {
                break;
            }
        }
    }

    /// Rollback atomic operation
    pub fn rollback(&mut self) {
        while let Some(mod_type) = self.modifications.pop() {
            match mod_type {
                LedgerModification::Checkpoint => break,
                LedgerModification::BalanceSet { asset, holder, old } => {
                    if let Some(holders) = self.balances.get_mut(&asset) {
                        match old {
                            Some(balance) => {
                                holders.insert(holder, balance);
                            }
                            None => {
                                holders.remove(&holder);
                            }
                        }
                    }
                }
                LedgerModification::SupplySet { asset, old } => {
                    if let Some(info) = self.assets.get_mut(&asset) {
                        info.total_supply = old;
                    }
                }
            }
        }
    }

    /// Record a BalanceSet modification unless one exists since the last
    /// checkpoint, so rollback restores the pre-checkpoint balance.
    fn record_balance_modification(&mut self, asset: AssetId, holder: Address) {
        for mod_entry in self.modifications.iter().rev() {
            match mod_entry {
                LedgerModification::Checkpoint => break,
                LedgerModification::BalanceSet { asset: a, holder: h, .. }
                    if *a == asset && *h == holder =>
                {
                    return;
                }
                _ => {}
            }
        }

        let old = self
            .balances
            .get(&asset)
            .and_then(|holders| holders.get(&holder))
            .cloned();
        self.modifications.push(LedgerModification::BalanceSet { asset, holder, old });
    }

    /// Record a SupplySet modification unless one exists since the last checkpoint
    fn record_supply_modification(&mut self, asset: AssetId) {
        for mod_entry in self.modifications.iter().rev() {
            match mod_entry {
                LedgerModification::Checkpoint => break,
                LedgerModification::SupplySet { asset: a, .. } if *a == asset => {
                    return;
                }
                _ => {}
            }
        }

        if let Some(info) = self.assets.get(&asset) {
            let old = info.total_supply.clone();
            self.modifications.push(LedgerModification::SupplySet { asset, old });
        }
    }
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Ledger modification for rollback support
#[derive(Debug, Clone, Serialize, Deserialize)]
enum LedgerModification {
    Checkpoint,
    BalanceSet {
        asset: AssetId,
        holder: Address,
        old: Option<Amount>,
    },
    SupplySet {
        asset: AssetId,
        old: Amount,
    },
}
