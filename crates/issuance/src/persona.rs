// issuance/src/persona.rs

use crate::venue::PoolReceipt;
use crate::{IssuanceError, IssuanceResult};
use launchpad_core::{Address, Amount, AssetId, PersonaId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Name length bounds (characters)
pub const MIN_NAME_LEN: usize = 1;
pub const MAX_NAME_LEN: usize = 32;

/// Symbol length bounds (characters)
pub const MIN_SYMBOL_LEN: usize = 1;
pub const MAX_SYMBOL_LEN: usize = 10;

/// Minimum age of a purchase before its tokens unlock, waived entirely
/// once the persona graduates
pub const LOCK_DURATION: Timestamp = 86_400;

/// Fixed supply minted for every persona token
pub const TOTAL_SUPPLY_TOKENS: u64 = 1_000_000_000;
pub const TOKEN_DECIMALS: u8 = 18;

/// Conceptual split of a persona's fixed token supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPools {
    /// Sold along the bonding curve
    pub bonding: Amount,
    /// Reserved to seed the liquidity venue at graduation
    pub liquidity: Amount,
    /// Deposited with the treasury collaborator at graduation
    pub treasury: Amount,
    /// Agent-reward pool (agent-token co-funding variant only)
    pub agent_rewards: Option<Amount>,
}

impl SupplyPools {
    /// Standard split: one third each, division dust folded into the
    /// bonding pool so the pools always sum to the total supply.
    pub fn standard(total: &Amount) -> Self {
        let third = total
            .checked_div(&Amount::from_u64(3))
            .unwrap_or_else(Amount::zero);
        let bonding = total.clone() - third.clone() - third.clone();

        Self {
            bonding,
            liquidity: third.clone(),
            treasury: third,
            agent_rewards: None,
        }
    }

    /// Agent-token co-funding split: 1/3 liquidity, 2/9 bonding,
    /// 2/9 treasury, 2/9 agent rewards, dust to the bonding pool.
    pub fn with_agent_rewards(total: &Amount) -> Self {
        let liquidity = total
            .checked_div(&Amount::from_u64(3))
            .unwrap_or_else(Amount::zero);
        let two_ninths = total
            .mul_div(2, 9)
            .unwrap_or_else(|_| Amount::zero());
        let bonding = total.clone()
            - liquidity.clone()
            - two_ninths.clone()
            - two_ninths.clone();

        Self {
            bonding,
            liquidity,
            treasury: two_ninths.clone(),
            agent_rewards: Some(two_ninths),
        }
    }

    /// Sum of all pools
    pub fn total(&self) -> Amount {
        let mut sum = self.bonding.clone() + self.liquidity.clone() + self.treasury.clone();
        if let Some(agent) = &self.agent_rewards {
            sum = sum + agent.clone();
        }
        sum
    }
}

/// A persona: identity metadata, issuance state and graduation flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Persona identifier (monotonic, never reused)
    pub id: PersonaId,
    pub name: String,
    pub symbol: String,
    /// Persona owner and creator-fee recipient
    pub creator: Address,
    /// Asset buyers spend along the curve
    pub pairing_asset: AssetId,
    /// The freshly issued persona token
    pub issued_token: AssetId,
    /// Fixed-supply pool split
    pub pools: SupplyPools,
    /// Net pairing-asset deposits accumulated on the curve
    pub total_deposited: Amount,
    /// Persona tokens sold along the curve
    pub tokens_sold: Amount,
    /// One-way flag: curve trading has ended
    pub graduated: bool,
    pub metadata: BTreeMap<String, String>,
    pub created_at: Timestamp,
    /// Liquidity receipt from the venue, set at graduation
    pub pool_receipt: Option<PoolReceipt>,
}

impl Persona {
    /// Unsold remainder of the bonding pool
    pub fn remaining_allocation(&self) -> Amount {
        self.pools
            .bonding
            .checked_sub(&self.tokens_sold)
            .unwrap_or_else(Amount::zero)
    }
}

/// One purchase on the lock ledger; mutated once, on withdrawal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub amount: Amount,
    pub created_at: Timestamp,
    pub withdrawn: bool,
}

impl PurchaseRecord {
    fn released(&self, graduated: bool, now: Timestamp) -> bool {
        graduated || now >= self.created_at + LOCK_DURATION
    }
}

/// Snapshot of one persona and one buyer's lock entries, for restoring
/// state when a graduation-time external call fails
#[derive(Debug, Clone)]
pub struct PersonaSnapshot {
    persona: Persona,
    buyer: Address,
    records: Option<Vec<PurchaseRecord>>,
    indices: Option<BTreeSet<usize>>,
}

/// Owns all persona records and the per-buyer purchase/lock ledgers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaLedger {
    personas: HashMap<PersonaId, Persona>,
    purchases: HashMap<(PersonaId, Address), Vec<PurchaseRecord>>,
    /// Indices of not-yet-withdrawn records per (persona, buyer), so
    /// withdrawal never scans the full purchase history
    unwithdrawn: HashMap<(PersonaId, Address), BTreeSet<usize>>,
}

/// Validate persona creation inputs before any state moves
pub fn validate_create_inputs(
    name: &str,
    symbol: &str,
    metadata_keys: &[String],
    metadata_values: &[String],
) -> IssuanceResult<()> {
    let name_len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name_len) {
        return Err(IssuanceError::InvalidNameLength);
    }
    let symbol_len = symbol.chars().count();
    if !(MIN_SYMBOL_LEN..=MAX_SYMBOL_LEN).contains(&symbol_len) {
        return Err(IssuanceError::InvalidSymbolLength);
    }
    if metadata_keys.len() != metadata_values.len() {
        return Err(IssuanceError::MetadataMismatch);
    }
    Ok(())
}

impl PersonaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new persona under an identity-registry-assigned id
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        id: PersonaId,
        name: &str,
        symbol: &str,
        creator: Address,
        pairing_asset: AssetId,
        issued_token: AssetId,
        pools: SupplyPools,
        metadata_keys: &[String],
        metadata_values: &[String],
        now: Timestamp,
    ) -> IssuanceResult<PersonaId> {
        validate_create_inputs(name, symbol, metadata_keys, metadata_values)?;
        if self.personas.contains_key(&id) {
            return Err(IssuanceError::InvalidToken(id));
        }

        let metadata: BTreeMap<String, String> = metadata_keys
            .iter()
            .cloned()
            .zip(metadata_values.iter().cloned())
            .collect();

        self.personas.insert(
            id,
            Persona {
                id,
                name: name.to_string(),
                symbol: symbol.to_string(),
                creator,
                pairing_asset,
                issued_token,
                pools,
                total_deposited: Amount::zero(),
                tokens_sold: Amount::zero(),
                graduated: false,
                metadata,
                created_at: now,
                pool_receipt: None,
            },
        );

        Ok(id)
    }

    pub fn get(&self, id: PersonaId) -> IssuanceResult<&Persona> {
        self.personas.get(&id).ok_or(IssuanceError::InvalidToken(id))
    }

    pub fn get_mut(&mut self, id: PersonaId) -> IssuanceResult<&mut Persona> {
        self.personas.get_mut(&id).ok_or(IssuanceError::InvalidToken(id))
    }

    /// Append a purchase to the lock ledger. Balances have already moved;
    /// this only maintains the ledger used for withdrawal gating.
    pub fn record_purchase(
        &mut self,
        id: PersonaId,
        buyer: Address,
        amount: Amount,
        now: Timestamp,
    ) -> IssuanceResult<()> {
        if !self.personas.contains_key(&id) {
            return Err(IssuanceError::InvalidToken(id));
        }

        let records = self.purchases.entry((id, buyer)).or_default();
        records.push(PurchaseRecord {
            amount,
            created_at: now,
            withdrawn: false,
        });
        self.unwithdrawn
            .entry((id, buyer))
            .or_default()
            .insert(records.len() - 1);

        Ok(())
    }

    /// Purchase records for one buyer
    pub fn records(&self, id: PersonaId, buyer: &Address) -> &[PurchaseRecord] {
        self.purchases
            .get(&(id, *buyer))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Indices of records currently releasable for withdrawal
    pub fn withdrawable(
        &self,
        id: PersonaId,
        buyer: &Address,
        now: Timestamp,
    ) -> IssuanceResult<Vec<usize>> {
        let persona = self.get(id)?;
        let records = match self.purchases.get(&(id, *buyer)) {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };
        let open = match self.unwithdrawn.get(&(id, *buyer)) {
            Some(open) => open,
            None => return Ok(Vec::new()),
        };

        Ok(open
            .iter()
            .copied()
            .filter(|&i| records[i].released(persona.graduated, now))
            .collect())
    }

    /// Mark every releasable record withdrawn and return the summed amount
    /// the caller must transfer
    pub fn withdraw(
        &mut self,
        id: PersonaId,
        buyer: &Address,
        now: Timestamp,
    ) -> IssuanceResult<Amount> {
        let released = self.withdrawable(id, buyer, now)?;
        let has_open = self
            .unwithdrawn
            .get(&(id, *buyer))
            .map(|open| !open.is_empty())
            .unwrap_or(false);

        if released.is_empty() {
            return if has_open {
                Err(IssuanceError::StillLocked)
            } else {
                Err(IssuanceError::NothingToWithdraw)
            };
        }

        let records = self
            .purchases
            .get_mut(&(id, *buyer))
            .ok_or(IssuanceError::NothingToWithdraw)?;
        let open = self
            .unwithdrawn
            .get_mut(&(id, *buyer))
            .ok_or(IssuanceError::NothingToWithdraw)?;

        let mut total = Amount::zero();
        for i in released {
            records[i].withdrawn = true;
            open.remove(&i);
            total = total.checked_add(&records[i].amount).ok_or_else(|| {
                launchpad_core::CoreError::CalculationError("Withdrawal overflow".into())
            })?;
        }

        Ok(total)
    }

    /// Withdraw one specific lock by index
    pub fn withdraw_lock(
        &mut self,
        id: PersonaId,
        buyer: &Address,
        index: usize,
        now: Timestamp,
    ) -> IssuanceResult<Amount> {
        let graduated = self.get(id)?.graduated;
        let records = self
            .purchases
            .get_mut(&(id, *buyer))
            .ok_or(IssuanceError::LockNotFound(index))?;
        let record = records
            .get_mut(index)
            .ok_or(IssuanceError::LockNotFound(index))?;

        if record.withdrawn {
            return Err(IssuanceError::LockNotFound(index));
        }
        if !record.released(graduated, now) {
            return Err(IssuanceError::StillLocked);
        }

        record.withdrawn = true;
        let amount = record.amount.clone();
        if let Some(open) = self.unwithdrawn.get_mut(&(id, *buyer)) {
            open.remove(&index);
        }

        Ok(amount)
    }

    /// Replace a persona's metadata entries pairwise
    pub fn update_metadata(
        &mut self,
        id: PersonaId,
        keys: &[String],
        values: &[String],
    ) -> IssuanceResult<()> {
        if keys.len() != values.len() {
            return Err(IssuanceError::MetadataMismatch);
        }
        let persona = self.get_mut(id)?;
        for (key, value) in keys.iter().zip(values.iter()) {
            persona.metadata.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// Capture the state a purchase mutates, for restore on a failed
    /// graduation-time external call
    pub fn snapshot(&self, id: PersonaId, buyer: &Address) -> IssuanceResult<PersonaSnapshot> {
        Ok(PersonaSnapshot {
            persona: self.get(id)?.clone(),
            buyer: *buyer,
            records: self.purchases.get(&(id, *buyer)).cloned(),
            indices: self.unwithdrawn.get(&(id, *buyer)).cloned(),
        })
    }

    /// Restore a snapshot taken by `snapshot`
    pub fn restore(&mut self, snapshot: PersonaSnapshot) {
        let key = (snapshot.persona.id, snapshot.buyer);
        self.personas.insert(snapshot.persona.id, snapshot.persona);
        match snapshot.records {
            Some(records) => {
                self.purchases.insert(key, records);
            }
            None => {
                self.purchases.remove(&key);
            }
        }
        match snapshot.indices {
            Some(indices) => {
                self.unwithdrawn.insert(key, indices);
            }
            None => {
                self.unwithdrawn.remove(&key);
            }
        }
    }
}
