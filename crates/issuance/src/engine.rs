// issuance/src/engine.rs

use crate::identity::IdentityRegistry;
use crate::persona::{
    validate_create_inputs, PersonaLedger, SupplyPools, TOKEN_DECIMALS, TOTAL_SUPPLY_TOKENS,
};
use crate::registry::{PairingConfig, PairingRegistry};
use crate::staking::StakingRewards;
use crate::treasury::TreasuryVault;
use crate::venue::LiquidityVenue;
use crate::{IssuanceError, IssuanceResult};
use launchpad_core::{Address, Amount, AssetId, PersonaId, Timestamp, TokenLedger};
use pricing::{
    CurveParams, FeeBreakdown, FeeEngine, FeeReductionConfig, FixedPointCurve, TradingFeeConfig,
};

/// Accounts the engine routes balances through
#[derive(Debug, Clone)]
pub struct EngineAccounts {
    /// Holds minted persona supplies and curve deposits
    pub custody: Address,
    /// Receives protocol fees and creation costs
    pub protocol_treasury: Address,
    /// On-ledger account of the treasury collaborator
    pub treasury_vault: Address,
    /// On-ledger account of the liquidity venue
    pub liquidity_venue: Address,
}

/// Read-only compound quote: fee deduction plus curve output
#[derive(Debug, Clone)]
pub struct QuoteBreakdown {
    pub fees: FeeBreakdown,
    pub amount_out: Amount,
}

/// Result of a successful purchase
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub persona_id: PersonaId,
    pub amount_in: Amount,
    pub fee_total: Amount,
    pub amount_out: Amount,
    /// This purchase triggered the graduation transition
    pub graduated: bool,
}

/// Orchestrates persona creation, curve purchases and graduation
///
/// Each persona is a two-state machine, `Active -> Graduated`, and the
/// edge fires exactly once. Every operation either fully commits or fully
/// rejects: internal state mutates first, external collaborators are
/// called last, and a collaborator failure rolls everything back.
pub struct IssuanceEngine {
    ledger: TokenLedger,
    personas: PersonaLedger,
    registry: PairingRegistry,
    fees: FeeEngine,
    accounts: EngineAccounts,
    /// Loyalty asset whose holders earn fee reductions
    loyalty_asset: AssetId,
    identity: Box<dyn IdentityRegistry>,
    treasury: Box<dyn TreasuryVault>,
    venue: Box<dyn LiquidityVenue>,
    staking: Option<Box<dyn StakingRewards>>,
}

impl IssuanceEngine {
    pub fn new(
        ledger: TokenLedger,
        accounts: EngineAccounts,
        loyalty_asset: AssetId,
        identity: Box<dyn IdentityRegistry>,
        treasury: Box<dyn TreasuryVault>,
        venue: Box<dyn LiquidityVenue>,
    ) -> Self {
        Self {
            ledger,
            personas: PersonaLedger::new(),
            registry: PairingRegistry::new(),
            fees: FeeEngine::default(),
            accounts,
            loyalty_asset,
            identity,
            treasury,
            venue,
            staking: None,
        }
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TokenLedger {
        &mut self.ledger
    }

    pub fn personas(&self) -> &PersonaLedger {
        &self.personas
    }

    pub fn treasury(&self) -> &dyn TreasuryVault {
        self.treasury.as_ref()
    }

    pub fn accounts(&self) -> &EngineAccounts {
        &self.accounts
    }

    /// Register the optional staking-rewards collaborator
    pub fn set_staking_rewards(&mut self, staking: Box<dyn StakingRewards>) {
        self.staking = Some(staking);
    }

    pub fn configure_pairing_asset(
        &mut self,
        asset: AssetId,
        config: PairingConfig,
    ) -> IssuanceResult<()> {
        self.registry.configure(asset, config)
    }

    pub fn disable_pairing_asset(&mut self, asset: AssetId) -> IssuanceResult<()> {
        self.registry.disable(asset)
    }

    pub fn configure_trading_fees(&mut self, config: TradingFeeConfig) -> IssuanceResult<()> {
        self.fees.set_trading(config)?;
        tracing::info!("Trading fees reconfigured");
        Ok(())
    }

    pub fn configure_fee_reduction(&mut self, config: FeeReductionConfig) -> IssuanceResult<()> {
        self.fees.set_reduction(config)?;
        tracing::info!("Fee reduction reconfigured");
        Ok(())
    }

    /// Mint a new persona: identity, fixed-supply token, pool allocation
    ///
    /// The creation cost is charged in the pairing asset. The full token
    /// supply lands in engine custody; the treasury pool transfers out at
    /// graduation.
    #[allow(clippy::too_many_arguments)]
    pub fn create_persona(
        &mut self,
        creator: Address,
        pairing_asset: AssetId,
        name: &str,
        symbol: &str,
        metadata_keys: &[String],
        metadata_values: &[String],
        agent_funded: bool,
        now: Timestamp,
    ) -> IssuanceResult<PersonaId> {
        validate_create_inputs(name, symbol, metadata_keys, metadata_values)?;
        let mint_cost = self.registry.get(pairing_asset)?.mint_cost.clone();

        self.ledger.transfer(
            pairing_asset,
            &creator,
            &self.accounts.protocol_treasury,
            &mint_cost,
        )?;

        let total_supply = Amount::from_units(TOTAL_SUPPLY_TOKENS, TOKEN_DECIMALS);
        let issued_token = self.ledger.register_asset(symbol, TOKEN_DECIMALS)?;
        self.ledger.mint(issued_token, &self.accounts.custody, &total_supply)?;

        let pools = if agent_funded {
            SupplyPools::with_agent_rewards(&total_supply)
        } else {
            SupplyPools::standard(&total_supply)
        };

        let persona_id = self.identity.mint_identity(creator);
        self.personas.create(
            persona_id,
            name,
            symbol,
            creator,
            pairing_asset,
            issued_token,
            pools,
            metadata_keys,
            metadata_values,
            now,
        )?;

        tracing::info!(persona_id, name, %pairing_asset, "Persona created");
        Ok(persona_id)
    }

    /// Current curve price of a persona token, scaled by
    /// `pricing::PRICE_PRECISION`
    pub fn spot_price(&self, persona_id: PersonaId) -> IssuanceResult<Amount> {
        let persona = self.personas.get(persona_id)?;
        let curve = self.curve_params(persona.pairing_asset)?;
        Ok(FixedPointCurve::spot_price(
            &persona.tokens_sold,
            &persona.pools.bonding,
            &curve,
        )?)
    }

    /// Read-only quote for a prospective purchase
    pub fn quote(
        &self,
        persona_id: PersonaId,
        amount_in: &Amount,
        buyer: &Address,
    ) -> IssuanceResult<QuoteBreakdown> {
        let persona = self.personas.get(persona_id)?;
        if persona.graduated {
            return Err(IssuanceError::TradingOnLiquidityVenue);
        }
        let curve = self.curve_params(persona.pairing_asset)?;

        let loyalty = self.ledger.balance_of(self.loyalty_asset, buyer);
        let fees = self.fees.compute(amount_in, &loyalty)?;
        let amount_out = FixedPointCurve::quote_buy(
            &fees.net_in,
            &persona.tokens_sold,
            &persona.pools.bonding,
            &curve,
        )?;

        Ok(QuoteBreakdown { fees, amount_out })
    }

    /// Swap-exact-in purchase along the bonding curve
    ///
    /// Tokens land in custody under a lock record for `recipient`; the
    /// purchase that lifts `total_deposited` over the graduation threshold
    /// also executes the graduation transition in the same call.
    #[allow(clippy::too_many_arguments)]
    pub fn purchase(
        &mut self,
        persona_id: PersonaId,
        buyer: Address,
        amount_in: Amount,
        min_amount_out: Amount,
        recipient: Address,
        deadline: Timestamp,
        now: Timestamp,
    ) -> IssuanceResult<PurchaseReceipt> {
        if now > deadline {
            return Err(IssuanceError::Expired);
        }
        if recipient.is_zero() {
            return Err(IssuanceError::InvalidRecipient);
        }

        let persona = self.personas.get(persona_id)?;
        if persona.graduated {
            return Err(IssuanceError::TradingOnLiquidityVenue);
        }
        let pairing_asset = persona.pairing_asset;
        let tokens_sold = persona.tokens_sold.clone();
        let bonding_allocation = persona.pools.bonding.clone();
        let curve = self.curve_params(pairing_asset)?;
        let graduation_threshold = self
            .registry
            .get_any(pairing_asset)?
            .graduation_threshold
            .clone();

        let loyalty = self.ledger.balance_of(self.loyalty_asset, &buyer);
        let fees = self.fees.compute(&amount_in, &loyalty)?;

        let amount_out =
            FixedPointCurve::quote_buy(&fees.net_in, &tokens_sold, &bonding_allocation, &curve)?;
        if amount_out.inner() < min_amount_out.inner() {
            return Err(IssuanceError::InsufficientOutput {
                minimum: min_amount_out,
                actual: amount_out,
            });
        }
        let new_sold = tokens_sold
            .checked_add(&amount_out)
            .ok_or_else(|| {
                launchpad_core::CoreError::CalculationError("Sold overflow".into())
            })?;
        if new_sold.inner() > bonding_allocation.inner() {
            return Err(IssuanceError::InsufficientLiquidity {
                requested: amount_out,
                remaining: bonding_allocation
                    .checked_sub(&tokens_sold)
                    .unwrap_or_else(Amount::zero),
            });
        }

        // Everything below mutates state and must commit or roll back as
        // one unit.
        let snapshot = self.personas.snapshot(persona_id, &recipient)?;
        self.ledger.checkpoint();

        match self.execute_purchase(
            persona_id,
            &buyer,
            &recipient,
            &fees,
            &amount_out,
            &graduation_threshold,
            now,
        ) {
            Ok(graduated) => {
                self.ledger.commit();
                tracing::debug!(persona_id, %amount_in, %amount_out, "Curve purchase");
                Ok(PurchaseReceipt {
                    persona_id,
                    amount_in,
                    fee_total: fees.fee_total,
                    amount_out,
                    graduated,
                })
            }
            Err(e) => {
                self.ledger.rollback();
                self.personas.restore(snapshot);
                Err(e)
            }
        }
    }

    /// Balance movement, lock recording and the graduation transition.
    /// Runs inside the checkpoint bracket set up by `purchase`.
    #[allow(clippy::too_many_arguments)]
    fn execute_purchase(
        &mut self,
        persona_id: PersonaId,
        buyer: &Address,
        recipient: &Address,
        fees: &FeeBreakdown,
        amount_out: &Amount,
        graduation_threshold: &Amount,
        now: Timestamp,
    ) -> IssuanceResult<bool> {
        let creator = self.personas.get(persona_id)?.creator;
        let pairing_asset = self.personas.get(persona_id)?.pairing_asset;

        // Fee routing reads the current identity owner, not the original
        // creator
        let fee_recipient = self.identity.owner_of(persona_id).unwrap_or(creator);

        if !fees.creator_fee.is_zero() {
            self.ledger
                .transfer(pairing_asset, buyer, &fee_recipient, &fees.creator_fee)?;
        }
        if !fees.protocol_fee.is_zero() {
            self.ledger.transfer(
                pairing_asset,
                buyer,
                &self.accounts.protocol_treasury,
                &fees.protocol_fee,
            )?;
        }
        self.ledger
            .transfer(pairing_asset, buyer, &self.accounts.custody, &fees.net_in)?;

        let persona = self.personas.get_mut(persona_id)?;
        persona.tokens_sold = persona
            .tokens_sold
            .checked_add(amount_out)
            .ok_or_else(|| {
                launchpad_core::CoreError::CalculationError("Sold overflow".into())
            })?;
        persona.total_deposited = persona
            .total_deposited
            .checked_add(&fees.net_in)
            .ok_or_else(|| {
                launchpad_core::CoreError::CalculationError("Deposit overflow".into())
            })?;
        let deposited = persona.total_deposited.clone();

        self.personas
            .record_purchase(persona_id, *recipient, amount_out.clone(), now)?;

        if deposited.inner() >= graduation_threshold.inner() {
            self.graduate(persona_id)?;
            return Ok(true);
        }

        Ok(false)
    }

    /// The one-shot `Active -> Graduated` transition
    ///
    /// Internal state flips first; the treasury deposit and pool seeding
    /// follow. Any failure propagates to `purchase`, which rolls the whole
    /// call back, so the edge either fires completely or not at all.
    fn graduate(&mut self, persona_id: PersonaId) -> IssuanceResult<()> {
        let persona = self.personas.get_mut(persona_id)?;
        persona.graduated = true;

        let pairing_asset = persona.pairing_asset;
        let issued_token = persona.issued_token;
        let treasury_pool = persona.pools.treasury.clone();
        let liquidity_pool = persona.pools.liquidity.clone();
        let deposited = persona.total_deposited.clone();

        self.ledger.transfer(
            issued_token,
            &self.accounts.custody,
            &self.accounts.treasury_vault,
            &treasury_pool,
        )?;
        self.ledger.transfer(
            issued_token,
            &self.accounts.custody,
            &self.accounts.liquidity_venue,
            &liquidity_pool,
        )?;
        self.ledger.transfer(
            pairing_asset,
            &self.accounts.custody,
            &self.accounts.liquidity_venue,
            &deposited,
        )?;

        // The venue can refuse; it must run before the treasury
        // bookkeeping call.
        let receipt = self.venue.create_pool_and_seed(
            issued_token,
            liquidity_pool,
            pairing_asset,
            deposited.clone(),
        )?;
        self.treasury.deposit(issued_token, treasury_pool)?;

        let persona = self.personas.get_mut(persona_id)?;
        persona.pool_receipt = Some(receipt);

        if let Some(staking) = self.staking.as_mut() {
            staking.on_graduation(persona_id, issued_token);
        }

        tracing::info!(persona_id, %deposited, "Persona graduated to the liquidity venue");
        Ok(())
    }

    /// Release every matured (or graduation-waived) lock for a buyer and
    /// transfer the purchased tokens out of custody
    pub fn withdraw_locked_tokens(
        &mut self,
        persona_id: PersonaId,
        buyer: Address,
        now: Timestamp,
    ) -> IssuanceResult<Amount> {
        let snapshot = self.personas.snapshot(persona_id, &buyer)?;
        let amount = self.personas.withdraw(persona_id, &buyer, now)?;
        let issued_token = self.personas.get(persona_id)?.issued_token;

        if let Err(e) =
            self.ledger
                .transfer(issued_token, &self.accounts.custody, &buyer, &amount)
        {
            self.personas.restore(snapshot);
            return Err(e.into());
        }
        Ok(amount)
    }

    /// Release one specific lock by index
    pub fn withdraw_lock(
        &mut self,
        persona_id: PersonaId,
        buyer: Address,
        index: usize,
        now: Timestamp,
    ) -> IssuanceResult<Amount> {
        let snapshot = self.personas.snapshot(persona_id, &buyer)?;
        let amount = self.personas.withdraw_lock(persona_id, &buyer, index, now)?;
        let issued_token = self.personas.get(persona_id)?.issued_token;

        if let Err(e) =
            self.ledger
                .transfer(issued_token, &self.accounts.custody, &buyer, &amount)
        {
            self.personas.restore(snapshot);
            return Err(e.into());
        }
        Ok(amount)
    }

    /// Update persona metadata; only the current identity owner may call
    pub fn update_metadata(
        &mut self,
        persona_id: PersonaId,
        caller: Address,
        keys: &[String],
        values: &[String],
    ) -> IssuanceResult<()> {
        let owner = self
            .identity
            .owner_of(persona_id)
            .ok_or(IssuanceError::InvalidToken(persona_id))?;
        if caller != owner {
            return Err(IssuanceError::Unauthorized);
        }
        self.personas.update_metadata(persona_id, keys, values)
    }

    fn curve_params(&self, pairing_asset: AssetId) -> IssuanceResult<CurveParams> {
        Ok(self.registry.get_any(pairing_asset)?.curve.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::InMemoryIdentityRegistry;
    use crate::persona::LOCK_DURATION;
    use crate::treasury::InMemoryTreasury;
    use crate::venue::InMemoryLiquidityVenue;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = n;
        Address::new(bytes)
    }

    const CUSTODY: u8 = 101;
    const PROTOCOL: u8 = 102;
    const VAULT: u8 = 103;
    const VENUE: u8 = 104;

    fn accounts() -> EngineAccounts {
        EngineAccounts {
            custody: addr(CUSTODY),
            protocol_treasury: addr(PROTOCOL),
            treasury_vault: addr(VAULT),
            liquidity_venue: addr(VENUE),
        }
    }

    /// Engine with one 18-decimal pairing asset and a funded creator/buyer
    fn create_test_engine() -> (IssuanceEngine, AssetId) {
        let mut ledger = TokenLedger::new();
        let loyalty = ledger.register_asset("LOYAL", 18).unwrap();
        let pairing = ledger.register_asset("PAIR", 18).unwrap();
        ledger
            .mint(pairing, &addr(1), &Amount::from_units(10_000_000, 18))
            .unwrap();
        ledger
            .mint(pairing, &addr(2), &Amount::from_units(10_000_000, 18))
            .unwrap();

        let mut engine = IssuanceEngine::new(
            ledger,
            accounts(),
            loyalty,
            Box::new(InMemoryIdentityRegistry::new()),
            Box::new(InMemoryTreasury::new()),
            Box::new(InMemoryLiquidityVenue::new()),
        );
        engine
            .configure_pairing_asset(
                pairing,
                PairingConfig::new(
                    Amount::from_units(10, 18),
                    Amount::from_units(50_000, 18),
                ),
            )
            .unwrap();

        (engine, pairing)
    }

    fn create_test_persona(engine: &mut IssuanceEngine, pairing: AssetId) -> PersonaId {
        engine
            .create_persona(addr(1), pairing, "Aria", "ARIA", &[], &[], false, 1_000)
            .unwrap()
    }

    #[test]
    fn test_create_persona_mints_supply() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);

        let persona = engine.personas().get(id).unwrap();
        let total = Amount::from_units(TOTAL_SUPPLY_TOKENS, TOKEN_DECIMALS);
        assert_eq!(persona.pools.total(), total);
        assert_eq!(
            engine.ledger().balance_of(persona.issued_token, &addr(CUSTODY)),
            total
        );
        assert_eq!(
            engine.ledger().total_supply(persona.issued_token).unwrap(),
            total
        );

        // Creation cost landed with the protocol
        assert_eq!(
            engine.ledger().balance_of(pairing, &addr(PROTOCOL)),
            Amount::from_units(10, 18)
        );
    }

    #[test]
    fn test_create_persona_requires_enabled_pairing() {
        let (mut engine, pairing) = create_test_engine();
        engine.disable_pairing_asset(pairing).unwrap();

        let result =
            engine.create_persona(addr(1), pairing, "Aria", "ARIA", &[], &[], false, 1_000);
        assert!(matches!(result, Err(IssuanceError::PairingNotEnabled(_))));
    }

    #[test]
    fn test_create_persona_charges_before_minting() {
        let (mut engine, pairing) = create_test_engine();
        let broke = addr(9);

        let result =
            engine.create_persona(broke, pairing, "Aria", "ARIA", &[], &[], false, 1_000);
        assert!(matches!(
            result,
            Err(IssuanceError::Core(launchpad_core::CoreError::InsufficientBalance))
        ));
    }

    #[test]
    fn test_purchase_conservation() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);

        let before = engine.ledger().balance_of(pairing, &buyer);
        let custody_before = engine.ledger().balance_of(pairing, &addr(CUSTODY));
        let protocol_before = engine.ledger().balance_of(pairing, &addr(PROTOCOL));
        let creator_before = engine.ledger().balance_of(pairing, &addr(1));

        let amount_in = Amount::from_units(1_000, 18);
        let receipt = engine
            .purchase(id, buyer, amount_in.clone(), Amount::zero(), buyer, 10_000, 2_000)
            .unwrap();
        assert!(!receipt.graduated);
        assert!(!receipt.amount_out.is_zero());

        // Buyer debited exactly amount_in
        let after = engine.ledger().balance_of(pairing, &buyer);
        assert_eq!(before.checked_sub(&after).unwrap(), amount_in);

        // Every routed part adds back to amount_in, no dust
        let custody_delta = engine
            .ledger()
            .balance_of(pairing, &addr(CUSTODY))
            .checked_sub(&custody_before)
            .unwrap();
        let protocol_delta = engine
            .ledger()
            .balance_of(pairing, &addr(PROTOCOL))
            .checked_sub(&protocol_before)
            .unwrap();
        let creator_delta = engine
            .ledger()
            .balance_of(pairing, &addr(1))
            .checked_sub(&creator_before)
            .unwrap();
        let routed = custody_delta
            .checked_add(&protocol_delta)
            .and_then(|sum| sum.checked_add(&creator_delta))
            .unwrap();
        assert_eq!(routed, amount_in);

        // Deposit and sold counters match the receipt
        let persona = engine.personas().get(id).unwrap();
        assert_eq!(persona.tokens_sold, receipt.amount_out);
        assert_eq!(persona.total_deposited, custody_delta);
    }

    #[test]
    fn test_purchase_rejections() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);
        let amount = Amount::from_units(100, 18);

        // Expired deadline
        let result = engine.purchase(
            id,
            buyer,
            amount.clone(),
            Amount::zero(),
            buyer,
            1_000,
            1_001,
        );
        assert!(matches!(result, Err(IssuanceError::Expired)));

        // Null recipient
        let result = engine.purchase(
            id,
            buyer,
            amount.clone(),
            Amount::zero(),
            Address::zero(),
            10_000,
            2_000,
        );
        assert!(matches!(result, Err(IssuanceError::InvalidRecipient)));

        // Unknown persona
        let result = engine.purchase(
            id + 1,
            buyer,
            amount.clone(),
            Amount::zero(),
            buyer,
            10_000,
            2_000,
        );
        assert!(matches!(result, Err(IssuanceError::InvalidToken(_))));

        // Unreachable slippage bound
        let result = engine.purchase(
            id,
            buyer,
            amount,
            Amount::from_units(TOTAL_SUPPLY_TOKENS, TOKEN_DECIMALS),
            buyer,
            10_000,
            2_000,
        );
        assert!(matches!(result, Err(IssuanceError::InsufficientOutput { .. })));
    }

    #[test]
    fn test_purchase_insufficient_liquidity() {
        let (mut engine, pairing) = create_test_engine();
        // Threshold far above what the curve can ever raise, so the cap
        // binds before graduation
        engine
            .configure_pairing_asset(
                pairing,
                PairingConfig::new(
                    Amount::from_units(10, 18),
                    Amount::from_units(1_000_000_000, 18),
                ),
            )
            .unwrap();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);

        // An enormous input quotes more than the unsold bonding pool
        let result = engine.purchase(
            id,
            buyer,
            Amount::from_units(9_000_000, 18),
            Amount::zero(),
            buyer,
            10_000,
            2_000,
        );
        assert!(matches!(
            result,
            Err(IssuanceError::InsufficientLiquidity { .. })
        ));

        // The rejection left the bonding pool untouched
        let persona = engine.personas().get(id).unwrap();
        assert_eq!(persona.remaining_allocation(), persona.pools.bonding);
    }

    #[test]
    fn test_spot_price_rises_with_sales() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);

        let before = engine.spot_price(id).unwrap();
        engine
            .purchase(
                id,
                buyer,
                Amount::from_units(5_000, 18),
                Amount::zero(),
                buyer,
                10_000,
                2_000,
            )
            .unwrap();
        let after = engine.spot_price(id).unwrap();

        assert!(after.inner() > before.inner());
    }

    #[test]
    fn test_purchase_insufficient_buyer_balance_rolls_back() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let poor = addr(7);
        engine
            .ledger_mut()
            .mint(pairing, &poor, &Amount::from_units(1, 18))
            .unwrap();

        let result = engine.purchase(
            id,
            poor,
            Amount::from_units(100, 18),
            Amount::zero(),
            poor,
            10_000,
            2_000,
        );
        assert!(matches!(
            result,
            Err(IssuanceError::Core(launchpad_core::CoreError::InsufficientBalance))
        ));

        // Nothing moved, nothing recorded
        assert_eq!(
            engine.ledger().balance_of(pairing, &poor),
            Amount::from_units(1, 18)
        );
        let persona = engine.personas().get(id).unwrap();
        assert!(persona.tokens_sold.is_zero());
        assert!(engine.personas().records(id, &poor).is_empty());
    }

    #[test]
    fn test_graduation_one_shot() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);

        // Threshold is 50,000; push well past it in one purchase
        let receipt = engine
            .purchase(
                id,
                buyer,
                Amount::from_units(60_000, 18),
                Amount::zero(),
                buyer,
                10_000,
                2_000,
            )
            .unwrap();
        assert!(receipt.graduated);

        let persona = engine.personas().get(id).unwrap();
        assert!(persona.graduated);
        assert!(persona.pool_receipt.is_some());
        let issued_token = persona.issued_token;

        // Treasury collaborator received the treasury pool
        let treasury_pool = persona.pools.treasury.clone();
        assert_eq!(engine.treasury().deposited_balance(issued_token), treasury_pool);

        // A second purchase is rejected regardless of caller
        let result = engine.purchase(
            id,
            addr(1),
            Amount::from_units(10, 18),
            Amount::zero(),
            addr(1),
            10_000,
            3_000,
        );
        assert!(matches!(result, Err(IssuanceError::TradingOnLiquidityVenue)));

        // The graduating buyer withdraws immediately, no lock wait
        let withdrawn = engine.withdraw_locked_tokens(id, buyer, 2_001).unwrap();
        assert_eq!(withdrawn, receipt.amount_out);
        assert_eq!(
            engine.ledger().balance_of(issued_token, &buyer),
            receipt.amount_out
        );
    }

    #[test]
    fn test_withdraw_respects_lock() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);

        let receipt = engine
            .purchase(
                id,
                buyer,
                Amount::from_units(100, 18),
                Amount::zero(),
                buyer,
                10_000,
                2_000,
            )
            .unwrap();

        assert!(matches!(
            engine.withdraw_locked_tokens(id, buyer, 2_001),
            Err(IssuanceError::StillLocked)
        ));

        let withdrawn = engine
            .withdraw_locked_tokens(id, buyer, 2_000 + LOCK_DURATION)
            .unwrap();
        assert_eq!(withdrawn, receipt.amount_out);

        // Nothing left to release
        assert!(matches!(
            engine.withdraw_locked_tokens(id, buyer, 2_000 + LOCK_DURATION),
            Err(IssuanceError::NothingToWithdraw)
        ));
    }

    #[test]
    fn test_quote_matches_purchase() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);
        let amount = Amount::from_units(777, 18);

        let quote = engine.quote(id, &amount, &buyer).unwrap();
        let receipt = engine
            .purchase(id, buyer, amount, Amount::zero(), buyer, 10_000, 2_000)
            .unwrap();

        assert_eq!(quote.amount_out, receipt.amount_out);
        assert_eq!(quote.fees.fee_total, receipt.fee_total);
    }

    #[test]
    fn test_loyalty_holding_reduces_fee() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);
        let buyer = addr(2);
        let whale = addr(3);
        let loyalty = engine.loyalty_asset;
        engine
            .ledger_mut()
            .mint(pairing, &whale, &Amount::from_units(1_000, 18))
            .unwrap();
        engine
            .ledger_mut()
            .mint(loyalty, &whale, &Amount::from_units(1_000_000, 18))
            .unwrap();

        let amount = Amount::from_units(500, 18);
        let plain = engine.quote(id, &amount, &buyer).unwrap();
        let reduced = engine.quote(id, &amount, &whale).unwrap();

        assert!(reduced.fees.fee_total.inner() < plain.fees.fee_total.inner());
        assert!(reduced.fees.fee_total.is_zero());
        assert!(reduced.amount_out.inner() > plain.amount_out.inner());
    }

    #[test]
    fn test_update_metadata_authorization() {
        let (mut engine, pairing) = create_test_engine();
        let id = create_test_persona(&mut engine, pairing);

        let keys = vec!["mood".to_string()];
        let values = vec!["stoic".to_string()];

        let result = engine.update_metadata(id, addr(2), &keys, &values);
        assert!(matches!(result, Err(IssuanceError::Unauthorized)));

        engine.update_metadata(id, addr(1), &keys, &values).unwrap();
        assert_eq!(
            engine.personas().get(id).unwrap().metadata.get("mood").unwrap(),
            "stoic"
        );
    }

    #[test]
    fn test_agent_funded_split() {
        let (mut engine, pairing) = create_test_engine();
        let id = engine
            .create_persona(addr(1), pairing, "Agentic", "AGNT", &[], &[], true, 1_000)
            .unwrap();

        let persona = engine.personas().get(id).unwrap();
        assert!(persona.pools.agent_rewards.is_some());
        assert_eq!(
            persona.pools.total(),
            Amount::from_units(TOTAL_SUPPLY_TOKENS, TOKEN_DECIMALS)
        );
    }
}
