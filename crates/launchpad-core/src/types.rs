// launchpad-core/src/types.rs

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use crate::{CoreError, CoreResult};

/// Persona identifier (monotonically assigned, never reused)
pub type PersonaId = u64;

/// Timestamp in Unix epoch seconds
pub type Timestamp = u64;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Token amount (using BigUint for arbitrary precision)
///
/// Amounts are always denominated in an asset's smallest unit; no
/// conversion across assets of differing precision ever happens here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(BigUint);

impl Amount {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    /// Whole tokens scaled to an asset's smallest unit
    pub fn from_units(tokens: u64, decimals: u8) -> Self {
        Self(BigUint::from(tokens) * BigUint::from(10u64).pow(decimals as u32))
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 + &other.0))
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    pub fn checked_mul(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 * &other.0))
    }

    /// Integer division, truncating toward zero
    pub fn checked_div(&self, other: &Amount) -> Option<Amount> {
        if other.0.is_zero() {
            None
        } else {
            Some(Amount(&self.0 / &other.0))
        }
    }

    /// Integer division, rounding up
    pub fn checked_div_ceil(&self, other: &Amount) -> Option<Amount> {
        if other.0.is_zero() {
            return None;
        }
        let quotient = &self.0 / &other.0;
        let remainder = &self.0 % &other.0;
        if remainder.is_zero() {
            Some(Amount(quotient))
        } else {
            Some(Amount(quotient + BigUint::from(1u64)))
        }
    }

    /// `self * numerator / denominator`, truncating toward zero
    pub fn mul_div(&self, numerator: u64, denominator: u64) -> CoreResult<Amount> {
        if denominator == 0 {
            return Err(CoreError::CalculationError("Division by zero".into()));
        }
        Ok(Amount((&self.0 * BigUint::from(numerator)) / BigUint::from(denominator)))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(&self.0 + &other.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(&self.0 - &other.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fungible asset identifier, assigned sequentially by the ledger
///
/// Ordered so claim selections can require ascending, duplicate-free lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// 20-byte account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// Create address from bytes
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The null address
    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> CoreResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::InvalidAsset(e.to_string()))?;
        if bytes.len() != 20 {
            return Err(CoreError::InvalidAsset("Invalid address length".into()));
        }
        let mut address = [0u8; 20];
        address.copy_from_slice(&bytes);
        Ok(Self(address))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
