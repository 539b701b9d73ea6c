// issuance/src/registry.rs

use crate::{IssuanceError, IssuanceResult};
use launchpad_core::{Amount, AssetId};
use pricing::CurveParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-pairing-asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// New persona creations accepted against this asset
    pub enabled: bool,
    /// Creation cost charged in this asset
    pub mint_cost: Amount,
    /// Deposited amount at which a persona graduates
    pub graduation_threshold: Amount,
    /// Curve parameters in this asset's own magnitude
    pub curve: CurveParams,
}

impl PairingConfig {
    pub fn new(mint_cost: Amount, graduation_threshold: Amount) -> Self {
        Self {
            enabled: true,
            mint_cost,
            graduation_threshold,
            curve: CurveParams::default(),
        }
    }

    pub fn with_curve(mut self, curve: CurveParams) -> Self {
        self.curve = curve;
        self
    }
}

/// Registry of pairing assets personas can be created against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairingRegistry {
    configs: HashMap<AssetId, PairingConfig>,
}

impl PairingRegistry {
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Insert or overwrite a pairing-asset configuration
    pub fn configure(&mut self, asset: AssetId, config: PairingConfig) -> IssuanceResult<()> {
        if config.mint_cost.is_zero() {
            return Err(IssuanceError::InvalidPairingConfig(
                "Mint cost must be positive".into(),
            ));
        }
        if config.graduation_threshold.is_zero() {
            return Err(IssuanceError::InvalidPairingConfig(
                "Graduation threshold must be positive".into(),
            ));
        }
        if config.curve.virtual_base_reserve.is_zero() {
            return Err(IssuanceError::InvalidPairingConfig(
                "Virtual base reserve must be positive".into(),
            ));
        }

        tracing::info!(%asset, "Pairing asset configured");
        self.configs.insert(asset, config);
        Ok(())
    }

    /// Disable new creations against an asset; the record is retained so
    /// personas already created against it keep trading.
    pub fn disable(&mut self, asset: AssetId) -> IssuanceResult<()> {
        let config = self
            .configs
            .get_mut(&asset)
            .ok_or(IssuanceError::PairingNotEnabled(asset))?;
        config.enabled = false;

        tracing::warn!(%asset, "Pairing asset disabled");
        Ok(())
    }

    /// Lookup for new creations: fails when absent or disabled
    pub fn get(&self, asset: AssetId) -> IssuanceResult<&PairingConfig> {
        match self.configs.get(&asset) {
            Some(config) if config.enabled => Ok(config),
            _ => Err(IssuanceError::PairingNotEnabled(asset)),
        }
    }

    /// Lookup for existing personas: disabled assets still resolve
    pub fn get_any(&self, asset: AssetId) -> IssuanceResult<&PairingConfig> {
        self.configs
            .get(&asset)
            .ok_or(IssuanceError::PairingNotEnabled(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PairingConfig {
        PairingConfig::new(Amount::from_u64(100), Amount::from_u64(1_000_000))
    }

    #[test]
    fn test_configure_and_get() {
        let mut registry = PairingRegistry::new();
        let asset = AssetId(1);

        registry.configure(asset, config()).unwrap();
        let stored = registry.get(asset).unwrap();
        assert!(stored.enabled);
        assert_eq!(stored.mint_cost, Amount::from_u64(100));
    }

    #[test]
    fn test_configure_rejects_zero_values() {
        let mut registry = PairingRegistry::new();
        let asset = AssetId(1);

        let result = registry.configure(
            asset,
            PairingConfig::new(Amount::zero(), Amount::from_u64(1)),
        );
        assert!(matches!(result, Err(IssuanceError::InvalidPairingConfig(_))));

        let result = registry.configure(
            asset,
            PairingConfig::new(Amount::from_u64(1), Amount::zero()),
        );
        assert!(matches!(result, Err(IssuanceError::InvalidPairingConfig(_))));
    }

    #[test]
    fn test_disable_keeps_record() {
        let mut registry = PairingRegistry::new();
        let asset = AssetId(1);

        registry.configure(asset, config()).unwrap();
        registry.disable(asset).unwrap();

        assert!(matches!(
            registry.get(asset),
            Err(IssuanceError::PairingNotEnabled(_))
        ));
        // Personas created before the disable still resolve their config
        assert!(registry.get_any(asset).is_ok());
    }

    #[test]
    fn test_unknown_asset() {
        let mut registry = PairingRegistry::new();
        let ghost = AssetId(9);

        assert!(matches!(
            registry.get(ghost),
            Err(IssuanceError::PairingNotEnabled(_))
        ));
        assert!(matches!(
            registry.disable(ghost),
            Err(IssuanceError::PairingNotEnabled(_))
        ));
    }

    #[test]
    fn test_reconfigure_overwrites() {
        let mut registry = PairingRegistry::new();
        let asset = AssetId(1);

        registry.configure(asset, config()).unwrap();
        registry.disable(asset).unwrap();
        registry
            .configure(
                asset,
                PairingConfig::new(Amount::from_u64(500), Amount::from_u64(2_000_000)),
            )
            .unwrap();

        let stored = registry.get(asset).unwrap();
        assert!(stored.enabled);
        assert_eq!(stored.mint_cost, Amount::from_u64(500));
    }
}
