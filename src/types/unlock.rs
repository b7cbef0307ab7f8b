//! Unlock option and unlock projections.

use serde::{Deserialize, Serialize};

use crate::{
    ethereum::{constants::TOKEN_DECIMALS, contracts::treasury::ITreasury},
    types::format_fixed,
};

/// Unlock option as configured on the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockOptionView {
    /// Option ID.
    pub id: u8,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Cliff period in seconds.
    pub cliff_seconds: u64,
    /// Conversion rate from source to target, in percent.
    pub conversion_rate_percentage: u8,
}

impl From<&ITreasury::UnlockOption> for UnlockOptionView {
    fn from(option: &ITreasury::UnlockOption) -> Self {
        Self {
            id: option.id,
            name: option.name.clone(),
            description: option.description.clone(),
            cliff_seconds: option.cliffSeconds,
            conversion_rate_percentage: option.conversionRatePercentage,
        }
    }
}

/// A holder's unlock as listed in the unlock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockView {
    /// Unlock ID (bytes32, hex).
    pub id: String,
    /// Locked source amount (2 dp).
    pub source_amount: String,
    /// Target amount (2 dp).
    pub target_amount: String,
    /// Raw source amount in wei.
    pub source_amount_raw: String,
    /// Raw target amount in wei.
    pub target_amount_raw: String,
    /// Unix time the lock started.
    pub lock_time: u64,
    /// Unix time the unlock becomes fulfillable.
    pub unlock_time: u64,
    /// Whether the unlock has been fulfilled.
    pub fulfilled: bool,
}

impl From<&ITreasury::Unlock> for UnlockView {
    fn from(unlock: &ITreasury::Unlock) -> Self {
        Self {
            id: unlock.id.to_string(),
            source_amount: format_fixed(unlock.sourceAmount, TOKEN_DECIMALS, 2),
            target_amount: format_fixed(unlock.targetAmount, TOKEN_DECIMALS, 2),
            source_amount_raw: unlock.sourceAmount.to_string(),
            target_amount_raw: unlock.targetAmount.to_string(),
            lock_time: unlock.lockTime,
            unlock_time: unlock.unlockTime,
            fulfilled: unlock.fulfilled,
        }
    }
}

/// Unfulfilled unlocks first, then fulfilled ones.
pub fn merge_unlocks(
    unfulfilled: Option<&[ITreasury::Unlock]>,
    fulfilled: Option<&[ITreasury::Unlock]>,
) -> Vec<UnlockView> {
    unfulfilled
        .unwrap_or_default()
        .iter()
        .chain(fulfilled.unwrap_or_default())
        .map(UnlockView::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, U256};

    fn unlock(byte: u8, fulfilled: bool) -> ITreasury::Unlock {
        ITreasury::Unlock {
            id: B256::repeat_byte(byte),
            sourceAmount: U256::from(2_500_000_000_000_000_000u64),
            targetAmount: U256::from(1_250_000_000_000_000_000u64),
            lockTime: 1_700_000_000,
            unlockTime: 1_707_776_000,
            fulfilled,
        }
    }

    #[test]
    fn test_unlock_option_view_from_contract() {
        let option = ITreasury::UnlockOption {
            id: 1,
            name: "90 Day Lock".to_string(),
            description: "90 day lock period with 100% conversion".to_string(),
            cliffSeconds: 7_776_000,
            conversionRatePercentage: 100,
        };
        let view = UnlockOptionView::from(&option);

        assert_eq!(view.id, 1);
        assert_eq!(view.cliff_seconds, 7_776_000);
        assert_eq!(view.conversion_rate_percentage, 100);
    }

    #[test]
    fn test_unlock_view_formats_amounts() {
        let view = UnlockView::from(&unlock(0xaa, false));

        assert_eq!(view.source_amount, "2.50");
        assert_eq!(view.target_amount, "1.25");
        assert_eq!(view.source_amount_raw, "2500000000000000000");
        assert!(view.id.starts_with("0xaaaa"));
        assert!(!view.fulfilled);
    }

    #[test]
    fn test_merge_unlocks_orders_unfulfilled_first() {
        let pending = vec![unlock(0x01, false)];
        let done = vec![unlock(0x02, true), unlock(0x03, true)];

        let merged = merge_unlocks(Some(&pending), Some(&done));
        assert_eq!(merged.len(), 3);
        assert!(!merged[0].fulfilled);
        assert!(merged[1].fulfilled && merged[2].fulfilled);

        assert!(merge_unlocks(None, None).is_empty());
        assert_eq!(merge_unlocks(None, Some(&done)).len(), 2);
    }
}
