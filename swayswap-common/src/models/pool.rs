use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::Amount;

/// Number of fractional digits shown for pool prices.
pub const PRICE_DISPLAY_DECIMALS: u32 = 6;

/// Snapshot of the exchange contract's reserves as returned by `get_info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub eth_reserve: Amount,
    pub token_reserve: Amount,
    #[serde(default)]
    pub lp_token_supply: Amount,
}

impl PoolInfo {
    pub fn new(eth_reserve: Amount, token_reserve: Amount) -> Self {
        Self { eth_reserve, token_reserve, lp_token_supply: 0 }
    }

    /// Price of one unit of ETH expressed in the pool token ("ETH/DAI").
    pub fn eth_price(&self, decimals: u32) -> Option<PriceRatio> {
        PriceRatio::new(self.token_reserve, self.eth_reserve, decimals)
    }

    /// Price of one unit of the pool token expressed in ETH ("DAI/ETH").
    pub fn token_price(&self, decimals: u32) -> Option<PriceRatio> {
        PriceRatio::new(self.eth_reserve, self.token_reserve, decimals)
    }
}

/// Fixed point ratio `quote / base` scaled by `10^decimals`.
///
/// Both reserves must share the same scale, which holds for all assets traded on
/// the contract. Formatting truncates to [`PRICE_DISPLAY_DECIMALS`] digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRatio {
    scaled: BigUint,
    decimals: u32,
}

impl PriceRatio {
    /// Returns `None` if either side is zero.
    pub fn new(quote: Amount, base: Amount, decimals: u32) -> Option<Self> {
        if quote == 0 || base == 0 {
            return None;
        }
        let one = BigUint::from(10u32).pow(decimals);
        let scaled = BigUint::from(quote) * one / BigUint::from(base);
        Some(Self { scaled, decimals })
    }

    /// The ratio truncated to [`PRICE_DISPLAY_DECIMALS`] digits, as an integer
    /// scaled by `10^PRICE_DISPLAY_DECIMALS`.
    pub fn truncated(&self) -> BigUint {
        let one = BigUint::from(10u32).pow(self.decimals);
        &self.scaled * BigUint::from(10u32).pow(PRICE_DISPLAY_DECIMALS) / one
    }
}

impl fmt::Display for PriceRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let truncated = self.truncated();
        let unit = BigUint::from(10u32).pow(PRICE_DISPLAY_DECIMALS);
        let whole = &truncated / &unit;
        let fraction = (&truncated % &unit).to_string();
        write!(f, "{whole}.{fraction:0>width$}", width = PRICE_DISPLAY_DECIMALS as usize)
    }
}
