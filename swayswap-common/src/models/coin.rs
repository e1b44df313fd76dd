use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use super::{Amount, AssetId, DECIMAL_UNITS};
use crate::units::{format_units, parse_units, UnitsError};

/// Descriptor of a tradeable asset.
///
/// Coins are identified by their `asset_id`; two coins with the same id but a
/// different display name are considered equal.
#[derive(Debug, Clone, Deserialize, Serialize, Eq)]
pub struct Coin {
    pub name: String,
    pub asset_id: AssetId,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_decimals() -> u32 {
    DECIMAL_UNITS
}

impl Coin {
    pub fn new(name: &str, asset_id: &AssetId, decimals: u32) -> Self {
        Self { name: name.to_string(), asset_id: asset_id.clone(), decimals }
    }

    /// Native asset of the chain. Its asset id is all zeros.
    pub fn eth() -> Self {
        Self::new("ETH", &AssetId::zero(32), DECIMAL_UNITS)
    }

    /// Token side of the demo pool.
    pub fn dai() -> Self {
        Self::new(
            "DAI",
            &AssetId::from([
                0x0c, 0xfa, 0xbd, 0xe7, 0xbb, 0xe5, 0x8d, 0x25,
                0x3c, 0xf3, 0x10, 0x3d, 0x8f, 0x55, 0xd2, 0x69,
                0x87, 0xb3, 0xdc, 0x46, 0x91, 0x20, 0x5b, 0x92,
                0x99, 0xac, 0x68, 0x26, 0xc6, 0x13, 0xa2, 0xe2,
            ]),
            DECIMAL_UNITS,
        )
    }

    /// Parses a user supplied decimal string into base units of this coin.
    pub fn parse_amount(&self, value: &str) -> Result<Amount, UnitsError> {
        parse_units(value, self.decimals)
    }

    pub fn format_amount(&self, value: Amount) -> String {
        format_units(value, self.decimals)
    }
}

impl PartialEq for Coin {
    fn eq(&self, other: &Self) -> bool {
        self.asset_id == other.asset_id
    }
}

impl Hash for Coin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.asset_id.hash(state);
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
