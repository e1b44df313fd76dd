pub mod coin;
pub mod pool;

use crate::Bytes;

/// Amount of an asset, expressed in the asset's smallest unit.
pub type Amount = u64;

/// Identifier of a native asset on the chain.
pub type AssetId = Bytes;

/// Identifier of a deployed contract.
pub type ContractId = Bytes;

/// Address literal type to uniquely identify a wallet.
pub type Address = Bytes;

/// Transaction id literal type as returned by the gateway after submission.
pub type TxId = Bytes;

/// Number of decimals used by all assets traded on the exchange contract.
pub const DECIMAL_UNITS: u32 = 9;

pub use coin::Coin;
pub use pool::{PoolInfo, PriceRatio};
