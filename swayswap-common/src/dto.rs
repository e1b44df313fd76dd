//! Data Transfer Objects (or structs)
//!
//! These structs serialise and deserialize messages exchanged with the contract
//! gateway. They should be very simple and ideally not contain any business logic.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Address, Amount, AssetId, ContractId, PoolInfo, TxId};

/// Message the gateway sends when the wallet cannot cover a forwarded amount.
pub const NOT_ENOUGH_COINS: &str = "enough coins could not be found";

/// Assets forwarded along with a contract call, `forward: [amount, asset_id]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallForward {
    pub amount: Amount,
    pub asset_id: AssetId,
}

impl CallForward {
    pub fn new(amount: Amount, asset_id: &AssetId) -> Self {
        Self { amount, asset_id: asset_id.clone() }
    }
}

/// Transaction level parameters of a contract call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParams {
    /// Number of outputs whose recipient is decided by the contract at runtime.
    pub variable_outputs: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInfoRequestBody {
    pub contract_id: ContractId,
}

pub type GetInfoRequestResponse = PoolInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequestBody {
    pub contract_id: ContractId,
    pub forward: CallForward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityRequestBody {
    pub contract_id: ContractId,
    pub min_liquidity: Amount,
    pub max_tokens: Amount,
    pub deadline: u64,
    pub tx_params: TxParams,
}

/// Response of every state changing contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction_id: TxId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWalletRequestBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWalletRequestResponse {
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesRequestBody {
    /// Restricts the response to these assets. All balances are returned if empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_ids: Vec<AssetId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset_id: AssetId,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesRequestResponse {
    pub balances: Vec<AssetBalance>,
}

impl BalancesRequestResponse {
    /// Balances keyed by asset id. Assets missing from the response are absent.
    pub fn into_map(self) -> HashMap<AssetId, Amount> {
        self.balances
            .into_iter()
            .map(|b| (b.asset_id, b.amount))
            .collect()
    }
}

/// A single error reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
}

/// Body of every failed gateway response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ResponseError>,
}
