//! # Add liquidity
//!
//! Providing liquidity takes three contract calls that are awaited strictly in order:
//!
//! 1. `deposit` of the "from" amount
//! 2. `deposit` of the "to" amount
//! 3. `add_liquidity`, which turns both deposits into pool shares
//!
//! Each completed call advances the shared [`StageTracker`]. The sequence is not
//! atomic: if a later call fails, earlier deposits stay in the contract. The error
//! returned in that case lists them.
use std::sync::Arc;

use serde::Deserialize;
use swayswap_common::{
    coin_input::{CoinInput, Side},
    dto::{CallForward, TxParams, NOT_ENOUGH_COINS},
    models::{Amount, Coin, TxId},
    stage::StageTracker,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    notify::{Navigator, Notifier, Page},
    pool_info::PoolInfoReader,
    rpc::{ExchangeContract, GatewayError},
};

pub const POOL_CREATED: &str = "New pool created!";

/// Arguments of the final `add_liquidity` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddLiquidityParameters {
    pub min_liquidity: Amount,
    pub deadline: u64,
    pub variable_outputs: u8,
}

impl Default for AddLiquidityParameters {
    fn default() -> Self {
        Self { min_liquidity: 1, deadline: 1000, variable_outputs: 1 }
    }
}

/// A deposit that reached the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub coin: Coin,
    pub amount: Amount,
    pub transaction_id: TxId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityReceipt {
    pub deposits: Vec<Deposit>,
    pub transaction_id: TxId,
}

#[derive(Error, Debug)]
pub enum AddLiquidityError {
    #[error("\"{0}Amount\" is required")]
    MissingAmount(Side),
    #[error("Insufficient {0} balance")]
    InsufficientBalance(Coin),
    #[error("Not enough balance in your wallet to create this pool.")]
    NotEnoughCoins { completed: Vec<Deposit> },
    #[error("Failed to add liquidity: {source}")]
    Contract {
        #[source]
        source: GatewayError,
        completed: Vec<Deposit>,
    },
}

impl AddLiquidityError {
    fn from_gateway(source: GatewayError, completed: Vec<Deposit>) -> Self {
        if source.first_message() == Some(NOT_ENOUGH_COINS) {
            AddLiquidityError::NotEnoughCoins { completed }
        } else {
            AddLiquidityError::Contract { source, completed }
        }
    }

    /// Deposits that remain in the contract after the failure.
    pub fn completed_deposits(&self) -> &[Deposit] {
        match self {
            AddLiquidityError::NotEnoughCoins { completed } |
            AddLiquidityError::Contract { completed, .. } => completed,
            _ => &[],
        }
    }
}

/// State of the confirm button below the two coin inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmState {
    Disabled(String),
    Ready(String),
}

impl ConfirmState {
    pub fn label(&self) -> &str {
        match self {
            ConfirmState::Disabled(label) | ConfirmState::Ready(label) => label,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ConfirmState::Ready(_))
    }
}

pub fn confirm_state(from: &CoinInput, to: &CoinInput) -> ConfirmState {
    for input in [from, to] {
        if !input.has_enough_balance() {
            return ConfirmState::Disabled(
                AddLiquidityError::InsufficientBalance(input.coin().clone()).to_string(),
            );
        }
    }
    ConfirmState::Ready("Confirm".to_string())
}

/// Checks the inputs and returns both amounts.
fn validate(from: &CoinInput, to: &CoinInput) -> Result<(Amount, Amount), AddLiquidityError> {
    let from_amount = from
        .amount()
        .ok_or(AddLiquidityError::MissingAmount(Side::From))?;
    let to_amount = to
        .amount()
        .ok_or(AddLiquidityError::MissingAmount(Side::To))?;
    for input in [from, to] {
        if !input.has_enough_balance() {
            return Err(AddLiquidityError::InsufficientBalance(input.coin().clone()));
        }
    }
    Ok((from_amount, to_amount))
}

pub struct AddLiquidity {
    contract: Arc<dyn ExchangeContract>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    pool_info: Arc<PoolInfoReader>,
    stage: Arc<StageTracker>,
    parameters: AddLiquidityParameters,
}

impl AddLiquidity {
    pub fn new(
        contract: Arc<dyn ExchangeContract>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        pool_info: Arc<PoolInfoReader>,
    ) -> Self {
        Self {
            contract,
            notifier,
            navigator,
            pool_info,
            stage: Arc::new(StageTracker::new()),
            parameters: AddLiquidityParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: AddLiquidityParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Shares `stage` with observers such as a progress view.
    pub fn with_stage_tracker(mut self, stage: Arc<StageTracker>) -> Self {
        self.stage = stage;
        self
    }

    /// Validates both inputs and runs the call sequence.
    ///
    /// Every outcome is reported through the notifier. On success the cached pool info
    /// is invalidated and the flow navigates to the wallet page. The stage is back at
    /// idle once this returns.
    #[instrument(skip_all, fields(from = %from.coin(), to = %to.coin()))]
    pub async fn submit(
        &self,
        from: &CoinInput,
        to: &CoinInput,
    ) -> Result<LiquidityReceipt, AddLiquidityError> {
        let result = match validate(from, to) {
            Ok((from_amount, to_amount)) => {
                self.execute(from.coin(), from_amount, to.coin(), to_amount)
                    .await
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(receipt) => {
                info!(transaction_id = %receipt.transaction_id, "Liquidity added");
                self.notifier.success(POOL_CREATED);
                self.pool_info.invalidate();
                self.navigator.navigate(Page::Wallet);
            }
            Err(err) => {
                warn!(
                    ?err,
                    stage = %self.stage.current(),
                    completed = err.completed_deposits().len(),
                    "Add liquidity failed"
                );
                self.notifier.error(&err.to_string());
            }
        }
        self.stage.reset();
        result
    }

    async fn execute(
        &self,
        from_coin: &Coin,
        from_amount: Amount,
        to_coin: &Coin,
        to_amount: Amount,
    ) -> Result<LiquidityReceipt, AddLiquidityError> {
        let mut deposits = Vec::with_capacity(2);
        for (coin, amount) in [(from_coin, from_amount), (to_coin, to_amount)] {
            let forward = CallForward::new(amount, &coin.asset_id);
            match self.contract.deposit(&forward).await {
                Ok(transaction_id) => {
                    deposits.push(Deposit { coin: coin.clone(), amount, transaction_id });
                    let stage = self.stage.advance();
                    debug!(%coin, amount, %stage, "Deposit completed");
                }
                Err(err) => return Err(AddLiquidityError::from_gateway(err, deposits)),
            }
        }

        let tx_params = TxParams { variable_outputs: self.parameters.variable_outputs };
        let transaction_id = match self
            .contract
            .add_liquidity(self.parameters.min_liquidity, to_amount, self.parameters.deadline, tx_params)
            .await
        {
            Ok(transaction_id) => transaction_id,
            Err(err) => return Err(AddLiquidityError::from_gateway(err, deposits)),
        };
        let stage = self.stage.advance();
        debug!(%stage, "Liquidity provided");

        Ok(LiquidityReceipt { deposits, transaction_id })
    }
}
