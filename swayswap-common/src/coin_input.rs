//! Form state of a single coin amount field.
use strum_macros::Display;

use crate::{
    models::{Amount, Coin},
    units::UnitsError,
};

/// Which of the two inputs of a pair form a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum Side {
    From,
    To,
}

/// Amount entered for a coin, checked against the wallet balance.
///
/// Every mutation (amount edit, coin selection, balance refresh) recomputes
/// `has_enough_balance`. A zero amount is treated like a missing one.
#[derive(Debug, Clone)]
pub struct CoinInput {
    coin: Coin,
    text: String,
    amount: Option<Amount>,
    parse_error: Option<UnitsError>,
    balance: Amount,
    gas_fee: Amount,
    has_enough_balance: bool,
}

impl CoinInput {
    pub fn new(coin: Coin, balance: Amount) -> Self {
        let mut input = Self {
            coin,
            text: String::new(),
            amount: None,
            parse_error: None,
            balance,
            gas_fee: 0,
            has_enough_balance: true,
        };
        input.recompute();
        input
    }

    /// Reserves `gas_fee` base units on top of the entered amount.
    pub fn with_gas_fee(mut self, gas_fee: Amount) -> Self {
        self.gas_fee = gas_fee;
        self.recompute();
        self
    }

    pub fn set_amount(&mut self, text: &str) {
        self.text = text.to_string();
        self.parse();
        self.recompute();
    }

    /// Selects another coin. The entered text is kept and re-read with the new
    /// coin's decimals.
    pub fn set_coin(&mut self, coin: Coin, balance: Amount) {
        self.coin = coin;
        self.balance = balance;
        self.parse();
        self.recompute();
    }

    pub fn set_balance(&mut self, balance: Amount) {
        self.balance = balance;
        self.recompute();
    }

    pub fn coin(&self) -> &Coin {
        &self.coin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn parse_error(&self) -> Option<&UnitsError> {
        self.parse_error.as_ref()
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn gas_fee(&self) -> Amount {
        self.gas_fee
    }

    pub fn has_enough_balance(&self) -> bool {
        self.has_enough_balance
    }

    fn parse(&mut self) {
        if self.text.trim().is_empty() {
            self.amount = None;
            self.parse_error = None;
            return;
        }
        match self.coin.parse_amount(&self.text) {
            Ok(0) => {
                self.amount = None;
                self.parse_error = None;
            }
            Ok(amount) => {
                self.amount = Some(amount);
                self.parse_error = None;
            }
            Err(e) => {
                self.amount = None;
                self.parse_error = Some(e);
            }
        }
    }

    fn recompute(&mut self) {
        self.has_enough_balance = match self.amount {
            None => true,
            Some(amount) => amount
                .checked_add(self.gas_fee)
                .is_some_and(|total| total <= self.balance),
        };
    }
}
