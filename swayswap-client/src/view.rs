//! Plain text rendering of the client's pages.
use std::fmt::{self, Display, Formatter};

use swayswap_common::{
    models::{Amount, Coin, PoolInfo, DECIMAL_UNITS},
    stage::Stage,
};

/// Progress of the add-liquidity sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepList {
    steps: [String; Stage::COUNT],
    stage: Stage,
    loading: bool,
}

impl StepList {
    pub fn new(from: &Coin, to: &Coin) -> Self {
        Self {
            steps: [
                format!("Deposit: {}", from.name),
                format!("Deposit: {}", to.name),
                "Provide liquidity".to_string(),
                "Done".to_string(),
            ],
            stage: Stage::Idle,
            loading: false,
        }
    }

    pub fn with_stage(mut self, stage: Stage, loading: bool) -> Self {
        self.stage = stage;
        self.loading = loading;
        self
    }
}

impl Display for StepList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // The last stage has no call behind it, reaching it finishes the list.
        let finished = self.stage.index() + 1 == Stage::COUNT;
        for (index, step) in self.steps.iter().enumerate() {
            let marker = if finished || self.stage.index() > index {
                "[x]"
            } else if self.stage.index() == index && self.loading {
                "[~]"
            } else {
                "[ ]"
            };
            writeln!(f, "{marker} {step}")?;
        }
        Ok(())
    }
}

/// Reserves panel of the pool page.
///
/// Ratio lines are only shown when both reserves are non-zero.
#[derive(Debug, Clone)]
pub struct ReservesView<'a> {
    info: &'a PoolInfo,
    eth: &'a Coin,
    token: &'a Coin,
}

impl<'a> ReservesView<'a> {
    pub fn new(info: &'a PoolInfo, eth: &'a Coin, token: &'a Coin) -> Self {
        Self { info, eth, token }
    }
}

impl Display for ReservesView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reserves")?;
        writeln!(f, "{}: {}", self.eth.name, self.eth.format_amount(self.info.eth_reserve))?;
        writeln!(f, "{}: {}", self.token.name, self.token.format_amount(self.info.token_reserve))?;
        if let (Some(eth_price), Some(token_price)) =
            (self.info.eth_price(DECIMAL_UNITS), self.info.token_price(DECIMAL_UNITS))
        {
            writeln!(f, "{}/{}: {eth_price}", self.eth.name, self.token.name)?;
            writeln!(f, "{}/{}: {token_price}", self.token.name, self.eth.name)?;
        }
        Ok(())
    }
}

/// Wallet balances of the configured coins.
#[derive(Debug, Clone, Default)]
pub struct BalancesView {
    rows: Vec<(Coin, Amount)>,
}

impl BalancesView {
    pub fn new(rows: Vec<(Coin, Amount)>) -> Self {
        Self { rows }
    }
}

impl Display for BalancesView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No assets");
        }
        for (coin, amount) in &self.rows {
            writeln!(f, "{coin}: {}", coin.format_amount(*amount))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_reserves_with_liquidity() {
        let info = PoolInfo::new(200, 100);

        let rendered = ReservesView::new(&info, &Coin::eth(), &Coin::dai()).to_string();

        assert_eq!(
            rendered,
            "Reserves\nETH: 0.0000002\nDAI: 0.0000001\nETH/DAI: 0.500000\nDAI/ETH: 2.000000\n"
        );
    }

    #[test]
    fn test_reserves_without_liquidity() {
        let info = PoolInfo::new(0, 0);

        let rendered = ReservesView::new(&info, &Coin::eth(), &Coin::dai()).to_string();

        assert_eq!(rendered, "Reserves\nETH: 0.0\nDAI: 0.0\n");
        assert!(!rendered.contains('/'));
    }

    #[test]
    fn test_step_list_progress() {
        let steps = StepList::new(&Coin::eth(), &Coin::dai()).with_stage(Stage::FromDeposited, true);

        assert_eq!(
            steps.to_string(),
            "[x] Deposit: ETH\n[~] Deposit: DAI\n[ ] Provide liquidity\n[ ] Done\n"
        );
    }

    #[test]
    fn test_step_list_idle() {
        let steps = StepList::new(&Coin::eth(), &Coin::dai());

        assert_eq!(
            steps.to_string(),
            "[ ] Deposit: ETH\n[ ] Deposit: DAI\n[ ] Provide liquidity\n[ ] Done\n"
        );
    }

    #[test]
    fn test_step_list_completed() {
        let steps =
            StepList::new(&Coin::eth(), &Coin::dai()).with_stage(Stage::LiquidityAdded, false);

        assert_eq!(
            steps.to_string(),
            "[x] Deposit: ETH\n[x] Deposit: DAI\n[x] Provide liquidity\n[x] Done\n"
        );
    }

    #[test]
    fn test_balances() {
        let view = BalancesView::new(vec![(Coin::eth(), 1_500_000_000), (Coin::dai(), 0)]);

        assert_eq!(view.to_string(), "ETH: 1.5\nDAI: 0.0\n");
        assert_eq!(BalancesView::default().to_string(), "No assets\n");
    }
}
