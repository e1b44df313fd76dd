//! Progress model of the add-liquidity sequence.
//!
//! The sequence runs `deposit(from)`, `deposit(to)` and `add_liquidity` in that
//! order. [`Stage`] names the number of calls that completed, [`StageTracker`]
//! publishes it so views can render progress while the sequence is running.
use strum_macros::Display;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Stage {
    #[default]
    Idle = 0,
    FromDeposited = 1,
    ToDeposited = 2,
    LiquidityAdded = 3,
}

impl Stage {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage reached after the next call completes. `None` once liquidity is added.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::FromDeposited),
            Stage::FromDeposited => Some(Stage::ToDeposited),
            Stage::ToDeposited => Some(Stage::LiquidityAdded),
            Stage::LiquidityAdded => None,
        }
    }
}

/// Publishes the current [`Stage`] to any number of subscribers.
#[derive(Debug)]
pub struct StageTracker {
    sender: watch::Sender<Stage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Stage::Idle);
        Self { sender }
    }

    pub fn current(&self) -> Stage {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.sender.subscribe()
    }

    /// Moves to the next stage and returns it. Saturates at [`Stage::LiquidityAdded`].
    pub fn advance(&self) -> Stage {
        let mut reached = Stage::LiquidityAdded;
        self.sender.send_modify(|stage| {
            if let Some(next) = stage.next() {
                *stage = next;
            }
            reached = *stage;
        });
        reached
    }

    pub fn reset(&self) {
        self.sender.send_replace(Stage::Idle);
    }
}
