//! User facing side effects of the flows: notifications and page navigation.
use std::fmt;

#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Assets,
    Wallet,
    AddLiquidity,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Assets => "/assets",
            Page::Wallet => "/wallet",
            Page::AddLiquidity => "/pool/add-liquidity",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[cfg_attr(test, automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, page: Page);
}

/// Prints notifications to the terminal and mirrors them into the log.
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        info!(message, "Notification");
        println!("✔ {message}");
    }

    fn error(&self, message: &str) {
        error!(message, "Notification");
        eprintln!("✘ {message}");
    }
}

/// Forwards navigation requests to whoever renders pages.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<Page>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Page>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, page: Page) {
        info!(%page, "Navigate");
        if self.sender.send(page).is_err() {
            warn!(%page, "No page renderer is listening");
        }
    }
}
