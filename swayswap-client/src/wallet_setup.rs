use std::sync::Arc;

use swayswap_common::models::Address;
use tracing::{error, info, instrument};

use crate::{
    notify::{Navigator, Page},
    rpc::{GatewayError, WalletProvider},
};

/// First run flow: creates a wallet and moves on to the asset page.
pub struct WalletSetup {
    wallet: Arc<dyn WalletProvider>,
    navigator: Arc<dyn Navigator>,
}

impl WalletSetup {
    pub fn new(wallet: Arc<dyn WalletProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self { wallet, navigator }
    }

    /// Navigates to the asset page whether or not the wallet could be created.
    #[instrument(skip(self))]
    pub async fn create_wallet(&self) -> Result<Address, GatewayError> {
        let result = self.wallet.create_wallet().await;
        match &result {
            Ok(address) => info!(%address, "Wallet created"),
            Err(err) => error!(?err, "Wallet creation failed"),
        }
        self.navigator.navigate(Page::Assets);
        result
    }
}
