//! Cached access to the exchange contract's reserves.
use std::{sync::Arc, time::Duration};

use swayswap_common::models::PoolInfo;
use tokio::{sync::watch, task::JoinHandle, time::interval};
use tracing::{debug, warn};

use crate::{
    cache::QueryCache,
    rpc::{ExchangeContract, GatewayError},
};

/// Cache key of the reserves query.
pub const POOL_INFO_QUERY_KEY: &str = "PoolPage-poolInfo";

pub struct PoolInfoReader {
    contract: Arc<dyn ExchangeContract>,
    cache: QueryCache<String, PoolInfo>,
}

impl PoolInfoReader {
    pub fn new(contract: Arc<dyn ExchangeContract>, ttl: Duration) -> Self {
        Self { contract, cache: QueryCache::new("pool_info", 1, ttl) }
    }

    /// Current reserves, served from cache while fresh.
    pub async fn get(&self) -> Result<PoolInfo, GatewayError> {
        let contract = self.contract.clone();
        let info = self
            .cache
            .get(POOL_INFO_QUERY_KEY.to_string(), |_| async move { contract.get_info().await })
            .await?;
        Ok(*info)
    }

    /// Marks the cached reserves stale.
    pub fn invalidate(&self) {
        self.cache
            .invalidate(&POOL_INFO_QUERY_KEY.to_string());
    }

    /// Polls the reserves every `period` and publishes changes.
    ///
    /// The receiver starts with `None` until the first successful read. Failed reads
    /// are logged and the last value is kept. The task stops once every receiver
    /// has been dropped.
    pub fn watch(
        self: &Arc<Self>,
        period: Duration,
    ) -> (watch::Receiver<Option<PoolInfo>>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let reader = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => break,
                }
                reader.invalidate();
                match reader.get().await {
                    Ok(info) => {
                        tx.send_if_modified(|current| {
                            if *current == Some(info) {
                                return false;
                            }
                            *current = Some(info);
                            true
                        });
                    }
                    Err(err) => warn!(?err, "Failed to refresh pool info"),
                }
            }
            debug!("Pool info watcher stopped");
        });
        (rx, handle)
    }
}
