pub mod add_liquidity;
pub mod cache;
pub mod cli;
pub mod config;
pub mod notify;
pub mod pool_info;
pub mod rpc;
pub mod view;
pub mod wallet_setup;

pub use add_liquidity::{AddLiquidity, AddLiquidityError};
pub use pool_info::PoolInfoReader;
pub use rpc::{GatewayError, HttpGatewayClient};
pub use wallet_setup::WalletSetup;

/// Version prefix of every gateway endpoint.
pub const GATEWAY_API_VERSION: &str = "v1";
