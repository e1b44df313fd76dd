use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use swayswap_common::{
    coin_input::CoinInput,
    models::{AssetId, Coin, ContractId},
    stage::{Stage, StageTracker},
    Bytes,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_appender::rolling;

use crate::{
    add_liquidity::{confirm_state, AddLiquidity},
    config::ClientConfig,
    notify::{ChannelNavigator, ConsoleNotifier, Page},
    pool_info::PoolInfoReader,
    rpc::{HttpGatewayClient, HttpGatewayClientOptions, WalletProvider},
    view::{BalancesView, ReservesView, StepList},
};

/// Native asset fee reserved on top of the "from" amount.
const FROM_GAS_FEE: u64 = 1;

/// SwaySwap Client CLI - Create a wallet and provide liquidity to a SwaySwap pool
///
/// All chain interaction goes through a contract gateway that holds the wallet keys.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
struct CliArgs {
    /// Contract gateway URL. Example: http://localhost:4000
    #[clap(long, default_value = "http://localhost:4000", env = "SWAYSWAP_GATEWAY_URL")]
    gateway_url: String,

    /// Gateway API key. Can be set with SWAYSWAP_AUTH_TOKEN env variable.
    #[clap(short = 'k', long, env = "SWAYSWAP_AUTH_TOKEN")]
    auth_key: Option<String>,

    /// Exchange contract id, overrides the one from the config file.
    #[clap(long, env = "SWAYSWAP_CONTRACT_ID")]
    contract_id: Option<String>,

    /// Path to a YAML config file. Built-in defaults are used if omitted.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Logging folder path.
    #[clap(long, default_value = "logs")]
    log_folder: String,

    /// Enable verbose logging.
    #[clap(long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Wallet management
    #[clap(subcommand)]
    Wallet(WalletCommand),
    /// Show the balances of the configured coins
    Assets,
    /// Pool queries and liquidity provision
    #[clap(subcommand)]
    Pool(PoolCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum WalletCommand {
    /// Create a new wallet and show its assets
    Create,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum PoolCommand {
    /// Show the pool reserves and prices
    Info,
    /// Poll the pool reserves and print every change
    Watch {
        /// Polling interval in seconds
        #[clap(long, default_value = "10")]
        interval: u64,
        /// Stop after this many updates
        #[clap(short = 'n', long)]
        max_updates: Option<usize>,
    },
    /// Deposit both coins and add them as liquidity
    AddLiquidity {
        /// Amount of the "from" coin, as a decimal string
        #[clap(long)]
        from_amount: String,
        /// Amount of the "to" coin, as a decimal string
        #[clap(long)]
        to_amount: String,
        #[clap(long, default_value = "ETH")]
        from_coin: String,
        #[clap(long, default_value = "DAI")]
        to_coin: String,
    },
}

impl CliArgs {
    fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Pool(PoolCommand::Watch { interval: 0, .. }) => {
                Err("interval must be at least one second".to_string())
            }
            Command::Pool(PoolCommand::AddLiquidity { from_coin, to_coin, .. })
                if from_coin.eq_ignore_ascii_case(to_coin) =>
            {
                Err("from_coin and to_coin must differ".to_string())
            }
            _ => Ok(()),
        }
    }
}

pub async fn run_cli() -> anyhow::Result<()> {
    // Parse CLI Args
    let args: CliArgs = CliArgs::parse();
    args.validate()
        .map_err(|e| anyhow!(e))?;

    // Setup Logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let (non_blocking, _guard) =
        tracing_appender::non_blocking(rolling::never(&args.log_folder, "swayswap_client.log"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(non_blocking)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up logging subscriber")?;

    let config = ClientConfig::load(args.config.as_deref())?;
    info!(gateway_url = %args.gateway_url, "Starting swayswap client");

    run(args, config).await
}

/// Everything the commands need, wired once.
struct App {
    config: ClientConfig,
    gateway: Arc<HttpGatewayClient>,
    navigator: ChannelNavigator,
    pages: mpsc::UnboundedReceiver<Page>,
}

async fn run(args: CliArgs, config: ClientConfig) -> anyhow::Result<()> {
    let contract_id = resolve_contract_id(args.contract_id.as_deref(), &config)?;
    let requires_contract = matches!(args.command, Command::Pool(_));
    let contract_id = match (contract_id, requires_contract) {
        (Some(id), _) => id,
        (None, true) => bail!("No contract id given, use --contract-id or the config file"),
        // Wallet endpoints don't look at the contract id.
        (None, false) => ContractId::zero(32),
    };

    let options = HttpGatewayClientOptions::new()
        .with_auth_key(args.auth_key.clone())
        .with_timeout(config.request_timeout())
        .with_retry(config.retry.clone());
    let gateway = Arc::new(HttpGatewayClient::new(&args.gateway_url, &contract_id, options)?);
    let (navigator, pages) = ChannelNavigator::new();
    let mut app = App { config, gateway, navigator, pages };

    match args.command {
        Command::Wallet(WalletCommand::Create) => create_wallet(&mut app).await,
        Command::Assets => render_page(&app, Page::Assets).await,
        Command::Pool(PoolCommand::Info) => pool_info(&app).await,
        Command::Pool(PoolCommand::Watch { interval, max_updates }) => {
            watch_pool(&app, Duration::from_secs(interval), max_updates).await
        }
        Command::Pool(PoolCommand::AddLiquidity { from_amount, to_amount, from_coin, to_coin }) => {
            add_liquidity(&mut app, &from_amount, &to_amount, &from_coin, &to_coin).await
        }
    }
}

fn resolve_contract_id(
    arg: Option<&str>,
    config: &ClientConfig,
) -> anyhow::Result<Option<ContractId>> {
    match arg {
        Some(raw) => Ok(Some(
            raw.parse::<Bytes>()
                .with_context(|| format!("Invalid contract id {raw}"))?,
        )),
        None => Ok(config.contract_id.clone()),
    }
}

async fn create_wallet(app: &mut App) -> anyhow::Result<()> {
    let setup = crate::wallet_setup::WalletSetup::new(
        app.gateway.clone(),
        Arc::new(app.navigator.clone()),
    );
    let result = setup.create_wallet().await;
    if let Ok(address) = &result {
        println!("Wallet: {address}");
    }
    render_pending_pages(app).await?;
    result
        .map(|_| ())
        .context("Failed to create wallet")
}

async fn pool_info(app: &App) -> anyhow::Result<()> {
    let reader = PoolInfoReader::new(app.gateway.clone(), app.config.pool_info_ttl());
    let info = reader.get().await?;
    let (eth, token) = pool_coins(&app.config)?;
    print!("{}", ReservesView::new(&info, eth, token));
    Ok(())
}

async fn watch_pool(
    app: &App,
    interval: Duration,
    max_updates: Option<usize>,
) -> anyhow::Result<()> {
    let reader = Arc::new(PoolInfoReader::new(app.gateway.clone(), app.config.pool_info_ttl()));
    let (eth, token) = pool_coins(&app.config)?;
    let (mut updates, handle) = reader.watch(interval);

    let mut received = 0;
    while updates.changed().await.is_ok() {
        let info = *updates.borrow_and_update();
        if let Some(info) = info {
            print!("{}", ReservesView::new(&info, eth, token));
            received += 1;
            if max_updates.is_some_and(|max| received >= max) {
                info!(received, "Reached max updates, stopping");
                break;
            }
        }
    }
    drop(updates);
    handle.await?;
    Ok(())
}

async fn add_liquidity(
    app: &mut App,
    from_amount: &str,
    to_amount: &str,
    from_coin: &str,
    to_coin: &str,
) -> anyhow::Result<()> {
    let from_coin = lookup_coin(&app.config, from_coin)?;
    let to_coin = lookup_coin(&app.config, to_coin)?;
    let (mut from, mut to) = coin_inputs(&from_coin, from_amount, &to_coin, to_amount);
    let balances = app
        .gateway
        .get_balances(&[from_coin.asset_id.clone(), to_coin.asset_id.clone()])
        .await?;
    for input in [&mut from, &mut to] {
        let balance = balances
            .get(&input.coin().asset_id)
            .copied()
            .unwrap_or_default();
        input.set_balance(balance);
        debug!(
            coin = %input.coin(),
            balance = input.balance(),
            gas_fee = input.gas_fee(),
            enough = input.has_enough_balance(),
            "Wallet balance"
        );
    }

    let reader = Arc::new(PoolInfoReader::new(app.gateway.clone(), app.config.pool_info_ttl()));
    match reader.get().await {
        Ok(info) => {
            let (eth, token) = pool_coins(&app.config)?;
            print!("{}", ReservesView::new(&info, eth, token));
        }
        Err(err) => warn!(?err, "Could not load pool info"),
    }

    // Submit reports a disabled confirm through the notifier.
    let confirm = confirm_state(&from, &to);
    info!(ready = confirm.is_ready(), label = confirm.label(), "Confirm state");

    let tracker = Arc::new(StageTracker::new());
    let mut stage = tracker.subscribe();
    let flow = AddLiquidity::new(
        app.gateway.clone(),
        Arc::new(ConsoleNotifier),
        Arc::new(app.navigator.clone()),
        reader,
    )
    .with_parameters(app.config.add_liquidity)
    .with_stage_tracker(tracker);

    let steps = StepList::new(&from_coin, &to_coin);
    let completed_steps = steps
        .clone()
        .with_stage(Stage::LiquidityAdded, false);
    let progress = tokio::spawn(async move {
        while stage.changed().await.is_ok() {
            let current = *stage.borrow_and_update();
            debug!(%current, "Stage changed");
            if current == Stage::Idle {
                continue;
            }
            print!("{}", steps.clone().with_stage(current, true));
        }
    });

    let result = flow.submit(&from, &to).await;
    // Closes the stage channel so the progress printer finishes.
    drop(flow);
    progress.await?;

    match &result {
        Ok(_) => print!("{completed_steps}"),
        Err(err) => {
            for deposit in err.completed_deposits() {
                println!(
                    "Left in contract: {} {} (tx {})",
                    deposit.coin.format_amount(deposit.amount),
                    deposit.coin,
                    deposit.transaction_id
                );
            }
        }
    }
    render_pending_pages(app).await?;
    result?;
    Ok(())
}

/// Form state for both sides. Balances start at zero until the wallet is read.
///
/// An amount that does not parse leaves the input empty, so submitting reports it
/// as missing.
fn coin_inputs(
    from_coin: &Coin,
    from_amount: &str,
    to_coin: &Coin,
    to_amount: &str,
) -> (CoinInput, CoinInput) {
    let mut from = CoinInput::new(from_coin.clone(), 0).with_gas_fee(FROM_GAS_FEE);
    from.set_amount(from_amount);
    let mut to = CoinInput::new(to_coin.clone(), 0);
    to.set_amount(to_amount);
    for input in [&from, &to] {
        if let Some(err) = input.parse_error() {
            warn!(coin = %input.coin(), text = input.text(), %err, "Invalid amount");
        }
    }
    (from, to)
}

fn lookup_coin(config: &ClientConfig, name: &str) -> anyhow::Result<Coin> {
    config
        .coin(name)
        .cloned()
        .ok_or_else(|| anyhow!("Unknown coin {name}"))
}

/// The first configured coin is the pool's native side, the second its token.
fn pool_coins(config: &ClientConfig) -> anyhow::Result<(&Coin, &Coin)> {
    match config.coins.as_slice() {
        [eth, token, ..] => Ok((eth, token)),
        _ => bail!("At least two coins must be configured"),
    }
}

async fn render_pending_pages(app: &mut App) -> anyhow::Result<()> {
    while let Ok(page) = app.pages.try_recv() {
        render_page(app, page).await?;
    }
    Ok(())
}

async fn render_page(app: &App, page: Page) -> anyhow::Result<()> {
    println!("== {page} ==");
    match page {
        Page::Assets | Page::Wallet => {
            let asset_ids: Vec<AssetId> = app
                .config
                .coins
                .iter()
                .map(|c| c.asset_id.clone())
                .collect();
            let balances = app
                .gateway
                .get_balances(&asset_ids)
                .await?;
            let rows = app
                .config
                .coins
                .iter()
                .map(|c| {
                    (
                        c.clone(),
                        balances
                            .get(&c.asset_id)
                            .copied()
                            .unwrap_or_default(),
                    )
                })
                .collect();
            print!("{}", BalancesView::new(rows));
        }
        Page::AddLiquidity => {}
    }
    Ok(())
}
