//! # Gateway client
//!
//! Typed access to the contract gateway. The gateway wraps the chain SDK: it owns
//! the wallet keys, builds and signs transactions and talks to the node. This module
//! only exposes the exchange contract methods and wallet queries the client needs.
//!
//! Reads (`get_info`, balances) are retried on transient failures. State changing
//! calls are sent exactly once: a deposit that timed out may still have landed on
//! chain, so repeating it could move funds twice.
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use backoff::ExponentialBackoff;
#[cfg(test)]
use mockall::automock;
use reqwest::{header, Client, ClientBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use swayswap_common::{
    dto::{
        AddLiquidityRequestBody, BalancesRequestBody, BalancesRequestResponse, CallForward,
        CreateWalletRequestBody, CreateWalletRequestResponse, DepositRequestBody, ErrorResponse,
        GetInfoRequestBody, GetInfoRequestResponse, ResponseError, TransactionResponse, TxParams,
    },
    models::{Address, Amount, AssetId, ContractId, PoolInfo, TxId},
};
use thiserror::Error;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, instrument, trace, warn};

use crate::{config::RetryConfiguration, GATEWAY_API_VERSION};

#[derive(Error, Debug)]
pub enum GatewayError {
    /// The passed gateway url failed to parse.
    #[error("Failed to parse URL: {0}. Error: {1}")]
    UrlParsing(String, String),

    /// The request data is not correctly formed.
    #[error("Failed to format request: {0}")]
    FormatRequest(String),

    /// Errors forwarded from the HTTP protocol.
    #[error("Unexpected HTTP client error: {0}")]
    HttpClient(String, #[source] reqwest::Error),

    /// The response from the server could not be parsed correctly.
    #[error("Failed to parse response: {0}")]
    ParseResponse(String),

    /// The gateway or the contract refused the request.
    #[error("Request rejected: {}", join_messages(.0))]
    Rejected(Vec<ResponseError>),

    /// Other fatal errors.
    #[error("Fatal error: {0}")]
    Fatal(String),

    #[error("Rate limited until {0:?}")]
    RateLimited(Option<SystemTime>),

    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl GatewayError {
    /// The first message of a rejection, if this is one.
    pub fn first_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected(errors) => errors
                .first()
                .map(|e| e.message.as_str()),
            _ => None,
        }
    }
}

fn join_messages(errors: &[ResponseError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Methods of the exchange contract used by the client.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExchangeContract: Send + Sync {
    /// Reads the current reserves of the pool.
    async fn get_info(&self) -> Result<PoolInfo, GatewayError>;

    /// Moves `forward.amount` of `forward.asset_id` from the wallet into the
    /// contract's escrow.
    async fn deposit(&self, forward: &CallForward) -> Result<TxId, GatewayError>;

    /// Turns the escrowed deposits into pool liquidity.
    async fn add_liquidity(
        &self,
        min_liquidity: Amount,
        max_tokens: Amount,
        deadline: u64,
        tx_params: TxParams,
    ) -> Result<TxId, GatewayError>;
}

/// Wallet operations exposed by the gateway.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Creates a new wallet and makes it the gateway's active wallet.
    async fn create_wallet(&self) -> Result<Address, GatewayError>;

    /// Balances of the active wallet. Assets without balance are reported as zero.
    async fn get_balances(
        &self,
        asset_ids: &[AssetId],
    ) -> Result<HashMap<AssetId, Amount>, GatewayError>;
}

/// Configuration options for HttpGatewayClient
#[derive(Debug, Clone)]
pub struct HttpGatewayClientOptions {
    /// Optional API key for authentication
    pub auth_key: Option<String>,
    /// Timeout applied to every single request
    pub timeout: Duration,
    /// Retry policy for read requests
    pub retry: RetryConfiguration,
}

impl Default for HttpGatewayClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpGatewayClientOptions {
    pub fn new() -> Self {
        Self { auth_key: None, timeout: Duration::from_secs(30), retry: RetryConfiguration::default() }
    }

    /// Set the authentication key
    pub fn with_auth_key(mut self, auth_key: Option<String>) -> Self {
        self.auth_key = auth_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfiguration) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    http_client: Client,
    url: Url,
    contract_id: ContractId,
    retry_after: Arc<RwLock<Option<SystemTime>>>,
    backoff_policy: ExponentialBackoff,
}

impl HttpGatewayClient {
    pub fn new(
        base_uri: &str,
        contract_id: &ContractId,
        options: HttpGatewayClientOptions,
    ) -> Result<Self, GatewayError> {
        let uri = base_uri
            .parse::<Url>()
            .map_err(|e| GatewayError::UrlParsing(base_uri.to_string(), e.to_string()))?;

        // Add default headers
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        let user_agent = format!("swayswap-client-{version}", version = env!("CARGO_PKG_VERSION"));
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&user_agent).map_err(|e| {
                GatewayError::FormatRequest(format!("Invalid user agent format: {e}"))
            })?,
        );

        // Add Authorization if one is given
        if let Some(key) = options.auth_key.as_deref() {
            let mut auth_value = header::HeaderValue::from_str(key).map_err(|e| {
                GatewayError::FormatRequest(format!("Invalid authorization key format: {e}"))
            })?;
            auth_value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| GatewayError::HttpClient(e.to_string(), e))?;
        Ok(Self {
            http_client: client,
            url: uri,
            contract_id: contract_id.clone(),
            retry_after: Arc::new(RwLock::new(None)),
            backoff_policy: ExponentialBackoff::from(&options.retry),
        })
    }

    #[cfg(test)]
    pub fn with_test_backoff_policy(mut self) -> Self {
        // Extremely short intervals for very fast testing
        self.backoff_policy = backoff::ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(1))
            .with_multiplier(1.1)
            .with_max_interval(Duration::from_millis(5))
            .with_max_elapsed_time(Some(Duration::from_millis(50)))
            .build();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{GATEWAY_API_VERSION}/{path}",
            self.url
                .to_string()
                .trim_end_matches('/')
        )
    }

    /// Converts a error response to a Result.
    ///
    /// Raises an error if the response status code id 429, 502, 503 or 504. In the 429
    /// case it will try to look for a retry-after header an parse it accordingly. The
    /// parsed value is then passed as part of the error.
    async fn error_for_response(&self, response: Response) -> Result<Response, GatewayError> {
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_raw = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(parse_retry_value);

                Err(GatewayError::RateLimited(retry_after_raw))
            }
            StatusCode::BAD_GATEWAY |
            StatusCode::SERVICE_UNAVAILABLE |
            StatusCode::GATEWAY_TIMEOUT => Err(GatewayError::ServerUnreachable(
                response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Server Unreachable".to_string()),
            )),
            status if !status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| GatewayError::ParseResponse(e.to_string()))?;
                match serde_json::from_str::<ErrorResponse>(&body) {
                    Ok(ErrorResponse { errors }) if !errors.is_empty() => {
                        Err(GatewayError::Rejected(errors))
                    }
                    _ => Err(GatewayError::Fatal(format!("Unexpected status {status}, Body: {body}"))),
                }
            }
            _ => Ok(response),
        }
    }

    /// Classifies errors into transient or permanent ones.
    ///
    /// Transient errors are retried with a potential backoff, permanent ones are not.
    /// If the error is RateLimited, this method will set the self.retry_after value so
    /// future requests wait until the rate limit has been reset.
    async fn handle_error_for_backoff(&self, e: GatewayError) -> backoff::Error<GatewayError> {
        match e {
            GatewayError::ServerUnreachable(_) => backoff::Error::transient(e),
            GatewayError::RateLimited(Some(until)) => {
                let mut retry_after_guard = self.retry_after.write().await;
                *retry_after_guard = Some(
                    retry_after_guard
                        .unwrap_or(until)
                        .max(until),
                );

                if let Ok(duration) = until.duration_since(SystemTime::now()) {
                    backoff::Error::retry_after(e, duration)
                } else {
                    e.into()
                }
            }
            GatewayError::RateLimited(None) => e.into(),
            _ => backoff::Error::permanent(e),
        }
    }

    /// Waits until the current rate limit time has passed.
    ///
    /// Only waits if there is a time and that time is in the future, else return
    /// immediately.
    async fn wait_until_retry_after(&self) {
        if let Some(&until) = self.retry_after.read().await.as_ref() {
            let now = SystemTime::now();
            if until > now {
                if let Ok(duration) = until.duration_since(now) {
                    sleep(duration).await
                }
            }
        }
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        request: &T,
        uri: &str,
    ) -> Result<Response, GatewayError> {
        let server_response = self
            .http_client
            .post(uri)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::HttpClient(e.to_string(), e))?;
        self.error_for_response(server_response)
            .await
    }

    /// Makes a post request handling transient failures.
    ///
    /// If a retry-after header is received it will be respected. Else the configured
    /// backoff policy is used to deal with transient network or server errors.
    async fn make_read_request<T: Serialize + ?Sized>(
        &self,
        request: &T,
        uri: &str,
    ) -> Result<Response, GatewayError> {
        self.wait_until_retry_after().await;
        let response = backoff::future::retry(self.backoff_policy.clone(), || async {
            match self.send(request, uri).await {
                Ok(response) => Ok(response),
                Err(e) => Err(self.handle_error_for_backoff(e).await),
            }
        })
        .await?;
        Ok(response)
    }

    /// Makes a post request that is never repeated.
    async fn make_write_request<T: Serialize + ?Sized>(
        &self,
        request: &T,
        uri: &str,
    ) -> Result<Response, GatewayError> {
        self.wait_until_retry_after().await;
        self.send(request, uri).await
    }
}

/// Parses a successful response body.
///
/// Some gateways report contract failures with a success status and an `errors`
/// list, those are turned into [`GatewayError::Rejected`] as well.
async fn parse_body<R: DeserializeOwned>(response: Response) -> Result<R, GatewayError> {
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::ParseResponse(e.to_string()))?;
    if let Ok(ErrorResponse { errors }) = serde_json::from_str::<ErrorResponse>(&body) {
        if !errors.is_empty() {
            return Err(GatewayError::Rejected(errors));
        }
    }
    serde_json::from_str::<R>(&body)
        .map_err(|err| GatewayError::ParseResponse(format!("Error: {err}, Body: {body}")))
}

fn parse_retry_value(val: &str) -> Option<SystemTime> {
    if let Ok(secs) = val.parse::<u64>() {
        return Some(SystemTime::now() + Duration::from_secs(secs));
    }
    if let Ok(date) = OffsetDateTime::parse(val, &Rfc2822) {
        return Some(date.into());
    }
    None
}

#[async_trait]
impl ExchangeContract for HttpGatewayClient {
    #[instrument(skip(self), fields(contract_id = %self.contract_id))]
    async fn get_info(&self) -> Result<PoolInfo, GatewayError> {
        let uri = self.endpoint("contract/get_info");
        let request = GetInfoRequestBody { contract_id: self.contract_id.clone() };
        debug!(%uri, "Sending get_info request to gateway");

        let response = self
            .make_read_request(&request, &uri)
            .await?;
        trace!(?response, "Received response from gateway");

        let info = parse_body::<GetInfoRequestResponse>(response).await?;
        trace!(?info, "Received get_info response from gateway");
        Ok(info)
    }

    #[instrument(skip(self), fields(contract_id = %self.contract_id))]
    async fn deposit(&self, forward: &CallForward) -> Result<TxId, GatewayError> {
        if forward.amount == 0 {
            warn!(asset_id = %forward.asset_id, "Depositing a zero amount.");
        }
        let uri = self.endpoint("contract/deposit");
        let request =
            DepositRequestBody { contract_id: self.contract_id.clone(), forward: forward.clone() };
        debug!(%uri, "Sending deposit request to gateway");

        let response = self
            .make_write_request(&request, &uri)
            .await?;
        let tx = parse_body::<TransactionResponse>(response).await?;
        debug!(transaction_id = %tx.transaction_id, "Deposit submitted");
        Ok(tx.transaction_id)
    }

    #[instrument(skip(self), fields(contract_id = %self.contract_id))]
    async fn add_liquidity(
        &self,
        min_liquidity: Amount,
        max_tokens: Amount,
        deadline: u64,
        tx_params: TxParams,
    ) -> Result<TxId, GatewayError> {
        let uri = self.endpoint("contract/add_liquidity");
        let request = AddLiquidityRequestBody {
            contract_id: self.contract_id.clone(),
            min_liquidity,
            max_tokens,
            deadline,
            tx_params,
        };
        debug!(%uri, "Sending add_liquidity request to gateway");
        trace!(?request, "Sending request to gateway");

        let response = self
            .make_write_request(&request, &uri)
            .await?;
        let tx = parse_body::<TransactionResponse>(response).await?;
        debug!(transaction_id = %tx.transaction_id, "Liquidity submitted");
        Ok(tx.transaction_id)
    }
}

#[async_trait]
impl WalletProvider for HttpGatewayClient {
    #[instrument(skip(self))]
    async fn create_wallet(&self) -> Result<Address, GatewayError> {
        let uri = self.endpoint("wallet/create");
        debug!(%uri, "Sending create_wallet request to gateway");

        let response = self
            .make_write_request(&CreateWalletRequestBody::default(), &uri)
            .await?;
        let wallet = parse_body::<CreateWalletRequestResponse>(response).await?;
        debug!(address = %wallet.address, "Wallet created");
        Ok(wallet.address)
    }

    #[instrument(skip(self))]
    async fn get_balances(
        &self,
        asset_ids: &[AssetId],
    ) -> Result<HashMap<AssetId, Amount>, GatewayError> {
        let uri = self.endpoint("wallet/balances");
        let request = BalancesRequestBody { asset_ids: asset_ids.to_vec() };
        debug!(%uri, "Sending balances request to gateway");

        let response = self
            .make_read_request(&request, &uri)
            .await?;
        let mut balances = parse_body::<BalancesRequestResponse>(response)
            .await?
            .into_map();
        for asset_id in asset_ids {
            balances
                .entry(asset_id.clone())
                .or_insert(0);
        }
        trace!(?balances, "Received balances response from gateway");
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use swayswap_common::{dto::NOT_ENOUGH_COINS, Bytes};

    use super::*;

    fn contract_id() -> ContractId {
        Bytes::from_str("0xc0ffee").unwrap()
    }

    fn client(server: &Server) -> HttpGatewayClient {
        HttpGatewayClient::new(server.url().as_str(), &contract_id(), HttpGatewayClientOptions::default())
            .expect("create client")
            .with_test_backoff_policy()
    }

    #[test]
    fn test_invalid_url() {
        let result = HttpGatewayClient::new("not a url", &contract_id(), Default::default());

        assert!(matches!(result, Err(GatewayError::UrlParsing(_, _))));
    }

    #[tokio::test]
    async fn test_get_info() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/get_info")
            .match_body(Matcher::Json(serde_json::json!({"contract_id": "0xc0ffee"})))
            .expect(1)
            .with_body(r#"{"eth_reserve": 200, "token_reserve": 100, "lp_token_supply": 141}"#)
            .create_async()
            .await;

        let info = client(&server)
            .get_info()
            .await
            .expect("get info");

        mocked_server.assert();
        assert_eq!(info, PoolInfo { eth_reserve: 200, token_reserve: 100, lp_token_supply: 141 });
    }

    #[tokio::test]
    async fn test_deposit() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/deposit")
            .match_body(Matcher::Json(serde_json::json!({
                "contract_id": "0xc0ffee",
                "forward": {"amount": 500, "asset_id": "0x01"}
            })))
            .expect(1)
            .with_body(r#"{"transaction_id": "0xaa01"}"#)
            .create_async()
            .await;

        let tx_id = client(&server)
            .deposit(&CallForward::new(500, &Bytes::from_str("0x01").unwrap()))
            .await
            .expect("deposit");

        mocked_server.assert();
        assert_eq!(tx_id, Bytes::from_str("0xaa01").unwrap());
    }

    #[tokio::test]
    async fn test_add_liquidity() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/add_liquidity")
            .match_body(Matcher::Json(serde_json::json!({
                "contract_id": "0xc0ffee",
                "min_liquidity": 1,
                "max_tokens": 300,
                "deadline": 1000,
                "tx_params": {"variable_outputs": 1}
            })))
            .expect(1)
            .with_body(r#"{"transaction_id": "0xaa02"}"#)
            .create_async()
            .await;

        let tx_id = client(&server)
            .add_liquidity(1, 300, 1000, TxParams { variable_outputs: 1 })
            .await
            .expect("add liquidity");

        mocked_server.assert();
        assert_eq!(tx_id, Bytes::from_str("0xaa02").unwrap());
    }

    #[tokio::test]
    async fn test_deposit_rejected() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/deposit")
            .with_status(400)
            .with_body(r#"{"errors": [{"message": "enough coins could not be found"}]}"#)
            .create_async()
            .await;

        let err = client(&server)
            .deposit(&CallForward::new(500, &Bytes::from_str("0x01").unwrap()))
            .await
            .unwrap_err();

        mocked_server.assert();
        assert!(matches!(err, GatewayError::Rejected(_)));
        assert_eq!(err.first_message(), Some(NOT_ENOUGH_COINS));
        assert_eq!(err.to_string(), "Request rejected: enough coins could not be found");
    }

    #[tokio::test]
    async fn test_errors_in_success_body_are_rejections() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/contract/add_liquidity")
            .with_body(r#"{"errors": [{"message": "Revert(42)"}], "data": null}"#)
            .create_async()
            .await;

        let err = client(&server)
            .add_liquidity(1, 300, 1000, TxParams::default())
            .await
            .unwrap_err();

        assert_eq!(err.first_message(), Some("Revert(42)"));
    }

    #[tokio::test]
    async fn test_unexpected_status_without_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/wallet/create")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client(&server)
            .create_wallet()
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Fatal(_)));
    }

    #[tokio::test]
    async fn test_deposit_is_not_retried() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/deposit")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(1)
            .create_async()
            .await;

        let err = client(&server)
            .deposit(&CallForward::new(500, &Bytes::from_str("0x01").unwrap()))
            .await
            .unwrap_err();

        mocked_server.assert();
        assert!(matches!(err, GatewayError::ServerUnreachable(body) if body == "Service Unavailable"));
    }

    #[tokio::test]
    async fn test_get_info_is_retried() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/get_info")
            .with_status(502)
            .expect_at_least(2)
            .create_async()
            .await;

        let err = client(&server)
            .get_info()
            .await
            .unwrap_err();

        mocked_server.assert();
        assert!(matches!(err, GatewayError::ServerUnreachable(_)));
    }

    #[tokio::test]
    async fn test_create_wallet() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/wallet/create")
            .expect(1)
            .with_body(r#"{"address": "0xbeef"}"#)
            .create_async()
            .await;

        let address = client(&server)
            .create_wallet()
            .await
            .expect("create wallet");

        mocked_server.assert();
        assert_eq!(address, Bytes::from_str("0xbeef").unwrap());
    }

    #[tokio::test]
    async fn test_get_balances_fills_missing_assets() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/wallet/balances")
            .match_body(Matcher::Json(serde_json::json!({"asset_ids": ["0x00", "0x01"]})))
            .with_body(r#"{"balances": [{"asset_id": "0x00", "amount": 42}]}"#)
            .create_async()
            .await;
        let eth = Bytes::from_str("0x00").unwrap();
        let dai = Bytes::from_str("0x01").unwrap();

        let balances = client(&server)
            .get_balances(&[eth.clone(), dai.clone()])
            .await
            .expect("get balances");

        assert_eq!(balances, HashMap::from([(eth, 42), (dai, 0)]));
    }

    #[tokio::test]
    async fn test_auth_header() {
        let mut server = Server::new_async().await;
        let mocked_server = server
            .mock("POST", "/v1/contract/get_info")
            .match_header("authorization", "secret")
            .with_body(r#"{"eth_reserve": 0, "token_reserve": 0}"#)
            .create_async()
            .await;
        let client = HttpGatewayClient::new(
            server.url().as_str(),
            &contract_id(),
            HttpGatewayClientOptions::new().with_auth_key(Some("secret".to_string())),
        )
        .unwrap();

        client.get_info().await.expect("get info");

        mocked_server.assert();
    }

    #[tokio::test]
    async fn test_error_for_response_rate_limited() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/test")
            .with_status(429)
            .with_header("Retry-After", "60")
            .create_async()
            .await;

        let response = reqwest::Client::new()
            .get(format!("{}/test", server.url()))
            .send()
            .await
            .unwrap();
        let result = client(&server)
            .error_for_response(response)
            .await;

        mock.assert();
        assert!(matches!(result, Err(GatewayError::RateLimited(Some(_)))));
    }

    #[tokio::test]
    async fn test_handle_error_for_backoff_rate_limited_with_retry_after() {
        let server = Server::new_async().await;
        let http_client = client(&server);
        let future_time = SystemTime::now() + Duration::from_secs(60);

        let backoff_error = http_client
            .handle_error_for_backoff(GatewayError::RateLimited(Some(future_time)))
            .await;

        assert!(matches!(backoff_error, backoff::Error::Transient { retry_after: Some(_), .. }));
        assert_eq!(*http_client.retry_after.read().await, Some(future_time));
    }

    #[tokio::test]
    async fn test_handle_error_for_backoff_rejection_is_permanent() {
        let server = Server::new_async().await;
        let error = GatewayError::Rejected(vec![ResponseError { message: "nope".to_string() }]);

        let backoff_error = client(&server)
            .handle_error_for_backoff(error)
            .await;

        assert!(matches!(backoff_error, backoff::Error::Permanent(GatewayError::Rejected(_))));
    }

    #[test]
    fn test_parse_retry_value() {
        let numeric = parse_retry_value("60").expect("numeric value");
        assert!(numeric > SystemTime::now() + Duration::from_secs(59));

        let date = parse_retry_value("Tue, 01 Jan 2030 12:00:00 +0000").expect("rfc2822 value");
        assert!(date > SystemTime::now());

        assert!(parse_retry_value("invalid").is_none());
        assert!(parse_retry_value("").is_none());
    }
}
