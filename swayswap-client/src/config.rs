use std::{fs, path::Path, time::Duration};

use backoff::{exponential::ExponentialBackoffBuilder, ExponentialBackoff};
use serde::Deserialize;
use swayswap_common::models::{Coin, ContractId};
use thiserror::Error;
use tracing::debug;

use crate::add_liquidity::AddLiquidityParameters;

/// Upper bound for `pool_info_ttl_secs` and `request_timeout_secs`, one day.
const MAX_DURATION_SECS: u64 = 86_400;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryConfiguration {
    Constant(ConstantRetryConfiguration),
    Exponential(ExponentialRetryConfiguration),
}

impl Default for RetryConfiguration {
    fn default() -> Self {
        RetryConfiguration::Exponential(ExponentialRetryConfiguration::default())
    }
}

/// A constant policy is expressed as an exponential backoff with a multiplier of one
/// whose elapsed time budget allows `max_attempts` tries.
impl From<&RetryConfiguration> for ExponentialBackoff {
    fn from(config: &RetryConfiguration) -> Self {
        match config {
            RetryConfiguration::Constant(c) => ExponentialBackoffBuilder::new()
                .with_initial_interval(c.cooldown)
                .with_randomization_factor(0.0)
                .with_multiplier(1.0)
                .with_max_interval(c.cooldown)
                .with_max_elapsed_time(Some(
                    c.cooldown.saturating_mul(
                        u32::try_from(c.max_attempts.saturating_sub(1)).unwrap_or(u32::MAX),
                    ),
                ))
                .build(),
            RetryConfiguration::Exponential(e) => ExponentialBackoffBuilder::new()
                .with_initial_interval(e.initial_interval)
                .with_multiplier(e.multiplier)
                .with_max_interval(e.max_interval)
                .with_max_elapsed_time(e.max_elapsed_time)
                .build(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConstantRetryConfiguration {
    max_attempts: u64,
    #[serde(with = "duration_millis")]
    cooldown: Duration,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExponentialRetryConfiguration {
    #[serde(with = "duration_millis")]
    initial_interval: Duration,
    multiplier: f64,
    #[serde(with = "duration_millis")]
    max_interval: Duration,
    #[serde(with = "option_duration_millis")]
    max_elapsed_time: Option<Duration>,
}

impl Default for ExponentialRetryConfiguration {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(250),
            // increase backoff time by 75% each failure
            multiplier: 1.75,
            max_interval: Duration::from_secs(10),
            // if all retries take longer than 30s, give up
            max_elapsed_time: Some(Duration::from_secs(30)),
        }
    }
}

/// Settings read from the YAML config file. Every field is optional.
///
/// ```yaml
/// contract_id: "0x..."
/// coins:
///   - name: ETH
///     asset_id: "0x0000000000000000000000000000000000000000000000000000000000000000"
/// add_liquidity:
///   min_liquidity: 1
///   deadline: 1000
///   variable_outputs: 1
/// pool_info_ttl_secs: 10
/// retry:
///   kind: exponential
///   initial_interval: 250
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub contract_id: Option<ContractId>,
    pub coins: Vec<Coin>,
    pub add_liquidity: AddLiquidityParameters,
    pub pool_info_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub retry: RetryConfiguration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contract_id: None,
            coins: vec![Coin::eth(), Coin::dai()],
            add_liquidity: AddLiquidityParameters::default(),
            pool_info_ttl_secs: 10,
            request_timeout_secs: 30,
            retry: RetryConfiguration::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading client config");
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        Self::from_yaml_str(&content)
    }

    /// Loads the file if one is given, else falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn pool_info_ttl(&self) -> Duration {
        Duration::from_secs(self.pool_info_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Looks up a configured coin by its ticker, ignoring case.
    pub fn coin(&self, name: &str) -> Option<&Coin> {
        self.coins
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.coins.len() < 2 {
            return Err(ConfigError::Invalid("at least two coins are required".to_string()));
        }
        for (i, coin) in self.coins.iter().enumerate() {
            if self.coins[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&coin.name))
            {
                return Err(ConfigError::Invalid(format!("duplicate coin {}", coin.name)));
            }
        }
        if self.add_liquidity.min_liquidity == 0 {
            return Err(ConfigError::Invalid("min_liquidity must be positive".to_string()));
        }
        if self.pool_info_ttl_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "pool_info_ttl_secs must not exceed {MAX_DURATION_SECS}"
            )));
        }
        if self.request_timeout_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "request_timeout_secs must not exceed {MAX_DURATION_SECS}"
            )));
        }
        Ok(())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod option_duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use backoff::backoff::Backoff;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::load(None).unwrap();

        assert_eq!(config.coins, vec![Coin::eth(), Coin::dai()]);
        assert_eq!(config.add_liquidity, AddLiquidityParameters::default());
        assert_eq!(config.pool_info_ttl(), Duration::from_secs(10));
        assert!(config.contract_id.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
contract_id: "0xc0ffee"
add_liquidity:
  deadline: 2000
pool_info_ttl_secs: 3
retry:
  kind: constant
  max_attempts: 3
  cooldown: 100
"#
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();

        assert_eq!(
            config
                .contract_id
                .as_ref()
                .unwrap()
                .to_string(),
            "0xc0ffee"
        );
        assert_eq!(config.add_liquidity.deadline, 2000);
        assert_eq!(config.add_liquidity.min_liquidity, 1);
        assert_eq!(config.pool_info_ttl(), Duration::from_secs(3));
        assert_eq!(
            config.retry,
            RetryConfiguration::Constant(ConstantRetryConfiguration {
                max_attempts: 3,
                cooldown: Duration::from_millis(100)
            })
        );
        assert_eq!(config.coins.len(), 2);
    }

    #[test]
    fn test_custom_coins() {
        let config = ClientConfig::from_yaml_str(
            r#"
coins:
  - name: ETH
    asset_id: "0x00"
  - name: USDC
    asset_id: "0x02"
    decimals: 6
"#,
        )
        .unwrap();

        let usdc = config.coin("usdc").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(config.coin("ETH").unwrap().decimals, 9);
        assert!(config.coin("DAI").is_none());
    }

    #[test]
    fn test_single_coin_is_invalid() {
        let result = ClientConfig::from_yaml_str(
            r#"
coins:
  - name: ETH
    asset_id: "0x00"
"#,
        );

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ClientConfig::load(Some(Path::new("/does/not/exist.yaml")));

        assert!(matches!(result, Err(ConfigError::Read(_, _))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ClientConfig::from_yaml_str("coins: 12");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    #[case::pool_info_ttl("pool_info_ttl_secs: 100000000000")]
    #[case::request_timeout("request_timeout_secs: 18446744073709551615")]
    fn test_oversized_duration_is_invalid(#[case] yaml: &str) {
        let result = ClientConfig::from_yaml_str(yaml);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_max_pool_info_ttl_is_accepted() {
        let config = ClientConfig::from_yaml_str("pool_info_ttl_secs: 86400").unwrap();

        assert_eq!(config.pool_info_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_constant_retry_backoff() {
        let config = RetryConfiguration::Constant(ConstantRetryConfiguration {
            max_attempts: 3,
            cooldown: Duration::from_millis(100),
        });

        let mut backoff = ExponentialBackoff::from(&config);

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.max_elapsed_time, Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_constant_retry_attempts_saturate() {
        let config = RetryConfiguration::Constant(ConstantRetryConfiguration {
            max_attempts: u64::from(u32::MAX) + 2,
            cooldown: Duration::from_millis(1),
        });

        let backoff = ExponentialBackoff::from(&config);

        assert_eq!(backoff.max_elapsed_time, Some(Duration::from_millis(u64::from(u32::MAX))));
    }
}
