use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PRODUCTS_URL: &str = "https://fakestoreapi.com/products";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_EPOCHS: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not valid: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Process settings, read from `RESTOCK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub products_url: String,
    pub bind_addr: String,
    /// Seeds both catalog generation and training when set.
    pub seed: Option<u64>,
    pub http_timeout: Option<Duration>,
    pub epochs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            products_url: DEFAULT_PRODUCTS_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            seed: None,
            http_timeout: None,
            epochs: DEFAULT_EPOCHS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let seed = get("RESTOCK_SEED")
            .map(|v| parse::<u64>("RESTOCK_SEED", &v))
            .transpose()?;

        let http_timeout = get("RESTOCK_HTTP_TIMEOUT_SECS")
            .map(|v| parse::<u64>("RESTOCK_HTTP_TIMEOUT_SECS", &v))
            .transpose()?
            .map(Duration::from_secs);

        let epochs = match get("RESTOCK_EPOCHS") {
            Some(v) => {
                let n = parse::<usize>("RESTOCK_EPOCHS", &v)?;
                if n == 0 {
                    return Err(ConfigError::Invalid {
                        var: "RESTOCK_EPOCHS",
                        value: v,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                n
            }
            None => defaults.epochs,
        };

        Ok(Self {
            products_url: get("RESTOCK_PRODUCTS_URL").unwrap_or(defaults.products_url),
            bind_addr: get("RESTOCK_BIND_ADDR").unwrap_or(defaults.bind_addr),
            seed,
            http_timeout,
            epochs,
        })
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
