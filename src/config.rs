use std::{env, fmt::Display, net::SocketAddr, ops::RangeInclusive, str::FromStr};

use chrono::TimeDelta;
use tracing::{info, warn};

use crate::utils::error::{AppError, AppResult};

const DEFAULT_SESSION_SECRET: &str = "default-secret-key";

/// Work factors accepted by `bcrypt::hash`.
const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_origin: Option<String>,
    pub session_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let session_secret = var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set, tokens are signed with the built-in development key");
            DEFAULT_SESSION_SECRET.to_string()
        });

        let config = Self {
            server_addr: try_load("SERVER_ADDR", "0.0.0.0:8000")?,
            database_url: var("DATABASE_URL").ok(),
            database_max_connections: try_load("DATABASE_MAX_CONNECTIONS", "10")?,
            cors_origin: var("CORS_ORIGIN").ok(),
            session_secret,
            token_ttl_minutes: try_load("ACCESS_TOKEN_EXPIRE_MINUTES", "30")?,
            bcrypt_cost: try_load("BCRYPT_COST", "12")?,
        };
        config.validate()?;

        Ok(config)
    }

    /// Rejects values that parse but would fail later: a token lifetime that
    /// is not positive or does not fit a `TimeDelta`, and a bcrypt cost the
    /// hasher refuses.
    pub fn validate(&self) -> AppResult<()> {
        if self.token_ttl_minutes <= 0 || TimeDelta::try_minutes(self.token_ttl_minutes).is_none() {
            warn!(ttl = self.token_ttl_minutes, "Invalid ACCESS_TOKEN_EXPIRE_MINUTES");
            return Err(AppError::InternalError(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be a positive number of minutes, got {}",
                self.token_ttl_minutes
            )));
        }

        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            warn!(cost = self.bcrypt_cost, "Invalid BCRYPT_COST");
            return Err(AppError::InternalError(format!(
                "BCRYPT_COST must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                self.bcrypt_cost
            )));
        }

        Ok(())
    }

    /// Settings for tests and local runs: in-memory store, cheap hashing.
    pub fn for_tests() -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: None,
            database_max_connections: 1,
            cors_origin: None,
            session_secret: "test-secret".to_string(),
            token_ttl_minutes: 30,
            bcrypt_cost: 4,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> AppResult<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::InternalError(format!("Invalid value for {key}: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_load_falls_back_to_default() {
        let port: u16 = try_load("POLLING_APP_UNSET_TEST_KEY", "8123").unwrap();
        assert_eq!(port, 8123);
    }

    #[test]
    fn try_load_rejects_malformed_default() {
        let result: AppResult<u32> = try_load("POLLING_APP_UNSET_TEST_KEY", "not-a-number");
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_settings_are_valid() {
        assert!(Config::for_tests().validate().is_ok());
    }

    #[test]
    fn token_lifetime_must_be_positive_and_in_range() {
        for ttl in [0, -5, 200_000_000_000_000, i64::MAX] {
            let config = Config {
                token_ttl_minutes: ttl,
                ..Config::for_tests()
            };
            assert!(
                matches!(config.validate(), Err(AppError::InternalError(_))),
                "ttl {} accepted",
                ttl
            );
        }
    }

    #[test]
    fn bcrypt_cost_must_be_accepted_by_the_hasher() {
        for cost in [0, 3, 32, 40] {
            let config = Config {
                bcrypt_cost: cost,
                ..Config::for_tests()
            };
            assert!(
                matches!(config.validate(), Err(AppError::InternalError(_))),
                "cost {} accepted",
                cost
            );
        }

        let config = Config {
            bcrypt_cost: 31,
            ..Config::for_tests()
        };
        assert!(config.validate().is_ok());
    }
}
