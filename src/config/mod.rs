//! Configuration parsing and types.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

pub use parser::load_config;
pub use types::*;

use crate::common::error::ConfigError;

/// Load a config file, apply environment overrides and validate it.
pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(load_config(path)?);
    validate::validate_config(&config)?;
    Ok(config)
}

/// A minimal valid configuration shared by unit tests.
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        onebot: OneBotConfig {
            ws_address: "127.0.0.1".to_string(),
            ws_port: 6700,
            access_token: None,
            group_id: 123456,
        },
        access: AccessConfig::default(),
        rate_limit: RateLimitConfig::default(),
        relay: RelayConfig::default(),
        commands: CommandsConfig {
            online_query_client: "lobby".to_string(),
            stats_query_client: "survival".to_string(),
            allow_offline_registration_for_everyone: false,
            allow_whitelist_for_everyone: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_token() {
        let config = test_config();
        assert_eq!(config.onebot.url(), "ws://127.0.0.1:6700/");
    }

    #[test]
    fn test_url_with_token() {
        let mut config = test_config();
        config.onebot.access_token = Some("abc".to_string());
        assert_eq!(config.onebot.url(), "ws://127.0.0.1:6700/?access_token=abc");
    }
}
