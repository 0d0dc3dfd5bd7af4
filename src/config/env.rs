//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `CHATBRIDGE_WS_ADDRESS` - OneBot WebSocket host
//! - `CHATBRIDGE_WS_PORT` - OneBot WebSocket port
//! - `CHATBRIDGE_ACCESS_TOKEN` - OneBot access token
//! - `CHATBRIDGE_GROUP_ID` - Relayed QQ group

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "CHATBRIDGE";

/// Apply environment variable overrides to a config.
///
/// This allows the access token to be provided via the environment
/// instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(address) = env::var(format!("{}_WS_ADDRESS", ENV_PREFIX)) {
        config.onebot.ws_address = address;
    }
    if let Ok(port) = env::var(format!("{}_WS_PORT", ENV_PREFIX)) {
        if let Ok(port) = port.parse() {
            config.onebot.ws_port = port;
        }
    }
    if let Ok(token) = env::var(format!("{}_ACCESS_TOKEN", ENV_PREFIX)) {
        config.onebot.access_token = Some(token);
    }
    if let Ok(group_id) = env::var(format!("{}_GROUP_ID", ENV_PREFIX)) {
        if let Ok(id) = group_id.parse() {
            config.onebot.group_id = id;
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `CHATBRIDGE_CONFIG` environment variable, otherwise returns "chatbridge.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "chatbridge.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "CHATBRIDGE");
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("CHATBRIDGE_WS_PORT", "7000");
        env::set_var("CHATBRIDGE_ACCESS_TOKEN", "from-env");
        env::remove_var("CHATBRIDGE_WS_ADDRESS");
        env::remove_var("CHATBRIDGE_GROUP_ID");

        let result = apply_env_overrides(test_config());

        assert_eq!(result.onebot.ws_port, 7000);
        assert_eq!(result.onebot.access_token.as_deref(), Some("from-env"));
        assert_eq!(result.onebot.ws_address, "127.0.0.1");

        env::remove_var("CHATBRIDGE_WS_PORT");
        env::remove_var("CHATBRIDGE_ACCESS_TOKEN");
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("CHATBRIDGE_CONFIG");
        assert_eq!(get_config_path(), "chatbridge.conf");
    }
}
