//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::{BucketConfig, Config};

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // OneBot endpoint
    if config.onebot.ws_address.is_empty() {
        errors.push("onebot.ws_address is required".to_string());
    }
    if config.onebot.ws_port == 0 {
        errors.push("onebot.ws_port must be non-zero".to_string());
    }
    if config.onebot.group_id <= 0 {
        errors.push("onebot.group_id must be a positive group id".to_string());
    }

    // Rate limits
    validate_bucket("rate_limit.to_remote", &config.rate_limit.to_remote, &mut errors);
    validate_bucket(
        "rate_limit.to_chatroom",
        &config.rate_limit.to_chatroom,
        &mut errors,
    );

    if config.relay.chunk_limit == 0 {
        errors.push("relay.chunk_limit must be non-zero".to_string());
    }

    // Command targets
    if config.commands.online_query_client.is_empty() {
        errors.push("commands.online_query_client is required".to_string());
    }
    if config.commands.stats_query_client.is_empty() {
        errors.push("commands.stats_query_client is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn validate_bucket(name: &str, bucket: &BucketConfig, errors: &mut Vec<String>) {
    if !bucket.enabled {
        return;
    }
    if bucket.refill_period().is_none() {
        errors.push(format!(
            "{}.rate must be positive with a refill period between 1ns and u64::MAX seconds (got {})",
            name, bucket.rate
        ));
    }
    if bucket.capacity == 0 {
        errors.push(format!("{}.capacity must be non-zero", name));
    }
}
