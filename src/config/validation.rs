//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first.

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::transaction::TRANSFER_GAS;
use crate::config::schema::DepositConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &DepositConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.node.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new("node.rpc_url", e.to_string()));
    }
    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("node.rpc_timeout_secs", "must be greater than 0"));
    }

    if config.bridge.portal_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "bridge.portal_address",
            format!("'{}' is not an address", config.bridge.portal_address),
        ));
    }

    if config.funding.transfer_gas_limit < TRANSFER_GAS {
        errors.push(ValidationError::new(
            "funding.transfer_gas_limit",
            format!("must be at least {}", TRANSFER_GAS),
        ));
    }

    if config.deposit.gas_limit == 0 {
        errors.push(ValidationError::new("deposit.gas_limit", "must be greater than 0"));
    }
    if config.deposit.l2_gas_limit() == 0 {
        errors.push(ValidationError::new("deposit.l2_block_gas_limit", "must be at least 2"));
    }

    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new("polling.interval_ms", "must be greater than 0"));
    }
    match config.polling.deadline_secs {
        None => errors.push(ValidationError::new("polling.deadline_secs", "must be set")),
        Some(0) => errors.push(ValidationError::new("polling.deadline_secs", "must be greater than 0")),
        Some(_) => {}
    }

    let level = &config.observability.log_level;
    if !LOG_LEVELS.iter().any(|known| known.eq_ignore_ascii_case(level)) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not one of {}", level, LOG_LEVELS.join(", ")),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DepositConfig {
        let mut config = DepositConfig::default();
        config.polling.deadline_secs = Some(300);
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_deadline_required() {
        let errors = validate_config(&DepositConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "polling.deadline_secs");
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = valid();
        config.node.rpc_url = "::nope".to_string();
        config.bridge.portal_address = "0x1234".to_string();
        config.funding.transfer_gas_limit = 20_000;
        config.deposit.l2_block_gas_limit = 1;
        config.polling.interval_ms = 0;
        config.observability.log_level = "verbose".to_string();

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "node.rpc_url",
                "bridge.portal_address",
                "funding.transfer_gas_limit",
                "deposit.l2_block_gas_limit",
                "polling.interval_ms",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_log_level_names() {
        let mut config = valid();
        config.observability.log_level = "WARN".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "observability.log_level");
        assert!(errors[0].message.contains("verbose"));
    }
}
