//! Startup: assemble the run configuration.
//!
//! Order: file (or defaults) → command-line overrides → validation. Any
//! error here is fatal.

use std::path::Path;

use crate::config::loader::{parse_config, validate};
use crate::config::{ConfigError, DepositConfig, LogFormat};

/// Values given on the command line that replace file settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub portal_address: Option<String>,
    pub poll_deadline_secs: Option<u64>,
    pub log_format: Option<LogFormat>,
}

impl Overrides {
    fn apply(self, config: &mut DepositConfig) {
        if let Some(url) = self.rpc_url {
            config.node.rpc_url = url;
        }
        if let Some(address) = self.portal_address {
            config.bridge.portal_address = address;
        }
        if let Some(secs) = self.poll_deadline_secs {
            config.polling.deadline_secs = Some(secs);
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

/// Build the validated configuration for a run.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<DepositConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(path)?,
        None => DepositConfig::default(),
    };
    overrides.apply(&mut config);
    validate(config)
}
