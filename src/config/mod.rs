//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → DepositConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Every field but the poll deadline has a default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BridgeConfig, DepositCallConfig, DepositConfig, FundingConfig, LogFormat, NodeConfig,
    ObservabilityConfig, PollingConfig,
};
pub use validation::ValidationError;
