//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Apply overrides → Validate
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → cancel the shutdown token
//!
//! Shutdown (shutdown.rs):
//!     Token cancelled → pollers return Cancelled → process exits non-zero
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
