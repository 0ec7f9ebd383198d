//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! blockchain/, flow/ emit tracing events
//!     → logging.rs (filter, timestamp, plain or JSON layout)
//!     → stdout
//! ```

pub mod logging;

pub use logging::init_logging;
