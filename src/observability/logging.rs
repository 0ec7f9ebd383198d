//! Structured logging.
//!
//! Plain output renders as `[HH:MM:SS.mmm] message key=value`; JSON output
//! carries the bare `HH:MM:SS.mmm` in its `timestamp` field. `RUST_LOG`
//! takes precedence over the configured level.

use chrono::{DateTime, Local};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Local wall-clock time with millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockTime {
    bracketed: bool,
}

impl ClockTime {
    /// `[HH:MM:SS.mmm]`, for the plain layout.
    pub fn bracketed() -> Self {
        Self { bracketed: true }
    }

    /// `HH:MM:SS.mmm`, for structured fields.
    pub fn bare() -> Self {
        Self { bracketed: false }
    }

    fn render(&self, now: &DateTime<Local>) -> String {
        let clock = format_clock(now);
        if self.bracketed {
            format!("[{}]", clock)
        } else {
            clock
        }
    }
}

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", self.render(&Local::now()))
    }
}

/// `HH:MM:SS.mmm`
pub fn format_clock(now: &DateTime<Local>) -> String {
    now.format("%H:%M:%S%.3f").to_string()
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("portal_deposit={}", config.log_level)));

    match config.log_format {
        LogFormat::Plain => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_timer(ClockTime::bracketed())
                    .with_target(false)
                    .with_level(false),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_timer(ClockTime::bare()))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap() + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_clock_format() {
        assert_eq!(format_clock(&at()), "07:05:03.042");
    }

    #[test]
    fn test_brackets_only_in_plain_layout() {
        assert_eq!(ClockTime::bracketed().render(&at()), "[07:05:03.042]");

        let bare = ClockTime::bare().render(&at());
        assert_eq!(bare, "07:05:03.042");
        assert!(!bare.contains('['));
    }
}
