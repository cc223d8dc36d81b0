use chrono::{SecondsFormat, Utc};

/// Timestamp source for ledger entries. Timestamps never feed numeric outputs.
pub trait Clock: Send + Sync {
    /// Current time as an RFC 3339 string.
    fn now_rfc3339(&self) -> String;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Constant timestamp, for reproducible ledgers in tests and golden files.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    /// Creates a clock that always reports `timestamp`.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }
}

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        self.0.clone()
    }
}
