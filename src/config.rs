use crate::i18n::Locale;
use std::time::Duration;

/// Period between two advancement steps of one upload.
pub const DEFAULT_TICK_MS: u64 = 500;

/// Upper bound (exclusive) of a single random progress increment, in percent.
pub const DEFAULT_MAX_STEP: f64 = 20.0;

/// Buffered events per subscriber before slow receivers start lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Extensions the upload panel advertises. Display only, never enforced.
pub const ADVERTISED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "md"];

/// Size limit the upload panel advertises (20 MB). Display only, never enforced.
pub const ADVERTISED_MAX_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub tick: Duration,
    pub max_step: f64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub locale: Locale,
    /// When false no timers are spawned and callers drive `advance` themselves.
    pub auto_advance: bool,
    pub event_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            max_step: DEFAULT_MAX_STEP,
            seed: None,
            locale: Locale::En,
            auto_advance: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
impl TrackerConfig {
    pub fn manual() -> Self {
        Self { auto_advance: false, ..Self::default() }
    }
}
