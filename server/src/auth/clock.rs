//! Wall-clock access for token timestamps.

/// Source of the current time as seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        jsonwebtoken::get_current_timestamp()
    }
}
