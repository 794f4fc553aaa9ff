use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

pub fn current_timestamp() -> u128 {
    safely_current_timestamp().unwrap_or_default()
}

pub fn safely_current_timestamp() -> Result<u128, SystemTimeError> {
    let now = SystemTime::now();
    now.duration_since(UNIX_EPOCH).map(|time| time.as_millis())
}

/// Milliseconds elapsed since `started`, saturating at zero if the clock moved backwards.
pub fn elapsed_millis(started: u128) -> u128 {
    current_timestamp().saturating_sub(started)
}
