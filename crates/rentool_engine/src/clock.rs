use rentool_core::Millis;

/// Wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> Millis {
    Millis::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
