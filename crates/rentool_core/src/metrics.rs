//! Presentation metrics derived from a record on every poll tick.
//!
//! Nothing here is persisted; the store only ever holds raw counts and
//! timestamps.

use crate::record::{Millis, ProgressRecord};

/// Placeholder shown while a rate cannot be computed yet.
pub const CALCULATING: &str = "calculating...";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub percentage: u8,
    /// `None` while still calculating.
    pub files_per_second: Option<f64>,
    /// `None` while still calculating.
    pub eta_ms: Option<Millis>,
    pub elapsed_ms: Millis,
}

impl Metrics {
    pub fn derive(record: &ProgressRecord) -> Self {
        Self {
            percentage: percentage(record),
            files_per_second: files_per_second(record),
            eta_ms: eta_ms(record),
            elapsed_ms: record.elapsed_ms(),
        }
    }
}

/// `processed * 100 / total`, clamped to 0..=100; 0 while the total is unknown.
pub fn percentage(record: &ProgressRecord) -> u8 {
    if record.total_files == 0 {
        return 0;
    }
    let pct = record.processed_files.saturating_mul(100) / record.total_files;
    // Clamped above, so the narrowing cannot truncate.
    pct.min(100) as u8
}

pub fn files_per_second(record: &ProgressRecord) -> Option<f64> {
    let elapsed_ms = record.elapsed_ms();
    if record.processed_files == 0 || elapsed_ms == 0 {
        return None;
    }
    Some(record.processed_files as f64 / (elapsed_ms as f64 / 1000.0))
}

pub fn eta_ms(record: &ProgressRecord) -> Option<Millis> {
    let rate = files_per_second(record)?;
    if rate <= 0.0 {
        return None;
    }
    let remaining = record.total_files.saturating_sub(record.processed_files);
    Some((remaining as f64 / rate * 1000.0).round() as Millis)
}

/// Formats a duration as `Ns`, `Mm Ss` or `Hh Mm`.
pub fn format_duration(ms: Millis) -> String {
    let seconds = ms / 1000;
    match seconds {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{}h {}m", s / 3600, (s % 3600) / 60),
    }
}

pub fn format_speed(files_per_second: Option<f64>) -> String {
    match files_per_second {
        Some(rate) if rate > 0.0 => format!("{rate:.1} files/sec"),
        _ => CALCULATING.to_string(),
    }
}

pub fn format_eta(eta_ms: Option<Millis>) -> String {
    match eta_ms {
        Some(ms) if ms > 0 => format!("~{}", format_duration(ms)),
        _ => CALCULATING.to_string(),
    }
}
