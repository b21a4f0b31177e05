//! Plain-text rendering of progress snapshots for the terminal.

use std::fmt::Write;

use rentool_core::ProgressUiState;

const BAR_WIDTH: usize = 30;

pub fn progress_bar(percentage: u8) -> String {
    let filled = usize::from(percentage.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Renders one snapshot as a small block of lines.
pub fn snapshot(view: &ProgressUiState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.operation_type);
    let _ = writeln!(
        out,
        "{} {:>3}%  {}  {}",
        progress_bar(view.percentage),
        view.percentage,
        view.file_count,
        view.current_file
    );
    if !view.is_terminal() {
        let _ = writeln!(out, "speed {}  eta {}", view.speed, view.eta);
    }
    out.push_str(&outcome(view));
    out
}

/// Summary lines for a finished run; empty while it is still going.
pub fn outcome(view: &ProgressUiState) -> String {
    let mut out = String::new();
    if view.is_failed {
        let message = view.error_message.as_deref().unwrap_or("unknown error");
        let _ = writeln!(out, "Failed: {message}");
    } else if view.is_completed {
        let _ = writeln!(out, "Success: {}", view.completion_summary());
        if view.rpyc_count > 0 {
            if let Some(path) = &view.extract_path {
                let _ = writeln!(
                    out,
                    "Found {} .rpyc files ready to decompile in {}",
                    view.rpyc_count,
                    path.display()
                );
            }
        }
    }
    out
}
