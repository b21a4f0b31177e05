use std::path::Path;

use rentool_logging::rentool_debug;
use walkdir::WalkDir;

const COMPILED_SCRIPT_EXTENSION: &str = "rpyc";

/// Recursively counts compiled scripts (`*.rpyc`, any case) under `dir`.
///
/// A missing directory or unreadable entries count as nothing.
pub fn count_rpyc_files(dir: &Path) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    let count = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(COMPILED_SCRIPT_EXTENSION))
        })
        .count();
    rentool_debug!("Found {} compiled scripts under {:?}", count, dir);
    count
}
