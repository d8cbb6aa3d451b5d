// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! File sink: whole-document rewrites of the serialized tree.
//!
//! There is no append mode. Every write replaces the target file in full so
//! the file on disk is a well-formed JSON document after every successful
//! flush.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Timelike};

use treelog_core::tree::LogTree;

/// Serialize `tree` and rewrite `path` in full (truncate semantics).
pub fn write_tree(path: &Path, tree: &LogTree) -> Result<(), String> {
    let rendered = tree.to_pretty_string()?;
    fs::write(path, rendered)
        .map_err(|e| format!("write log file '{}': {}", path.display(), e))
}

/// Rotated file name for `primary` at instant `now`:
/// `<hour>_<minute>_<second>_<nanoseconds>_<primary basename>`, placed next
/// to the primary.
pub fn rotated_path(primary: &Path, now: &DateTime<Local>) -> PathBuf {
    let base = primary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!(
        "{}_{}_{}_{}_{}",
        now.hour(),
        now.minute(),
        now.second(),
        now.nanosecond(),
        base
    );
    match primary.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use treelog_core::level::Level;
    use treelog_core::record::Record;

    fn at(h: u32, m: u32, s: u32, ns: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 14, h, m, s)
            .unwrap()
            .with_nanosecond(ns)
            .unwrap()
    }

    #[test]
    fn test_rotated_name_fields() {
        let path = rotated_path(Path::new("log.json"), &at(9, 5, 59, 123));
        assert_eq!(path, PathBuf::from("9_5_59_123_log.json"));
    }

    #[test]
    fn test_rotated_path_stays_next_to_primary() {
        let path = rotated_path(Path::new("/var/tmp/app/log.json"), &at(23, 59, 1, 7));
        assert_eq!(path, PathBuf::from("/var/tmp/app/23_59_1_7_log.json"));
    }

    #[test]
    fn test_write_tree_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("log.json");

        let mut tree = LogTree::new();
        let record = Record::new(Level::Info, None, "first".to_string());
        tree.append_record(&["a".to_string()], &record).unwrap();
        write_tree(&target, &tree).unwrap();

        tree.clear();
        write_tree(&target, &tree).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
    }

    #[test]
    fn test_write_tree_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("log.json");
        let err = write_tree(&target, &LogTree::new()).unwrap_err();
        assert!(err.contains("write log file"), "unexpected error: {}", err);
    }
}
