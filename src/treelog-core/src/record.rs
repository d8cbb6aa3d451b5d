// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use chrono::Local;
use serde::Serialize;

use crate::level::Level;

/// Wall-clock format used for the `Time` field, nanosecond precision.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%f";

/// Call-site metadata decoded from a template header.
///
/// A `file_line` of 0 means the caller did not supply one and the field is
/// omitted from the serialized record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub file_name: Option<String>,
    pub func_name: Option<String>,
    pub file_line: u32,
}

/// One log entry, immutable once constructed.
///
/// Serialized field names are the reserved record-level keys of the log
/// file format; optional fields are omitted entirely when absent.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "LogLevel")]
    pub level: Level,
    #[serde(rename = "FileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "FuncName", skip_serializing_if = "Option::is_none")]
    pub func_name: Option<String>,
    #[serde(rename = "FileLine", skip_serializing_if = "Option::is_none")]
    pub file_line: Option<u32>,
    #[serde(rename = "Log")]
    pub message: String,
}

impl Record {
    /// Build a record stamped with the current local wall-clock time.
    #[must_use]
    pub fn new(level: Level, meta: Option<&CallSite>, message: String) -> Self {
        Self {
            time: Local::now().format(TIME_FORMAT).to_string(),
            level,
            file_name: meta.and_then(|m| m.file_name.clone()),
            func_name: meta.and_then(|m| m.func_name.clone()),
            file_line: meta.and_then(|m| (m.file_line > 0).then_some(m.file_line)),
            message,
        }
    }
}
