// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log severity, ordered from least to most verbose.
///
/// The derived ordering is the acceptance ordering: a record at `level`
/// passes a `threshold` iff `level <= threshold`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Critical,
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Uppercase name as it appears in serialized records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Critical => "CRITICAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// Whether a record at `level` passes this threshold.
    #[must_use]
    pub fn accepts(&self, level: Level) -> bool {
        level <= *self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CRITICAL" => Ok(Level::Critical),
            "ERROR" => Ok(Level::Error),
            "WARN" => Ok(Level::Warn),
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}
