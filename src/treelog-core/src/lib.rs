// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Core value types for the JSON log tree: severity levels, log records and
//! the ordered in-memory tree they accumulate in. No I/O and no globals live
//! here; the `treelog` crate adds the parser, sink and lifecycle on top.

pub mod level;
pub mod record;
pub mod tree;

pub use level::Level;
pub use record::{CallSite, Record};
pub use tree::{LogTree, LOGS_KEY};
