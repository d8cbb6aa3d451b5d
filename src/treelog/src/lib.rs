// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! In-process structured logger backed by a JSON tree.
//!
//! Records are not appended to a text file line by line. They accumulate in
//! an in-memory tree keyed by caller-supplied path components, and the whole
//! tree is rewritten to the configured file on [`dump`], on [`rotate`] and on
//! [`destroy`], so the file on disk parses as a single well-formed JSON
//! document at any moment.
//!
//! A single template string carries both the tree path and the message:
//! every `%1` descends one node, consuming the next argument as the child
//! name, and the rest is printf-style text. The level macros add the call
//! site for free:
//!
//! ```no_run
//! use treelog::{init, dump, log_info, Level};
//!
//! let _guard = init(Level::Info, "log.json");
//! log_info!("%1%1listening on port %d", "net", "server", 8080);
//! dump();
//! ```
//!
//! produces
//!
//! ```json
//! {
//!   "net": {
//!     "server": {
//!       "logs": [
//!         {
//!           "Time": "2026-03-14 09:26:53.589793238",
//!           "LogLevel": "INFO",
//!           "FileName": "main.rs",
//!           "FuncName": "demo",
//!           "FileLine": 4,
//!           "Log": "listening on port 8080"
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! The logger is process-wide. `init` activates it and hands back a
//! [`FlushGuard`] whose drop flushes and tears down; records past the
//! severity threshold are dropped before any parsing work; every 500
//! accepted records the tree moves to a timestamped rotation file, of which
//! the five newest are retained on disk.

// Precondition reporting: panic in debug builds, a single stderr line in
// release builds, fully silent with the `dist` feature.
macro_rules! check {
    ($cond:expr) => {
        if !$cond {
            if cfg!(debug_assertions) {
                panic!("Assertion at [{}:{}:{}] failed", file!(), module_path!(), line!());
            } else if !cfg!(feature = "dist") {
                eprintln!("Assertion at [{}:{}:{}] failed", file!(), module_path!(), line!());
            }
        }
    };
}
pub(crate) use check;

mod logger;
mod macros;
mod sink;
mod template;

pub use logger::{
    destroy, dump, init, log, log_at, rotate, set_threshold, FlushGuard, MAX_ROTATED_FILES,
    ROTATE_EVERY,
};
pub use macros::basename;
pub use template::{Arg, HEADER_PREFIX, MAX_MESSAGE_LEN, MAX_TEMPLATE_LEN};
pub use treelog_core::{CallSite, Level, LogTree, Record, LOGS_KEY};
