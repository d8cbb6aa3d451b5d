// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Process-wide logger: lifecycle, severity filter and rotation.
//!
//! All state lives behind two mutexes. `tree` protects the log tree itself,
//! `config` protects threshold, primary path, accepted-record counter,
//! rotated-file registry and lifecycle state. Whenever both are needed the
//! tree lock is taken first; code holding only the config lock never takes
//! the tree lock.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

use chrono::Local;
use tracing::warn;

use treelog_core::level::Level;
use treelog_core::record::Record;
use treelog_core::tree::{LogTree, LOGS_KEY};

use crate::check;
use crate::sink;
use crate::template::{self, Arg, Emission, ParsedCall, TemplateError};

/// Accepted records that trigger an implicit rotation.
pub const ROTATE_EVERY: u64 = 500;

/// Rotated files retained on disk before the oldest is deleted.
pub const MAX_ROTATED_FILES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Uninitialized,
    Active,
    Destroyed,
}

#[derive(Debug)]
struct Config {
    state: LifecycleState,
    threshold: Option<Level>,
    primary_path: Option<PathBuf>,
    accepted: u64,
    rotated: VecDeque<PathBuf>,
}

impl Config {
    const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            threshold: None,
            primary_path: None,
            accepted: 0,
            rotated: VecDeque::new(),
        }
    }

    /// Back to a blank configuration; lifecycle state is set by the caller.
    fn reset(&mut self) {
        self.threshold = None;
        self.primary_path = None;
        self.accepted = 0;
        self.rotated.clear();
    }
}

struct Logger {
    tree: Mutex<Option<LogTree>>,
    config: Mutex<Config>,
}

impl Logger {
    fn tree_guard(&self) -> Option<MutexGuard<'_, Option<LogTree>>> {
        match self.tree.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("log tree mutex poisoned");
                None
            }
        }
    }

    fn config_guard(&self) -> Option<MutexGuard<'_, Config>> {
        match self.config.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("logger config mutex poisoned");
                None
            }
        }
    }
}

/// The process-wide logger instance.
fn logger() -> &'static Logger {
    static LOGGER: OnceLock<Logger> = OnceLock::new();
    LOGGER.get_or_init(|| Logger {
        tree: Mutex::new(None),
        config: Mutex::new(Config::new()),
    })
}

/// Tears the logger down when dropped.
///
/// [`init`] hands one out so that going out of scope at the end of `main`
/// plays the role of an at-exit hook: the tree is flushed to the primary
/// path exactly once, whether through this guard or an earlier explicit
/// [`destroy`].
#[must_use = "dropping the guard immediately would tear the logger down"]
#[derive(Debug)]
pub struct FlushGuard {
    _private: (),
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        destroy();
    }
}

/// Install or replace the severity threshold and primary log path, and
/// activate the logger.
///
/// A tree is created only if none exists yet: re-initialization keeps
/// accumulated records and merely re-points threshold and path.
/// Re-initialization after [`destroy`] starts from an empty tree again.
pub fn init(threshold: Level, primary_path: impl Into<PathBuf>) -> FlushGuard {
    let guard = FlushGuard { _private: () };
    let path = primary_path.into();
    if path.as_os_str().is_empty() {
        check!(false);
        return guard;
    }

    let lg = logger();
    let Some(mut slot) = lg.tree_guard() else {
        return guard;
    };
    let Some(mut cfg) = lg.config_guard() else {
        return guard;
    };
    if slot.is_none() {
        *slot = Some(LogTree::new());
    }
    cfg.threshold = Some(threshold);
    cfg.primary_path = Some(path);
    cfg.state = LifecycleState::Active;
    guard
}

/// Flush the tree to the primary path, then free everything.
///
/// The tree, path, registry, counter and threshold all reset; the logger
/// moves to the destroyed state and further log/dump/rotate calls are
/// no-ops until the next [`init`]. Rotated files already on disk are kept.
pub fn destroy() {
    let lg = logger();
    let Some(mut slot) = lg.tree_guard() else {
        return;
    };
    let Some(mut cfg) = lg.config_guard() else {
        return;
    };
    if cfg.state != LifecycleState::Active {
        return;
    }
    if let (Some(tree), Some(primary)) = (slot.as_ref(), cfg.primary_path.as_ref()) {
        if let Err(err) = sink::write_tree(primary, tree) {
            warn!("final dump failed: {}", err);
            check!(false);
        }
    }
    *slot = None;
    cfg.reset();
    cfg.state = LifecycleState::Destroyed;
}

/// Severity filter. Queried before any parsing work is done.
fn should_log(level: Level) -> bool {
    let Some(cfg) = logger().config_guard() else {
        return false;
    };
    cfg.state == LifecycleState::Active
        && cfg.threshold.map(|t| t.accepts(level)).unwrap_or(false)
}

/// Decode `template` against `args` and append the resulting records.
///
/// See the crate docs for the template language. Dropped silently when the
/// level does not pass the filter or the template exceeds the length limit;
/// other malformed calls are dropped with a diagnostic.
pub fn log(level: Level, template: &str, args: &[Arg<'_>]) {
    if !should_log(level) {
        return;
    }
    let parsed = match template::parse(template, args) {
        Ok(parsed) => parsed,
        Err(TemplateError::TooLong) => return,
        Err(err) => {
            warn!("log call dropped: {}", err);
            return;
        }
    };
    append_parsed(level, parsed);
}

/// Structured companion to [`log`]: explicit path segments and a
/// ready-made message, no call-site metadata.
pub fn log_at(level: Level, path: &[&str], message: impl fmt::Display) {
    if !should_log(level) {
        return;
    }
    let mut owned: Vec<String> = Vec::with_capacity(path.len());
    for segment in path {
        if segment.is_empty() || *segment == LOGS_KEY {
            warn!("log call dropped: invalid node name '{}'", segment);
            return;
        }
        owned.push((*segment).to_string());
    }
    let message = template::clamp_message(message.to_string());
    append_parsed(
        level,
        ParsedCall {
            meta: None,
            emissions: vec![Emission {
                path: owned.clone(),
                message,
            }],
            final_path: owned,
        },
    );
}

fn append_parsed(level: Level, parsed: ParsedCall) {
    let lg = logger();
    let Some(mut slot) = lg.tree_guard() else {
        return;
    };
    let appended = match slot.as_mut() {
        Some(tree) => {
            if let Err(err) = tree.ensure_path(&parsed.final_path) {
                warn!("log call dropped: {}", err);
                return;
            }
            let meta = parsed.meta.as_ref();
            let mut appended: u64 = 0;
            for emission in &parsed.emissions {
                let record = Record::new(level, meta, emission.message.clone());
                match tree.append_record(&emission.path, &record) {
                    Ok(()) => appended += 1,
                    Err(err) => warn!("log record dropped: {}", err),
                }
            }
            appended
        }
        None => {
            // The filter said yes but there is no tree to write into.
            check!(false);
            return;
        }
    };
    if appended == 0 {
        return;
    }

    let Some(mut cfg) = lg.config_guard() else {
        return;
    };
    cfg.accepted += appended;
    if cfg.accepted >= ROTATE_EVERY {
        rotate_with(&mut slot, &mut cfg);
    }
}

/// Serialize the current tree to the primary path, truncating it.
/// An empty tree writes `{}`.
pub fn dump() {
    let lg = logger();
    let Some(slot) = lg.tree_guard() else {
        return;
    };
    let Some(cfg) = lg.config_guard() else {
        return;
    };
    if cfg.state != LifecycleState::Active {
        return;
    }
    let (Some(tree), Some(primary)) = (slot.as_ref(), cfg.primary_path.as_ref()) else {
        check!(false);
        return;
    };
    if let Err(err) = sink::write_tree(primary, tree) {
        warn!("dump failed: {}", err);
        check!(false);
    }
}

/// Move the current tree to a timestamped rotation file and start fresh.
pub fn rotate() {
    let lg = logger();
    let Some(mut slot) = lg.tree_guard() else {
        return;
    };
    let Some(mut cfg) = lg.config_guard() else {
        return;
    };
    if cfg.state != LifecycleState::Active {
        return;
    }
    rotate_with(&mut slot, &mut cfg);
}

/// Rotation procedure, run with both locks held (tree first).
///
/// The counter resets up front; eviction of the oldest rotated file
/// completes before the new file is written; the in-memory tree resets
/// only after a successful write.
fn rotate_with(slot: &mut Option<LogTree>, cfg: &mut Config) {
    cfg.accepted = 0;
    let Some(primary) = cfg.primary_path.as_ref() else {
        check!(false);
        return;
    };
    let Some(tree) = slot.as_mut() else {
        check!(false);
        return;
    };

    let target = sink::rotated_path(primary, &Local::now());
    if cfg.rotated.len() >= MAX_ROTATED_FILES {
        if let Some(oldest) = cfg.rotated.pop_front() {
            if let Err(err) = std::fs::remove_file(&oldest) {
                warn!("failed to evict rotated log '{}': {}", oldest.display(), err);
            }
        }
    }
    cfg.rotated.push_back(target.clone());

    match sink::write_tree(&target, tree) {
        Ok(()) => {
            let _ = tree.take();
        }
        Err(err) => {
            // Keep the tree; records stay visible to the next flush.
            warn!("rotation write failed: {}", err);
            check!(false);
        }
    }
}

/// Replace the severity threshold of an active logger.
///
/// Records accepted under the previous threshold are retained.
pub fn set_threshold(level: Level) {
    let Some(mut cfg) = logger().config_guard() else {
        return;
    };
    if cfg.state != LifecycleState::Active {
        return;
    }
    cfg.threshold = Some(level);
}
