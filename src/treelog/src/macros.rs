// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Level-specific logging macros.
//!
//! Each macro prepends the call-site header to the user template and
//! injects the current file basename, module path and line ahead of the
//! user arguments, so the parser can bind `FileName`, `FuncName` and
//! `FileLine` on every record.

/// Strip a source path down to its final component.
#[doc(hidden)]
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __treelog_log {
    ($level:expr, $template:literal $(, $arg:expr)* $(,)?) => {
        $crate::log(
            $level,
            concat!("$$%s$$%s$$%d$$", $template),
            &[
                $crate::Arg::from($crate::basename(file!())),
                $crate::Arg::from(module_path!()),
                $crate::Arg::from(line!()),
                $($crate::Arg::from($arg),)*
            ],
        )
    };
}

/// Log at CRITICAL severity. See [`log`](crate::log) for the template
/// language.
#[macro_export]
macro_rules! log_critical {
    ($($args:tt)*) => { $crate::__treelog_log!($crate::Level::Critical, $($args)*) };
}

/// Log at ERROR severity.
#[macro_export]
macro_rules! log_error {
    ($($args:tt)*) => { $crate::__treelog_log!($crate::Level::Error, $($args)*) };
}

/// Log at WARN severity.
#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => { $crate::__treelog_log!($crate::Level::Warn, $($args)*) };
}

/// Log at INFO severity.
#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => { $crate::__treelog_log!($crate::Level::Info, $($args)*) };
}

/// Log at DEBUG severity.
#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => { $crate::__treelog_log!($crate::Level::Debug, $($args)*) };
}
