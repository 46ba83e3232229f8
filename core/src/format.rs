//! Message Formatting
//!
//! Every component materializes its text through here. Formatting never
//! panics or propagates an error: a `Display` impl that fails yields
//! `None` from [`try_format`], and the `logf!` macro drops that entry.

use std::fmt::{self, Write};

/// Format `args` into an owned string, or `None` if any argument's
/// formatter reported an error
pub fn try_format(args: fmt::Arguments<'_>) -> Option<String> {
    // Fast path for literal-only messages
    if let Some(s) = args.as_str() {
        return Some(s.to_owned());
    }

    let mut out = String::new();
    out.write_fmt(args).ok()?;
    Some(out)
}

/// Format into a `String`, keeping whatever was produced before a
/// formatter failed
pub fn format_lossy(args: fmt::Arguments<'_>) -> String {
    let mut out = String::new();
    let _ = out.write_fmt(args);
    out
}

/// Best-effort `format!`: never panics on a failing `Display` impl
#[macro_export]
macro_rules! string_format {
    ($($arg:tt)*) => {
        $crate::format::format_lossy(::std::format_args!($($arg)*))
    };
}

/// Format and append one entry to a `LogCollector` or `Logger`
///
/// ```ignore
/// logf!(collector, "loaded {} events from {}", count, path.display());
/// logf!(logger, "worker {} done", id);
/// ```
#[macro_export]
macro_rules! logf {
    ($log:expr, $($arg:tt)*) => {
        if let ::std::option::Option::Some(text) =
            $crate::format::try_format(::std::format_args!($($arg)*))
        {
            $log.append(text);
        }
    };
}
