/*!

A thin, leveled logging facade over `tracing`.

Callers never reach for `tracing` directly; they use the macros exported from this module
(`critical!`, `error!`, `warning!`, `info!`, `debug!`, `trace!`), each of which takes a numeric
verbosity level as its first argument followed by a format string and arguments, e.g.

```ignore
debug!(2, "rewrote {} at {:?}", rule_name, path);
```

The level lets a caller dial down chatty subsystems (the matcher's backtracking, say) without
silencing higher-level driver events, while still funneling everything through one `tracing`
subscriber that the host application configures.

*/

use std::sync::atomic::{AtomicU8, Ordering};

static LOGGING_THRESHOLD: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity threshold. Calls to `debug!`/`trace!`/etc. with a level greater
/// than this threshold are suppressed before they ever reach `tracing`.
pub fn set_global_logging_threshold(level: u8) {
  LOGGING_THRESHOLD.store(level, Ordering::Relaxed);
}

pub fn get_global_logging_threshold() -> u8 {
  LOGGING_THRESHOLD.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn level_enabled(level: u8) -> bool {
  level <= get_global_logging_threshold()
}

#[macro_export]
macro_rules! critical {
  ($level:expr, $($arg:tt)*) => {
    if $crate::log::level_enabled($level) {
      $crate::tracing::error!(target: "critical", $($arg)*);
    }
  };
}

#[macro_export]
macro_rules! error {
  ($level:expr, $($arg:tt)*) => {
    if $crate::log::level_enabled($level) {
      $crate::tracing::error!($($arg)*);
    }
  };
}

#[macro_export]
macro_rules! warning {
  ($level:expr, $($arg:tt)*) => {
    if $crate::log::level_enabled($level) {
      $crate::tracing::warn!($($arg)*);
    }
  };
}

#[macro_export]
macro_rules! info {
  ($level:expr, $($arg:tt)*) => {
    if $crate::log::level_enabled($level) {
      $crate::tracing::info!($($arg)*);
    }
  };
}

#[macro_export]
macro_rules! debug {
  ($level:expr, $($arg:tt)*) => {
    if $crate::log::level_enabled($level) {
      $crate::tracing::debug!($($arg)*);
    }
  };
}

#[macro_export]
macro_rules! trace {
  ($level:expr, $($arg:tt)*) => {
    if $crate::log::level_enabled($level) {
      $crate::tracing::trace!($($arg)*);
    }
  };
}
