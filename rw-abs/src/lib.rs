/*!

Types/type aliases that abstract over the implementing backing type.

# Background and Motivation

A motivating example is the [`IString`] type, an interned string type. A number of external crates could provide
this functionality. This module redirects to whatever chosen implementation we want. To use the
[`string_cache` crate](https://crates.io/crates/string_cache), we just define `IString` as an alias for
`string_cache::DefaultAtom`:

```ignore
pub use string_cache::DefaultAtom as IString;
```

For infrastructure with a backing implementation we might want to swap out later, we define a thin abstraction layer
instead of a bare alias. The `log` module is an example: its (crate) public interface consists only of
`set_global_logging_threshold()`/`get_global_logging_threshold()` and the macros `critical!`, `error!`, `warning!`,
`info!`, `debug!`, and `trace!`. The backing implementation (`tracing`) is encapsulated behind that interface so it
can be swapped without touching callers.

*/

pub mod log;

// Interned string. Use `DefaultAtom` for a global cache that can be used across threads.
pub use string_cache::DefaultAtom as IString;

pub use std::collections::HashMap;
pub use std::collections::HashSet as StdHashSet;

/// A hash set, used where we only need membership tests.
pub type Set<T> = StdHashSet<T>;

pub use tracing;
