/*!

There are different text representations possible for a [`Term`](crate::api::term::Term) depending on context: the
canonical brace-style form used in traces and error messages, a simplified form, and so on. This module provides a
unified API for formatting objects across the crate.

The trait that types that can be formatted implement is [`Formattable`]. It works similarly to the standard
library's `Display` trait. Unfortunately, `Display` can't be extended with formatting options for user defined
types, so we define our own and provide a convenience macro, [`impl_display_debug_for_formattable`], that wires
`Display`/`Debug` to it.

*/

use std::fmt::Debug;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum FormatStyle {
  #[default]
  Default, // The canonical brace-style form used in traces and error messages.
  Simple,  // A simplified form with pattern-variable/atom wrappers stripped.
  Debug,   // With extra debugging information (e.g. memoized hash, cache state).
}

pub trait Formattable {
  /// Writes a text representation of `self` according to the given `FormatStyle`.
  /// Use `format!` and friends to create a string.
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result;
}

/// Convenience: render with [`FormatStyle::Default`] and return an owned `String`.
pub fn show(t: &impl Formattable) -> String {
  let mut s = String::new();
  // `Formattable::repr` only fails if the underlying `Write` fails, which a `String` never does.
  t.repr(&mut s, FormatStyle::Default).expect("formatting to a String cannot fail");
  s
}

#[macro_export]
macro_rules! impl_display_debug_for_formattable {
    ($t:ty) => {
        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                <$t as $crate::core::format::Formattable>::repr(self, f, $crate::core::format::FormatStyle::Default)
            }
        }
    };
}
