/*!

A monotonically increasing counter backing the `FreshId` primitive, confined here to
per-universe instance state rather than a process-wide `static`, so that `normalize` stays a
pure function of its explicit inputs.

*/

use std::cell::Cell;

/// Generates ids of the form `"id$<n>"`, unique within the owning [`Universe`](crate::core::universe::Universe).
#[derive(Default, Clone, Debug)]
pub struct FreshIdSource {
  counter: Cell<u64>,
}

impl FreshIdSource {
  pub fn next(&self) -> String {
    let n = self.counter.get();
    self.counter.set(n + 1);
    format!("id${n}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_unique_and_increasing() {
    let src = FreshIdSource::default();
    assert_eq!(src.next(), "id$0");
    assert_eq!(src.next(), "id$1");
  }
}
