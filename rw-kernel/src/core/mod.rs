/*!

The kernel's component modules (A-G):

- [`format`] — the `Formattable` trait backing `Term`'s `Display`/`Debug`.
- [`pattern`] — the matcher (B).
- [`substitution`] — substitution & splicing (C).
- [`rule`] / [`rule_index`] — the rule store & index (D).
- [`primitives`] / [`fresh`] — the primitive folder and its `FreshId` counter (§6.3).
- [`normalize`] — the normalization driver (E).
- [`rule_rules`] — the meta-layer (F).
- [`universe`] — universe plumbing & dispatch (G).

*/

pub mod format;
pub mod fresh;
pub mod normalize;
pub mod pattern;
pub mod primitives;
pub mod rule;
pub mod rule_index;
pub mod rule_rules;
pub mod substitution;
pub mod universe;
