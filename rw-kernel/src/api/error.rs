/*!

The error taxonomy the kernel surfaces to callers. Only the *fatal* conditions are
represented here and propagated as `Result::Err`; the two non-fatal conditions (step-budget
exhaustion, guard-normalization failure) are reported through the return value of `normalize`
instead (see [`crate::core::normalize::NormalizeOutcome`]), treating them as
ordinary, expected outcomes rather than errors.

*/

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
  /// A rule lacks a name/lhs/rhs, or uses `VarRest` outside an argument list. Fatal at
  /// rule-index build time, or when `subst` discovers a misplaced `VarRest` while applying a
  /// matched rule's replacement template.
  #[error("malformed rule `{rule_name}`: {reason}")]
  MalformedRule { rule_name: String, reason: String },

  /// A replacement template referenced a pattern-variable name the left-hand side never
  /// captured. Fatal to the current rewrite; the driver aborts normalization.
  #[error("rule `{rule_name}` references unbound variable `{var_name}`")]
  BindingMiss { rule_name: String, var_name: String },

  /// `dispatch` was asked to act on a `Universe` whose `Program` is missing or doesn't contain
  /// the expected `App[State[...], UI[...]]` structure.
  #[error("missing Program/App structure: {detail}")]
  MissingProgramStructure { detail: String },

  /// The one-shot `RuleRules` pass exceeded its budget. Treated as a
  /// configuration error, not a recoverable condition, because a non-terminating meta-rule set
  /// means the universe was authored wrong, not that normalization ran out of room at runtime.
  #[error("RuleRules pass exceeded its budget of {budget} steps")]
  MetaPassBudgetExceeded { budget: u64 },
}
