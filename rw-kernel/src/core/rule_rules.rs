/*!

The meta-layer (`spec.md` §4.6): at universe load, the `Rules` section is rewritten exactly once
by treating it as an ordinary term and normalizing it against a rule index built from the
`RuleRules` section. This lets a universe author express rule-generating macros — a `RuleRule`
whose LHS matches the shape of an `R[...]` call and whose RHS emits an expanded one — without the
main normalization loop ever seeing `RuleRules` itself.

`RuleRules` is discarded after this pass succeeds; the transformed `Rules` section is the
effective rule set for every subsequent `normalize` call for the lifetime of the universe.

*/

use crate::api::error::KernelError;
use crate::api::term::Term;
use crate::core::normalize::{normalize, NormalizeConfig, RuntimeContext};
use crate::core::rule_index::RuleIndex;

#[derive(Clone, Copy, Debug)]
pub struct MetaConfig {
  /// A generous budget for the one-shot meta-pass — overrun is a configuration error
  /// (`spec.md` §4.6/§7), not a recoverable runtime condition, so this is deliberately much larger
  /// than a typical runtime `NormalizeConfig::step_budget`.
  pub budget: u64,
}

impl Default for MetaConfig {
  fn default() -> Self {
    MetaConfig { budget: 100_000 }
  }
}

/// Rewrites `rules_section` against the rule set described by `rule_rules_section`, once.
///
/// If `rule_rules_section` contains no rules, `rules_section` is returned unchanged (Testable
/// Property 7: applying the pass with an empty `RuleRules` is the identity, so doing it twice —
/// once with content, once without — agrees with doing it once).
pub fn apply_rule_rules(
  rules_section: &Term,
  rule_rules_section: &Term,
  config: &MetaConfig,
  runtime: &mut RuntimeContext,
) -> Result<Term, KernelError> {
  let meta_index = RuleIndex::from_rules_section(rule_rules_section)?;
  if meta_index.is_empty() {
    rw_abs::debug!(1, "rule_rules: RuleRules section has no rules, Rules section passes through unchanged");
    return Ok(rules_section.clone());
  }

  rw_abs::info!(1, "rule_rules: running one-shot meta-pass, budget {}", config.budget);
  let normalize_config = NormalizeConfig { step_budget: config.budget, capture_trace: false };
  let (result, outcome) = normalize(rules_section.clone(), &meta_index, &normalize_config, runtime)?;
  if outcome.limit_exceeded {
    rw_abs::critical!(0, "rule_rules: meta-pass exceeded its budget of {} steps", config.budget);
    return Err(KernelError::MetaPassBudgetExceeded { budget: config.budget });
  }
  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::fresh::FreshIdSource;
  use rand::SeedableRng;

  fn runtime() -> (FreshIdSource, rand::rngs::SmallRng) {
    (FreshIdSource::default(), rand::rngs::SmallRng::seed_from_u64(0))
  }

  #[test]
  fn empty_rule_rules_is_identity() {
    let rules = Term::apply(
      "Rules",
      vec![Term::apply("R", vec![Term::str("Inc"), Term::pattern_var("n"), Term::pattern_var("n")])],
    );
    let rule_rules = Term::apply("RuleRules", vec![]);
    let (ids, mut rng) = runtime();
    let mut rt = RuntimeContext { fresh_ids: &ids, rng: &mut rng };
    let result = apply_rule_rules(&rules, &rule_rules, &MetaConfig::default(), &mut rt).unwrap();
    assert_eq!(result, rules);
  }

  /// S6: `RuleRules` rewrites the literal `Num(1)` inside any `R[...]` named `"Inc"` into `Num(2)`.
  #[test]
  fn s6_meta_rule_doubles_increment_step() {
    let original_inc = Term::apply(
      "R",
      vec![
        Term::str("Inc"),
        Term::apply(
          "Apply",
          vec![Term::sym("Inc"), Term::apply("State", vec![Term::apply("Count", vec![Term::pattern_var("n")])])],
        ),
        Term::apply(
          "State",
          vec![Term::apply("Count", vec![Term::apply("Add", vec![Term::pattern_var("n"), Term::num(1.0)])])],
        ),
      ],
    );
    let rules_section = Term::apply("Rules", vec![original_inc]);

    // The meta-pass traverses the whole `Rules` term, so it finds `Add[n, 1]` wherever it's
    // nested — here, inside the body of the rule named `"Inc"` — without needing to pattern-match
    // the enclosing `R[...]` shape at all.
    let meta_lhs = Term::apply("Add", vec![Term::pattern_var("n"), Term::num(1.0)]);
    let meta_rhs = Term::apply("Add", vec![Term::pattern_var("n"), Term::num(2.0)]);
    let meta_rule = Term::apply("R", vec![Term::str("DoubleIncStep"), meta_lhs, meta_rhs]);
    let rule_rules_section = Term::apply("RuleRules", vec![meta_rule]);

    let (ids, mut rng) = runtime();
    let mut rt = RuntimeContext { fresh_ids: &ids, rng: &mut rng };
    let transformed = apply_rule_rules(&rules_section, &rule_rules_section, &MetaConfig::default(), &mut rt).unwrap();

    let rules = RuleIndex::from_rules_section(&transformed).unwrap();
    let term = Term::apply(
      "Apply",
      vec![Term::sym("Inc"), Term::apply("State", vec![Term::apply("Count", vec![Term::num(4.0)])])],
    );
    let config = NormalizeConfig::default();
    let (ids2, mut rng2) = runtime();
    let mut rt2 = RuntimeContext { fresh_ids: &ids2, rng: &mut rng2 };
    let (result, _) = normalize(term, &rules, &config, &mut rt2).unwrap();
    assert_eq!(result, Term::apply("State", vec![Term::apply("Count", vec![Term::num(6.0)])]));
  }

  #[test]
  fn budget_overrun_is_a_fatal_configuration_error() {
    let rules_section = Term::apply("Rules", vec![Term::apply("Loop", vec![])]);
    let meta_lhs = Term::apply("Loop", vec![]);
    let meta_rhs = Term::apply("Loop", vec![Term::sym("More")]);
    let meta_rule_1 = Term::apply("R", vec![Term::str("Grow"), meta_lhs, meta_rhs]);
    let meta_lhs2 = Term::apply("Loop", vec![Term::pattern_var("x")]);
    let meta_rhs2 = Term::apply("Loop", vec![]);
    let meta_rule_2 = Term::apply("R", vec![Term::str("Shrink"), meta_lhs2, meta_rhs2]);
    let rule_rules_section = Term::apply("RuleRules", vec![meta_rule_1, meta_rule_2]);

    let (ids, mut rng) = runtime();
    let mut rt = RuntimeContext { fresh_ids: &ids, rng: &mut rng };
    let config = MetaConfig { budget: 20 };
    let err = apply_rule_rules(&rules_section, &rule_rules_section, &config, &mut rt).unwrap_err();
    assert!(matches!(err, KernelError::MetaPassBudgetExceeded { budget: 20 }));
  }
}
