//! End-to-end scenarios against the public API, one universe dispatch at a time, rather than the
//! bare `normalize` calls the unit tests beside each module exercise. S1-S6 mirror `spec.md` §8's
//! literal-input scenarios; the last two cover the universal invariants the scenarios don't.

use rw_kernel::core::fresh::FreshIdSource;
use rw_kernel::core::normalize::{normalize, NormalizeConfig, RuntimeContext};
use rw_kernel::core::rule::Rule;
use rw_kernel::core::rule_index::RuleIndex;
use rw_kernel::core::universe::Universe;
use rw_kernel::api::term::Term;

fn blank_runtime() -> (FreshIdSource, rand::rngs::SmallRng) {
  use rand::SeedableRng;
  (FreshIdSource::default(), rand::rngs::SmallRng::seed_from_u64(7))
}

fn run(term: Term, rules: &RuleIndex, config: &NormalizeConfig) -> (Term, rw_kernel::core::normalize::NormalizeOutcome) {
  let (ids, mut rng) = blank_runtime();
  let mut rt = RuntimeContext { fresh_ids: &ids, rng: &mut rng };
  normalize(term, rules, config, &mut rt).unwrap()
}

#[test]
fn s1_arithmetic_fold() {
  let rules = RuleIndex::build(vec![]);
  let (result, outcome) = run(Term::apply("Add", vec![Term::num(2.0), Term::num(3.0)]), &rules, &NormalizeConfig::default());
  assert_eq!(result, Term::num(5.0));
  assert!(!outcome.limit_exceeded);
}

fn program_with_count(n: f64) -> Term {
  Term::apply(
    "Universe",
    vec![Term::apply(
      "Program",
      vec![Term::apply(
        "App",
        vec![
          Term::apply("State", vec![Term::apply("Count", vec![Term::num(n)])]),
          Term::apply("UI", vec![]),
        ],
      )],
    )],
  )
}

fn inc_rule() -> Rule {
  let lhs = Term::apply(
    "Apply",
    vec![
      Term::sym("Inc"),
      Term::apply(
        "Program",
        vec![Term::apply(
          "App",
          vec![
            Term::apply("State", vec![Term::apply("Count", vec![Term::pattern_var("n")])]),
            Term::pattern_rest("rest"),
          ],
        )],
      ),
    ],
  );
  let rhs = Term::apply(
    "Program",
    vec![Term::apply(
      "App",
      vec![
        Term::apply("State", vec![Term::apply("Count", vec![Term::apply("Add", vec![Term::pattern_var("n"), Term::num(1.0)])])]),
        Term::pattern_rest("rest"),
      ],
    )],
  );
  Rule { name: "Inc".into(), lhs, rhs, guard: None, priority: 0, scope: None, declaration_order: 0 }
}

#[test]
fn s2_counter_increment() {
  let universe = Universe::new(program_with_count(4.0), 0).unwrap();
  let rules = RuleIndex::build(vec![inc_rule()]);
  let (universe, outcome) = universe.dispatch(&rules, Term::sym("Inc"), &NormalizeConfig::default()).unwrap();
  assert!(!outcome.limit_exceeded);
  let expected = program_with_count(5.0).args()[0].clone();
  assert_eq!(universe.get_program(), Some(&expected));
}

#[test]
fn s3_sequence_splice() {
  let lhs = Term::apply("List", vec![Term::pattern_rest("xs")]);
  let rhs = Term::apply("List", vec![Term::num(0.0), Term::pattern_rest("xs")]);
  let rule = Rule { name: "AddFront".into(), lhs, rhs, guard: None, priority: 0, scope: None, declaration_order: 0 };
  let rules = RuleIndex::build(vec![rule]);

  let (result, _) = run(Term::apply("List", vec![Term::num(1.0), Term::num(2.0), Term::num(3.0)]), &rules, &NormalizeConfig::default());
  assert_eq!(result, Term::apply("List", vec![Term::num(0.0), Term::num(1.0), Term::num(2.0), Term::num(3.0)]));
}

#[test]
fn s4_priority_picks_higher_priority_rule_and_trace_names_only_it() {
  let lhs = Term::apply("Foo", vec![Term::num(1.0)]);
  let rule_a = Rule { name: "A".into(), lhs: lhs.clone(), rhs: Term::sym("a"), guard: None, priority: 10, scope: None, declaration_order: 0 };
  let rule_b = Rule { name: "B".into(), lhs, rhs: Term::sym("b"), guard: None, priority: 0, scope: None, declaration_order: 1 };
  let rules = RuleIndex::build(vec![rule_b, rule_a]);

  let config = NormalizeConfig { step_budget: 10_000, capture_trace: true };
  let (result, outcome) = run(Term::apply("Foo", vec![Term::num(1.0)]), &rules, &config);
  assert_eq!(result, Term::sym("a"));
  let trace = outcome.trace.unwrap();
  assert_eq!(trace.len(), 1);
  assert_eq!(trace[0].rule_name, "A");
}

#[test]
fn s5_guard_skips_rule_and_division_by_zero_is_left_alone() {
  let lhs = Term::apply("Div", vec![Term::pattern_var("x"), Term::pattern_var("y")]);
  let guard = Term::apply("Not", vec![Term::apply("Eq", vec![Term::pattern_var("y"), Term::num(0.0)])]);
  let rhs = Term::apply("Div", vec![Term::pattern_var("x"), Term::pattern_var("y")]);
  let rule = Rule { name: "Div".into(), lhs, rhs, guard: Some(guard), priority: 0, scope: None, declaration_order: 0 };
  let rules = RuleIndex::build(vec![rule]);

  let (ok, _) = run(Term::apply("Div", vec![Term::num(6.0), Term::num(2.0)]), &rules, &NormalizeConfig::default());
  assert_eq!(ok, Term::num(3.0));

  let (refused, _) = run(Term::apply("Div", vec![Term::num(6.0), Term::num(0.0)]), &rules, &NormalizeConfig::default());
  assert_eq!(refused, Term::apply("Div", vec![Term::num(6.0), Term::num(0.0)]));
}

#[test]
fn s6_meta_rule_rewrites_the_increment_step_before_dispatch() {
  use rw_kernel::core::rule_rules::{apply_rule_rules, MetaConfig};

  let original_inc = Term::apply(
    "R",
    vec![
      Term::str("Inc"),
      inc_rule().lhs,
      Term::apply(
        "Program",
        vec![Term::apply(
          "App",
          vec![
            Term::apply("State", vec![Term::apply("Count", vec![Term::apply("Add", vec![Term::pattern_var("n"), Term::num(1.0)])])]),
            Term::pattern_rest("rest"),
          ],
        )],
      ),
    ],
  );
  let rules_section = Term::apply("Rules", vec![original_inc]);

  let meta_lhs = Term::apply("Add", vec![Term::pattern_var("n"), Term::num(1.0)]);
  let meta_rhs = Term::apply("Add", vec![Term::pattern_var("n"), Term::num(2.0)]);
  let rule_rules_section = Term::apply("RuleRules", vec![Term::apply("R", vec![Term::str("DoubleIncStep"), meta_lhs, meta_rhs])]);

  let (ids, mut rng) = blank_runtime();
  let mut rt = RuntimeContext { fresh_ids: &ids, rng: &mut rng };
  let transformed = apply_rule_rules(&rules_section, &rule_rules_section, &MetaConfig::default(), &mut rt).unwrap();
  let rules = RuleIndex::from_rules_section(&transformed).unwrap();

  let universe = Universe::new(program_with_count(4.0), 0).unwrap();
  let (universe, outcome) = universe.dispatch(&rules, Term::sym("Inc"), &NormalizeConfig::default()).unwrap();
  assert!(!outcome.limit_exceeded);
  assert_eq!(universe.get_program(), Some(&program_with_count(6.0).args()[0].clone()));
}

/// Testable property 2: normalizing an already-normal term is a no-op.
#[test]
fn fixed_point_stability() {
  let rules = RuleIndex::build(vec![inc_rule()]);
  let term = Term::apply("Add", vec![Term::num(2.0), Term::num(3.0)]);
  let (once, _) = run(term, &rules, &NormalizeConfig::default());
  let (twice, _) = run(once.clone(), &rules, &NormalizeConfig::default());
  assert_eq!(once, twice);
}

/// Testable property 5: each step's `after` matches the next step's `before` under structural
/// equality, and the very first `before` matches the input term.
#[test]
fn trace_steps_chain_by_structural_equality() {
  let lhs = Term::apply("Step", vec![Term::pattern_var("n")]);
  let rhs = Term::apply("Step", vec![Term::apply("Add", vec![Term::pattern_var("n"), Term::num(1.0)])]);
  let rule = Rule { name: "Step".into(), lhs, rhs, guard: None, priority: 0, scope: None, declaration_order: 0 };
  let rules = RuleIndex::build(vec![rule]);

  let config = NormalizeConfig { step_budget: 20, capture_trace: true };
  let input = Term::apply("Step", vec![Term::num(0.0)]);
  let (_result, outcome) = run(input.clone(), &rules, &config);
  let trace = outcome.trace.unwrap();
  assert!(trace.len() > 1);
  assert!(trace[0].before.equal(&input));
  for pair in trace.windows(2) {
    assert!(pair[0].after.equal(&pair[1].before));
  }
}
