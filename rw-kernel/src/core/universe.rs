/*!

Universe plumbing & dispatch (`spec.md` §4.7): the top-level `Universe[...]` container and the
handful of operations that find/replace its three recognized sections (`Program`, `Rules`,
`RuleRules`), run the meta-layer, and inject an action.

`Universe` also owns the two pieces of per-universe mutable state the primitive folder needs —
the fresh-id counter and a seeded PRNG (`SPEC_FULL.md` §4.7) — behind `Cell`/`RefCell` so the
section-transform methods below can keep the same `&self -> Universe` shape the rest of this
module uses, instead of forcing every caller through `&mut self`.

*/

use std::cell::RefCell;

use rand::SeedableRng;

use crate::api::error::KernelError;
use crate::api::term::Term;
use crate::core::fresh::FreshIdSource;
use crate::core::normalize::{normalize, NormalizeConfig, NormalizeOutcome, RuntimeContext};
use crate::core::rule_index::RuleIndex;
use crate::core::rule_rules::{self, MetaConfig};

#[derive(Clone, Debug)]
pub struct Universe {
  term: Term,
  fresh_ids: FreshIdSource,
  rng: RefCell<rand::rngs::SmallRng>,
}

const SECTION_NAMES: [&str; 3] = ["Program", "Rules", "RuleRules"];

impl Universe {
  /// Wraps `term` as a `Universe`, failing if its root isn't a `Universe[...]` call.
  /// `rng_seed` seeds the per-universe PRNG behind `Random` — the kernel never reaches for a
  /// process-global clock itself, so callers own reproducibility (`SPEC_FULL.md` §4.7).
  pub fn new(term: Term, rng_seed: u64) -> Result<Universe, KernelError> {
    if !is_universe_call(&term) {
      return Err(KernelError::MissingProgramStructure {
        detail: "root term is not a Universe[...] call".to_string(),
      });
    }
    Ok(Universe {
      term,
      fresh_ids: FreshIdSource::default(),
      rng: RefCell::new(rand::rngs::SmallRng::seed_from_u64(rng_seed)),
    })
  }

  pub fn as_term(&self) -> &Term {
    &self.term
  }

  pub fn into_term(self) -> Term {
    self.term
  }

  fn with_term(&self, term: Term) -> Universe {
    Universe { term, fresh_ids: self.fresh_ids.clone(), rng: RefCell::new(self.rng.borrow().clone()) }
  }

  fn section(&self, name: &str) -> Option<&Term> {
    self.term.args().iter().find(|t| has_head_sym(t, name))
  }

  fn with_section(&self, name: &str, new_section: Term) -> Universe {
    let mut sections: Vec<Term> = self.term.args().to_vec();
    match sections.iter().position(|t| has_head_sym(t, name)) {
      Some(pos) => sections[pos] = new_section,
      None => sections.push(new_section),
    }
    self.with_term(Term::apply("Universe", sections))
  }

  fn without_section(&self, name: &str) -> Universe {
    let sections: Vec<Term> = self.term.args().iter().filter(|t| !has_head_sym(t, name)).cloned().collect();
    self.with_term(Term::apply("Universe", sections))
  }

  pub fn get_program(&self) -> Option<&Term> {
    self.section("Program")
  }

  pub fn set_program(&self, program: Term) -> Universe {
    self.with_section("Program", program)
  }

  /// Builds a [`RuleIndex`] from the `Rules` section. A universe with no `Rules` section at all
  /// has an empty, always-inert index, not an error — a universe that relies purely on primitive
  /// folding is legal.
  pub fn extract_rules(&self) -> Result<RuleIndex, KernelError> {
    match self.section("Rules") {
      Some(rules_section) => RuleIndex::from_rules_section(rules_section),
      None => Ok(RuleIndex::default()),
    }
  }

  /// Runs the one-shot `RuleRules` pass (`spec.md` §4.6) and discards `RuleRules` afterward,
  /// whether or not it was present. Idempotent per Testable Property 7: a universe with no
  /// `RuleRules` section returns itself unchanged (modulo the no-op removal of a section that
  /// wasn't there).
  pub fn apply_rule_rules(&self, config: &MetaConfig) -> Result<Universe, KernelError> {
    let Some(rule_rules_section) = self.section("RuleRules") else { return Ok(self.clone()) };
    let rules_section = self.section("Rules").cloned().unwrap_or_else(|| Term::apply("Rules", vec![]));

    let mut rng_guard = self.rng.borrow_mut();
    let mut runtime = RuntimeContext { fresh_ids: &self.fresh_ids, rng: &mut *rng_guard };
    let transformed = rule_rules::apply_rule_rules(&rules_section, rule_rules_section, config, &mut runtime)?;
    drop(rng_guard);

    Ok(self.with_section("Rules", transformed).without_section("RuleRules"))
  }

  /// Ensures `Program` contains an `Effects[Pending[], Inbox[]]` scaffold, inserting it if
  /// absent. Idempotent (`spec.md` §4.7).
  pub fn enrich_program_with_effects(&self) -> Universe {
    let Some(program) = self.get_program() else { return self.clone() };
    let Term::Call(c) = program else { return self.clone() };
    if c.args.iter().any(|t| has_head_sym(t, "Effects")) {
      return self.clone();
    }
    let mut args = c.args.clone();
    args.push(Term::apply("Effects", vec![Term::apply("Pending", vec![]), Term::apply("Inbox", vec![])]));
    let new_program = Term::call((*c.head).clone(), args);
    self.set_program(new_program)
  }

  /// Injects `action` as `Apply[action, Program]` and normalizes it under `rules`, replacing
  /// `Program` with the result. Refuses (returning `Err` and leaving `self` untouched — the
  /// caller simply keeps its own copy) when `Program` is missing or doesn't contain
  /// `App[State[...], UI[...]]` (`spec.md` §4.7/§7).
  pub fn dispatch(
    &self,
    rules: &RuleIndex,
    action: Term,
    config: &NormalizeConfig,
  ) -> Result<(Universe, NormalizeOutcome), KernelError> {
    let program = self.get_program().ok_or_else(|| KernelError::MissingProgramStructure {
      detail: "Universe has no Program section".to_string(),
    })?;
    validate_program_shape(program)?;

    rw_abs::info!(1, "dispatch: injecting action {} into Program", action);
    let call_term = Term::apply("Apply", vec![action, program.clone()]);
    let mut rng_guard = self.rng.borrow_mut();
    let mut runtime = RuntimeContext { fresh_ids: &self.fresh_ids, rng: &mut *rng_guard };
    let (result, outcome) = normalize(call_term, rules, config, &mut runtime)?;
    drop(rng_guard);

    Ok((self.set_program(result), outcome))
  }
}

fn is_universe_call(term: &Term) -> bool {
  matches!(term.head_sym(), Some(s) if s.as_ref() == "Universe")
}

fn has_head_sym(term: &Term, name: &str) -> bool {
  matches!(term.head_sym(), Some(s) if s.as_ref() == name)
}

fn validate_program_shape(program: &Term) -> Result<(), KernelError> {
  let has_app = program.args().iter().any(|t| {
    has_head_sym(t, "App")
      && t.args().len() >= 2
      && has_head_sym(&t.args()[0], "State")
      && has_head_sym(&t.args()[1], "UI")
  });
  if has_app {
    Ok(())
  } else {
    Err(KernelError::MissingProgramStructure {
      detail: "Program does not contain App[State[...], UI[...]]".to_string(),
    })
  }
}
