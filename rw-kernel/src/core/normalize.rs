/*!

The normalization driver: reduces a term to a fixed point under a rule index and
the primitive folder, innermost-leftmost, to a caller-provided step budget, with optional trace
capture.

The traversal is a recursive post-order walk that stops at
the *first* node it finds that rewrites — one full traversal finding one rewrite ends that step —
and splices just that one replacement back up to the root before the
next traversal begins. `path` tracks the route from the root as a list of [`PathStep`]s purely for
trace reporting.

*/

use rw_abs::IString;

use crate::api::error::KernelError;
use crate::api::term::Term;
use crate::core::fresh::FreshIdSource;
use crate::core::pattern::match_pattern;
use crate::core::primitives::{fold, PrimitiveContext};
use crate::core::rule::Rule;
use crate::core::rule_index::RuleIndex;
use crate::core::substitution::subst;

/// One step from a term to its (boxed) head, or to the `n`th argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStep {
  Head,
  Arg(usize),
}

#[derive(Clone, Debug)]
pub struct TraceStep {
  pub index: u64,
  pub rule_name: String,
  pub path_in_term: Vec<PathStep>,
  pub before: Term,
  pub after: Term,
}

#[derive(Clone, Copy, Debug)]
pub struct NormalizeConfig {
  /// Caller-provided upper bound on rewrite steps. Default 10 000.
  pub step_budget: u64,
  pub capture_trace: bool,
}

impl Default for NormalizeConfig {
  fn default() -> Self {
    NormalizeConfig { step_budget: 10_000, capture_trace: false }
  }
}

#[derive(Clone, Debug, Default)]
pub struct NormalizeOutcome {
  pub trace: Option<Vec<TraceStep>>,
  pub limit_exceeded: bool,
}

/// The mutable handles a normalization run needs beyond the rule index and term: the seeded PRNG
/// and fresh-id counter that back `Random`/`FreshId`.
pub struct RuntimeContext<'a> {
  pub fresh_ids: &'a FreshIdSource,
  pub rng: &'a mut rand::rngs::SmallRng,
}

/// Reduces `term` to a fixed point under `rules`.
pub fn normalize(
  mut term: Term,
  rules: &RuleIndex,
  config: &NormalizeConfig,
  runtime: &mut RuntimeContext,
) -> Result<(Term, NormalizeOutcome), KernelError> {
  let mut trace: Option<Vec<TraceStep>> = if config.capture_trace { Some(Vec::new()) } else { None };
  let mut steps_taken: u64 = 0;

  loop {
    if steps_taken >= config.step_budget {
      rw_abs::warning!(1, "normalize: step budget of {} exhausted", config.step_budget);
      return Ok((term, NormalizeOutcome { trace, limit_exceeded: true }));
    }

    let mut path = Vec::new();
    let mut prim_ctx = PrimitiveContext { fresh_ids: runtime.fresh_ids, rng: &mut *runtime.rng };
    match try_step(&term, &mut path, None, rules, config, &mut prim_ctx)? {
      None => return Ok((term, NormalizeOutcome { trace, limit_exceeded: false })),
      Some(StepRewrite { new_term, rule_name, before, after }) => {
        // Testable Property: a step that produces a term structurally equal to the input is
        // treated as no-rewrite, so a folder that (mis-)emits its own input can't loop forever.
        if new_term.equal(&term) {
          return Ok((term, NormalizeOutcome { trace, limit_exceeded: false }));
        }
        rw_abs::debug!(2, "normalize: step {} applied `{}` at {:?}", steps_taken, rule_name, path);
        if let Some(t) = trace.as_mut() {
          t.push(TraceStep { index: steps_taken, rule_name, path_in_term: path, before, after });
        }
        term = new_term;
        steps_taken += 1;
      }
    }
  }
}

struct StepRewrite {
  new_term: Term,
  rule_name: String,
  before: Term,
  after: Term,
}

/// Walks `term` in post-order looking for the first node that rewrites (via primitive fold or a
/// matching rule), and returns the whole term with just that node replaced. `None` means `term`
/// is already a fixed point. `enclosing_head` is the head symbol of the `Call` that directly
/// contains `term` (if any and if concrete), used to honor a rule's `:scope` restriction.
fn try_step(
  term: &Term,
  path: &mut Vec<PathStep>,
  enclosing_head: Option<&IString>,
  rules: &RuleIndex,
  config: &NormalizeConfig,
  prim_ctx: &mut PrimitiveContext,
) -> Result<Option<StepRewrite>, KernelError> {
  if let Term::Call(c) = term {
    let own_head = match c.head.as_ref() {
      Term::Sym(s) => Some(s),
      _ => None,
    };

    path.push(PathStep::Head);
    if let Some(rewrite) = try_step(&c.head, path, own_head, rules, config, prim_ctx)? {
      path.pop();
      let new_head = rewrite.new_term;
      let new_term = Term::call(new_head, c.args.clone());
      return Ok(Some(StepRewrite { new_term, ..rewrite }));
    }
    path.pop();

    for (i, arg) in c.args.iter().enumerate() {
      path.push(PathStep::Arg(i));
      if let Some(rewrite) = try_step(arg, path, own_head, rules, config, prim_ctx)? {
        path.pop();
        let mut new_args = c.args.clone();
        new_args[i] = rewrite.new_term;
        let new_term = Term::call((*c.head).clone(), new_args);
        return Ok(Some(StepRewrite { new_term, ..rewrite }));
      }
      path.pop();
    }
  }

  try_rewrite_node(term, enclosing_head, rules, config, prim_ctx)
}

/// Tries to rewrite `term` itself (not its children): first the primitive folder, then the rule
/// index in priority order.
fn try_rewrite_node(
  term: &Term,
  enclosing_head: Option<&IString>,
  rules: &RuleIndex,
  config: &NormalizeConfig,
  prim_ctx: &mut PrimitiveContext,
) -> Result<Option<StepRewrite>, KernelError> {
  if let Term::Call(c) = term {
    if let Term::Sym(head_sym) = c.head.as_ref() {
      if c.args.iter().all(is_ground_atom) {
        if let Some(folded) = fold(head_sym.as_ref(), &c.args, prim_ctx) {
          if !folded.equal(term) {
            return Ok(Some(StepRewrite {
              new_term: folded.clone(),
              rule_name: "<prim>".to_string(),
              before: term.clone(),
              after: folded,
            }));
          }
        }
      }
    }
  }

  let head_opt = match term {
    Term::Call(c) => match c.head.as_ref() {
      Term::Sym(s) => Some(s),
      _ => None,
    },
    _ => None,
  };
  let arity = term.args().len();

  for candidate in rules.candidates(head_opt, arity) {
    // Scope restriction (`spec.md` §4.4): a `:scope S` rule is only a candidate when the call
    // directly containing this rewrite site has head symbol `S`. Advisory only — correctness
    // doesn't depend on it, so an unscoped rule (the overwhelming majority) skips this check.
    if let Some(scope_sym) = &candidate.scope {
      if enclosing_head != Some(scope_sym) {
        continue;
      }
    }
    let Some(bindings) = match_pattern(&candidate.lhs, term) else { continue };
    if !guard_holds(&candidate, &bindings, rules, config, prim_ctx)? {
      continue;
    }
    let replaced = subst(&candidate.rhs, &bindings, &candidate.name)?;
    if !replaced.equal(term) {
      return Ok(Some(StepRewrite {
        new_term: replaced.clone(),
        rule_name: candidate.name.clone(),
        before: term.clone(),
        after: replaced,
      }));
    }
  }

  Ok(None)
}

fn is_ground_atom(t: &Term) -> bool {
  matches!(t, Term::Num(_) | Term::Str(_) | Term::Sym(_))
}

/// Evaluates a rule's guard, if any, against the candidate bindings (`spec.md` §4.5/§9): the
/// guard template is substituted, then normalized in a nested call sharing the same rule set but
/// with an independent, smaller budget (`budget / 10`, minimum 1) and no trace capture. Any
/// outcome other than the literal symbol `True` — including budget exhaustion mid-reduction, and
/// any fatal error raised while reducing the guard term itself (`spec.md` §7's "Guard
/// normalization failure" is its own taxonomy entry, distinct from an ordinary binding miss or
/// malformed rule) — is treated as guard failure, not as an error, so a candidate whose guard
/// happens to trip over an unrelated rule's problem is simply skipped rather than aborting the
/// whole outer `normalize` call.
fn guard_holds(
  rule: &Rule,
  bindings: &crate::core::pattern::Bindings,
  rules: &RuleIndex,
  config: &NormalizeConfig,
  prim_ctx: &mut PrimitiveContext,
) -> Result<bool, KernelError> {
  let Some(guard) = &rule.guard else { return Ok(true) };
  let instantiated = subst(guard, bindings, &rule.name)?;
  let nested_config = NormalizeConfig { step_budget: (config.step_budget / 10).max(1), capture_trace: false };
  let mut runtime = RuntimeContext { fresh_ids: prim_ctx.fresh_ids, rng: &mut *prim_ctx.rng };
  match normalize(instantiated, rules, &nested_config, &mut runtime) {
    Ok((result, _outcome)) => Ok(matches!(result, Term::Sym(s) if s.as_ref() == "True")),
    Err(err) => {
      rw_abs::debug!(2, "normalize: guard of rule `{}` failed to reduce ({}), treating as false", rule.name, err);
      Ok(false)
    }
  }
}
