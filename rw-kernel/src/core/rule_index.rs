/*!

Holds [`Rule`]s indexed by `(head_sym, arity)`, pre-sorted by priority and declaration order, so
the normalization driver's candidate enumeration (`spec.md` §4.5) is a linear scan of an already
-ordered bucket (`spec.md` §4.4).

Rules whose left-hand side's head is not a concrete symbol (e.g. the head is itself a variable or
a compound term) go in a catch-all bucket consulted for every node, since there is no symbol to
key them on.

*/

use std::cmp::Reverse;
use std::collections::HashMap;
use std::rc::Rc;

use rw_abs::IString;

use crate::api::error::KernelError;
use crate::api::term::Term;
use crate::core::rule::Rule;

/// The arity a rule's left-hand side argument list is compatible with: exactly `n` arguments for
/// a fixed-arity pattern, or `n` or more when the pattern contains a `VarRest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArityClass {
  Fixed(usize),
  AtLeast(usize),
}

impl ArityClass {
  pub fn accepts(&self, actual: usize) -> bool {
    match self {
      ArityClass::Fixed(n) => actual == *n,
      ArityClass::AtLeast(n) => actual >= *n,
    }
  }

  fn of_pattern_args(args: &[Term]) -> ArityClass {
    let fixed_count = args.iter().filter(|a| !is_var_rest(a)).count();
    if fixed_count == args.len() {
      ArityClass::Fixed(fixed_count)
    } else {
      // One or more VarRest patterns; every non-VarRest argument must still be present, each
      // VarRest itself can take zero.
      ArityClass::AtLeast(fixed_count)
    }
  }
}

fn is_var_rest(t: &Term) -> bool {
  matches!(t, Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == "VarRest"))
}

#[derive(Default)]
pub struct RuleIndex {
  by_head: HashMap<(IString, ArityClass), Vec<Rc<Rule>>>,
  catch_all: Vec<Rc<Rule>>,
}

impl RuleIndex {
  /// Builds an index from already-parsed rules. Rules are grouped, then each group is sorted by
  /// `(Reverse(priority), declaration_order)` once up front (`spec.md` §3.3: "ties broken by
  /// declaration order (stable)", §4.4: "ordered by declared priority then declaration order").
  pub fn build(rules: Vec<Rule>) -> RuleIndex {
    let mut by_head: HashMap<(IString, ArityClass), Vec<Rc<Rule>>> = HashMap::new();
    let mut catch_all: Vec<Rc<Rule>> = Vec::new();

    for rule in rules {
      let rc = Rc::new(rule);
      match head_key(&rc.lhs) {
        Some(key) => by_head.entry(key).or_default().push(rc),
        None => catch_all.push(rc),
      }
    }

    for bucket in by_head.values_mut() {
      sort_bucket(bucket);
    }
    sort_bucket(&mut catch_all);

    rw_abs::debug!(1, "RuleIndex: indexed {} head buckets, {} catch-all rules", by_head.len(), catch_all.len());
    RuleIndex { by_head, catch_all }
  }

  /// Parses and indexes the `R[...]` calls found in `rules_section`'s argument list, in
  /// declaration order. Fatal on any malformed rule (`spec.md` §7).
  pub fn from_rules_section(rules_section: &Term) -> Result<RuleIndex, KernelError> {
    let mut rules = Vec::with_capacity(rules_section.args().len());
    for (i, item) in rules_section.args().iter().enumerate() {
      rules.push(Rule::from_term(item, i)?);
    }
    Ok(RuleIndex::build(rules))
  }

  /// Candidate rules for a node whose head is `head` (when concrete) applied to `arity`
  /// arguments, in firing-priority order across the matching `(head, arity-class)` bucket and the
  /// catch-all bucket together — a catch-all rule with a higher priority than a concrete-head
  /// match is still offered first (`spec.md` §8, Testable Property 4: priority ordering is a
  /// universal invariant with no bucket exception).
  pub fn candidates(&self, head: Option<&IString>, arity: usize) -> Vec<Rc<Rule>> {
    let mut out = Vec::new();
    if let Some(head) = head {
      for (key, bucket) in &self.by_head {
        if &key.0 == head && key.1.accepts(arity) {
          out.extend(bucket.iter().cloned());
        }
      }
    }
    out.extend(self.catch_all.iter().cloned());
    // Buckets are independently sorted; merge-sort the combined sequence by the same ordering key
    // so it is priority-ordered overall, regardless of which bucket each rule came from.
    out.sort_by_key(|r| (Reverse(r.priority), r.declaration_order));
    out
  }

  pub fn is_empty(&self) -> bool {
    self.by_head.is_empty() && self.catch_all.is_empty()
  }
}

fn sort_bucket(bucket: &mut [Rc<Rule>]) {
  bucket.sort_by_key(|r| (Reverse(r.priority), r.declaration_order));
}

fn head_key(lhs: &Term) -> Option<(IString, ArityClass)> {
  let Term::Call(c) = lhs else { return None };
  match c.head.as_ref() {
    Term::Sym(s) => Some((s.clone(), ArityClass::of_pattern_args(&c.args))),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rule(name: &str, lhs: Term, priority: i64, order: usize) -> Rule {
    Rule { name: name.to_string(), lhs, rhs: Term::sym("rhs"), guard: None, priority, scope: None, declaration_order: order }
  }

  #[test]
  fn priority_orders_candidates_before_declaration_order() {
    let lhs = Term::apply("Foo", vec![Term::num(1.0)]);
    let index = RuleIndex::build(vec![
      rule("B", lhs.clone(), 0, 0),
      rule("A", lhs.clone(), 10, 1),
    ]);
    let names: Vec<_> = index.candidates(Some(&IString::from("Foo")), 1).iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
  }

  #[test]
  fn var_rest_arity_accepts_at_least() {
    let lhs = Term::apply("List", vec![Term::pattern_rest("xs")]);
    let index = RuleIndex::build(vec![rule("AddFront", lhs, 0, 0)]);
    assert_eq!(index.candidates(Some(&IString::from("List")), 0).len(), 1);
    assert_eq!(index.candidates(Some(&IString::from("List")), 5).len(), 1);
  }

  /// A catch-all LHS per `spec.md` §4.4: the *call's own head* is itself a variable, not a
  /// concrete symbol (as opposed to `Var["anything"]`, which is an ordinary concrete-headed call
  /// with head symbol `Var` and lands in that bucket like any other).
  fn universal_head_lhs(name: &str) -> Term {
    Term::call(Term::pattern_var(name), vec![Term::num(1.0)])
  }

  #[test]
  fn catch_all_rule_outranks_a_lower_priority_concrete_head_rule() {
    let lhs = Term::apply("Foo", vec![Term::num(1.0)]);
    let index = RuleIndex::build(vec![
      rule("Concrete", lhs, 10, 0),
      rule("CatchAll", universal_head_lhs("h"), 100, 1),
    ]);
    let names: Vec<_> =
      index.candidates(Some(&IString::from("Foo")), 1).iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["CatchAll".to_string(), "Concrete".to_string()]);
  }

  #[test]
  fn catch_all_bucket_always_offered() {
    let index = RuleIndex::build(vec![rule("Universal", universal_head_lhs("h"), 0, 0)]);
    assert_eq!(index.candidates(Some(&IString::from("Whatever")), 3).len(), 1);
  }
}
