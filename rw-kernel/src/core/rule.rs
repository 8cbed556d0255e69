/*!

A [`Rule`] is a named, pattern-directed rewrite, optionally guarded and scoped, with a priority
that determines firing order among candidates that match the same node (`spec.md` §3.3).

Rules (and meta-rules, which share this same representation) are declared inside a universe as
`R[name, lhs, rhs, (:guard g)?, (:scope S)?, prio?]` calls (`spec.md` §3.4); [`Rule::from_term`]
parses that surface shape. Priorities default to `0`; positive priorities fire before `0`,
negative priorities are fallbacks, and ties break by declaration order (`spec.md` §3.3, §4.4).

*/

use rw_abs::IString;

use crate::api::error::KernelError;
use crate::api::term::Term;

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
  pub name: String,
  pub lhs: Term,
  pub rhs: Term,
  pub guard: Option<Term>,
  pub priority: i64,
  pub scope: Option<IString>,
  /// Position in the declaring `Rules`/`RuleRules` list; used only to break priority ties.
  pub declaration_order: usize,
}

impl Rule {
  /// Parses an `R[name, lhs, rhs, ...]` call into a [`Rule`].
  ///
  /// The first three positional arguments are always `name` (a `Str`), `lhs`, and `rhs`.
  /// Remaining arguments may appear in any order: `:guard[g]`, `:scope[S]`, or a bare `Num`
  /// giving the priority. Anything else is a malformed rule.
  pub fn from_term(term: &Term, declaration_order: usize) -> Result<Rule, KernelError> {
    let Term::Call(call) = term else {
      return Err(malformed("<unnamed>", "expected an R[...] call"));
    };
    let is_r_head = matches!(call.head.as_ref(), Term::Sym(s) if s.as_ref() == "R");
    if !is_r_head {
      return Err(malformed("<unnamed>", "expected head symbol `R`"));
    }

    let [name_term, lhs, rhs, rest @ ..] = call.args.as_slice() else {
      return Err(malformed("<unnamed>", "R[...] needs at least name, lhs, rhs"));
    };
    let Term::Str(name) = name_term else {
      return Err(malformed("<unnamed>", "rule name must be a string"));
    };

    let mut guard = None;
    let mut scope = None;
    let mut priority = 0i64;

    for extra in rest {
      match extra {
        Term::Num(n) => priority = *n as i64,
        Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == ":guard") => {
          guard = c.args.first().cloned();
        }
        Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == ":scope") => {
          match c.args.first() {
            Some(Term::Sym(s)) => scope = Some(s.clone()),
            _ => return Err(malformed(name, ":scope expects a single Sym argument")),
          }
        }
        _ => return Err(malformed(name, "unrecognized trailing argument to R[...]")),
      }
    }

    validate_pattern_shape(lhs, name)?;

    Ok(Rule {
      name: name.clone(),
      lhs: lhs.clone(),
      rhs: rhs.clone(),
      guard,
      priority,
      scope,
      declaration_order,
    })
  }
}

/// Rejects a `VarRest` appearing anywhere other than directly inside the argument list of a
/// `Call` (`spec.md` §4.2 point 3: "encountered standalone is a structural error in the rule"),
/// fatal at rule-index build time (`spec.md` §7). Mirrors the already-correct outside-arg-list
/// check `substitution.rs` performs on RHS templates at rewrite time, but catches the LHS shape
/// up front instead of letting it silently never match anything.
fn validate_pattern_shape(pattern: &Term, rule_name: &str) -> Result<(), KernelError> {
  if is_var_rest(pattern) {
    return Err(malformed(rule_name, "VarRest appears outside an argument list"));
  }
  if let Term::Call(c) = pattern {
    validate_pattern_shape(&c.head, rule_name)?;
    for arg in &c.args {
      if is_var_rest(arg) {
        continue;
      }
      validate_pattern_shape(arg, rule_name)?;
    }
  }
  Ok(())
}

fn is_var_rest(term: &Term) -> bool {
  matches!(term, Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == "VarRest"))
}

fn malformed(rule_name: &str, reason: &str) -> KernelError {
  KernelError::MalformedRule { rule_name: rule_name.to_string(), reason: reason.to_string() }
}
