/*!

The pattern matcher: one-sided unification of a pattern term against a subject term, producing a
[`Bindings`] map on success (`spec.md` §4.2).

A pattern is an ordinary [`Term`] containing two distinguished forms, both produced by the (external) parser from
surface shorthands and recognized here purely by shape:

- `Var["name"]` — a simple pattern variable. Matches exactly one argument position.
- `VarRest["name"]` — a sequence pattern variable. Matches zero or more *consecutive* arguments inside the
  argument list of one `Call`; legal only there.

Matching never raises: a pattern/subject pair that doesn't unify simply yields `None`, so callers (the
normalization driver trying rule after rule) can move on to the next candidate without any special-casing.
*/

use std::collections::HashMap;

use rw_abs::IString;

use crate::api::term::Term;

/// What a captured name is bound to: a single term for `Var`, a sequence of terms for `VarRest`.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
  One(Term),
  Many(Vec<Term>),
}

impl Binding {
  pub fn as_one(&self) -> Option<&Term> {
    match self {
      Binding::One(t) => Some(t),
      Binding::Many(_) => None,
    }
  }

  pub fn as_many(&self) -> Option<&[Term]> {
    match self {
      Binding::Many(ts) => Some(ts),
      Binding::One(_) => None,
    }
  }
}

/// A flat, per-match namespace from captured names to their bindings (`spec.md` §4.2: "Pattern
/// variables captured inside a sub-call are scoped to the whole match").
pub type Bindings = HashMap<IString, Binding>;

const WILDCARD: &str = "_";

/// Attempts to match `pattern` against `subject`, returning the captured bindings on success.
pub fn match_pattern(pattern: &Term, subject: &Term) -> Option<Bindings> {
  let mut bindings = Bindings::new();
  if match_into(pattern, subject, &mut bindings) {
    Some(bindings)
  } else {
    None
  }
}

fn match_into(pattern: &Term, subject: &Term, bindings: &mut Bindings) -> bool {
  if let Some(name) = simple_var_name(pattern) {
    return bind_one(name, subject, bindings);
  }

  match (pattern, subject) {
    (Term::Num(a), Term::Num(b)) => a == b,
    (Term::Str(a), Term::Str(b)) => a == b,
    (Term::Sym(a), Term::Sym(b)) => a == b,
    (Term::Call(pc), Term::Call(sc)) => {
      if !match_into(&pc.head, &sc.head, bindings) {
        return false;
      }
      match_arg_sequence(&pc.args, &sc.args, bindings)
    }
    _ => false,
  }
}

/// Returns the captured name if `pattern` is a simple pattern variable `Var["name"]`.
fn simple_var_name(pattern: &Term) -> Option<&str> {
  match pattern {
    Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == "Var") => {
      match c.args.as_slice() {
        [Term::Str(name)] => Some(name.as_str()),
        _ => None,
      }
    }
    _ => None,
  }
}

/// Returns the captured name if `pattern` is a sequence pattern variable `VarRest["name"]`.
fn rest_var_name(pattern: &Term) -> Option<&str> {
  match pattern {
    Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == "VarRest") => {
      match c.args.as_slice() {
        [Term::Str(name)] => Some(name.as_str()),
        _ => None,
      }
    }
    _ => None,
  }
}

fn bind_one(name: &str, subject: &Term, bindings: &mut Bindings) -> bool {
  if name == WILDCARD {
    return true;
  }
  let key = IString::from(name);
  match bindings.get(&key) {
    Some(Binding::One(existing)) => existing == subject,
    Some(Binding::Many(_)) => false, // Same name used as both a scalar and sequence variable.
    None => {
      bindings.insert(key, Binding::One(subject.clone()));
      true
    }
  }
}

fn bind_many(name: &str, subjects: &[Term], bindings: &mut Bindings) -> bool {
  if name == WILDCARD {
    return true;
  }
  let key = IString::from(name);
  match bindings.get(&key) {
    Some(Binding::Many(existing)) => existing.as_slice() == subjects,
    Some(Binding::One(_)) => false,
    None => {
      bindings.insert(key, Binding::Many(subjects.to_vec()));
      true
    }
  }
}

/// Matches a pattern argument list against a subject argument list, handling zero or more
/// `VarRest` patterns with left-to-right backtracking (`spec.md` §4.2).
///
/// For each `VarRest` encountered, tries every span length from 0 upward and recurses on the
/// remainder; the first span whose remainder also matches wins. Plain patterns consume exactly
/// one subject element. A bindings snapshot is cloned before each trial so a failed trial doesn't
/// leave partial bindings behind.
fn match_arg_sequence(pats: &[Term], subs: &[Term], bindings: &mut Bindings) -> bool {
  match pats.split_first() {
    None => subs.is_empty(),
    Some((p, rest_pats)) => {
      if let Some(name) = rest_var_name(p) {
        for span in 0..=subs.len() {
          let mut trial = bindings.clone();
          let (taken, remainder) = subs.split_at(span);
          if bind_many(name, taken, &mut trial) && match_arg_sequence(rest_pats, remainder, &mut trial) {
            *bindings = trial;
            return true;
          }
        }
        false
      } else {
        match subs.split_first() {
          None => false,
          Some((s, rest_subs)) => {
            let mut trial = bindings.clone();
            if match_into(p, s, &mut trial) && match_arg_sequence(rest_pats, rest_subs, &mut trial) {
              *bindings = trial;
              true
            } else {
              false
            }
          }
        }
      }
    }
  }
}
