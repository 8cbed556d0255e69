/*!

Applies a [`Bindings`] map captured by the matcher to a replacement template, producing a concrete
term (`spec.md` §4.3). `Var["name"]` forms are replaced by their binding; `VarRest["name"]` forms
are *spliced* into the surrounding argument list rather than substituted as a single element, so
no `VarRest` wrapper ever appears in the output (Testable Property 3).

*/

use rw_abs::IString;

use crate::api::error::KernelError;
use crate::api::term::Term;
use crate::core::pattern::{Binding, Bindings};

/// An intermediate result of substituting one template sub-term: either an ordinary term, or a
/// sequence of terms that must be spliced into whatever argument list contains it. This is
/// flattened away before `subst` returns; it never escapes this module.
enum Spliced {
  One(Term),
  Many(Vec<Term>),
}

/// Substitutes `bindings` into `template`, returning the concrete replacement term.
///
/// Fails with [`KernelError::BindingMiss`] if the template references a name the pattern never
/// captured — an author error in the rule, per `spec.md` §4.3/§7.
pub fn subst(template: &Term, bindings: &Bindings, rule_name: &str) -> Result<Term, KernelError> {
  match subst_one(template, bindings, rule_name)? {
    Spliced::One(t) => Ok(t),
    Spliced::Many(_) => {
      // A bare `VarRest` at the template's root, outside any argument list. `spec.md` §4.3:
      // "A VarRest appearing outside an argument list is an error."
      Err(KernelError::MalformedRule {
        rule_name: rule_name.to_string(),
        reason: "VarRest appears outside an argument list".to_string(),
      })
    }
  }
}

fn subst_one(template: &Term, bindings: &Bindings, rule_name: &str) -> Result<Spliced, KernelError> {
  if let Some(name) = simple_var_name(template) {
    return lookup_one(name, bindings, rule_name).map(Spliced::One);
  }
  if rest_var_name(template).is_some() {
    // A lone `VarRest` outside of an argument list is only legal as the direct root of `subst`,
    // which we can't distinguish here; `subst_args` intercepts it before recursing into this
    // function, so reaching this point with a `VarRest` always means it's misplaced.
    let name = rest_var_name(template).unwrap();
    return lookup_many(name, bindings, rule_name).map(Spliced::Many);
  }

  match template {
    Term::Num(_) | Term::Str(_) | Term::Sym(_) => Ok(Spliced::One(template.clone())),
    Term::Call(c) => {
      let head = match subst_one(&c.head, bindings, rule_name)? {
        Spliced::One(t) => t,
        Spliced::Many(_) => {
          return Err(KernelError::MalformedRule {
            rule_name: rule_name.to_string(),
            reason: "VarRest appears as a call head".to_string(),
          })
        }
      };
      let args = subst_args(&c.args, bindings, rule_name)?;
      Ok(Spliced::One(Term::call(head, args)))
    }
  }
}

/// Substitutes an argument list, splicing any `VarRest` bindings in place.
fn subst_args(args: &[Term], bindings: &Bindings, rule_name: &str) -> Result<Vec<Term>, KernelError> {
  let mut out = Vec::with_capacity(args.len());
  for arg in args {
    if let Some(name) = rest_var_name(arg) {
      let seq = lookup_many(name, bindings, rule_name)?;
      out.extend(seq);
    } else {
      match subst_one(arg, bindings, rule_name)? {
        Spliced::One(t) => out.push(t),
        Spliced::Many(seq) => out.extend(seq),
      }
    }
  }
  Ok(out)
}

fn simple_var_name(template: &Term) -> Option<&str> {
  match template {
    Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == "Var") => {
      match c.args.as_slice() {
        [Term::Str(name)] => Some(name.as_str()),
        _ => None,
      }
    }
    _ => None,
  }
}

fn rest_var_name(template: &Term) -> Option<&str> {
  match template {
    Term::Call(c) if matches!(c.head.as_ref(), Term::Sym(s) if s.as_ref() == "VarRest") => {
      match c.args.as_slice() {
        [Term::Str(name)] => Some(name.as_str()),
        _ => None,
      }
    }
    _ => None,
  }
}

fn lookup_one(name: &str, bindings: &Bindings, rule_name: &str) -> Result<Term, KernelError> {
  match bindings.get(&IString::from(name)) {
    Some(Binding::One(t)) => Ok(t.clone()),
    Some(Binding::Many(_)) | None => Err(KernelError::BindingMiss {
      rule_name: rule_name.to_string(),
      var_name: name.to_string(),
    }),
  }
}

fn lookup_many(name: &str, bindings: &Bindings, rule_name: &str) -> Result<Vec<Term>, KernelError> {
  match bindings.get(&IString::from(name)) {
    Some(Binding::Many(ts)) => Ok(ts.to_vec()),
    Some(Binding::One(_)) | None => Err(KernelError::BindingMiss {
      rule_name: rule_name.to_string(),
      var_name: name.to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::pattern::match_pattern;

  #[test]
  fn simple_var_is_replaced() {
    let bindings = match_pattern(&Term::pattern_var("x"), &Term::num(5.0)).unwrap();
    let out = subst(&Term::pattern_var("x"), &bindings, "r").unwrap();
    assert_eq!(out, Term::num(5.0));
  }

  #[test]
  fn var_rest_splices_without_wrapper() {
    let pattern = Term::apply("List", vec![Term::pattern_rest("xs")]);
    let subject = Term::apply("List", vec![Term::num(1.0), Term::num(2.0), Term::num(3.0)]);
    let bindings = match_pattern(&pattern, &subject).unwrap();

    let template = Term::apply("List", vec![Term::num(0.0), Term::pattern_rest("xs")]);
    let out = subst(&template, &bindings, "AddFront").unwrap();
    assert_eq!(out, Term::apply("List", vec![Term::num(0.0), Term::num(1.0), Term::num(2.0), Term::num(3.0)]));
  }

  #[test]
  fn unbound_var_in_template_is_a_binding_miss() {
    let bindings = Bindings::new();
    let err = subst(&Term::pattern_var("nope"), &bindings, "R").unwrap_err();
    assert!(matches!(err, KernelError::BindingMiss { .. }));
  }
}
