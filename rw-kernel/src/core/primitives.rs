/*!

The primitive folder: the kernel's pre-rule reduction of arithmetic, comparison, boolean, string,
type-test, and list-cell built-ins on fully-constant sub-terms (`spec.md` §6.3).

A fold fires only when every argument of a call is already a ground atom of the expected kind; a
mis-typed or partially-reduced call is left alone so rules can still match it (`spec.md` §6.3,
and see scenario S5: `Div[6, 0]` folds to nothing, and the `Div` guard rule doesn't fire either,
so the term is simply left as `Div[6, 0]`).

`Random` and `FreshId` are the two folders that need access to per-universe mutable state (a
seeded PRNG and a monotonic counter respectively); see `spec.md` §9 and `SPEC_FULL.md` §4.7 for why
that state lives on [`crate::core::universe::Universe`] rather than behind a process global.
*/

use rand::Rng;

use crate::api::term::Term;
use crate::core::fresh::FreshIdSource;

/// Mutable, per-universe state the folder needs for the two non-pure-looking-but-actually-seeded
/// built-ins, `Random` and `FreshId`.
pub struct PrimitiveContext<'a> {
  pub fresh_ids: &'a FreshIdSource,
  pub rng: &'a mut rand::rngs::SmallRng,
}

/// Attempts to fold `head` applied to `args`, where every element of `args` is known to already
/// be in normal form (post-order traversal guarantees this — see `crate::core::normalize`).
/// Returns `None` if the call isn't a recognized built-in, or its arguments aren't of the
/// expected ground shape, leaving the node for rule matching.
pub fn fold(head: &str, args: &[Term], ctx: &mut PrimitiveContext) -> Option<Term> {
  match head {
    // Arithmetic
    "Add" => num2(args, |a, b| Some(a + b)),
    "Sub" => num2(args, |a, b| Some(a - b)),
    "Mul" => num2(args, |a, b| Some(a * b)),
    "Div" => num2(args, |a, b| if b == 0.0 { None } else { Some(a / b) }),
    "Mod" => num2(args, |a, b| if b == 0.0 { None } else { Some(a % b) }),
    "Pow" => num2(args, |a, b| Some(a.powf(b))),
    "Sqrt" => num1(args, |a| Some(a.sqrt())),
    "Abs" => num1(args, |a| Some(a.abs())),
    "Min" => num2(args, |a, b| Some(a.min(b))),
    "Max" => num2(args, |a, b| Some(a.max(b))),
    "Floor" => num1(args, |a| Some(a.floor())),
    "Ceil" => num1(args, |a| Some(a.ceil())),
    "Round" => num1(args, |a| Some(a.round())),

    // Comparisons
    "Eq" => Some(bool_term(terms_eq(args)?)),
    "Neq" => Some(bool_term(!terms_eq(args)?)),
    "Lt" => num2_bool(args, |a, b| a < b),
    "Gt" => num2_bool(args, |a, b| a > b),
    "Lte" => num2_bool(args, |a, b| a <= b),
    "Gte" => num2_bool(args, |a, b| a >= b),

    // Boolean
    "And" => bool2(args, |a, b| a && b),
    "Or" => bool2(args, |a, b| a || b),
    "Not" => bool1(args, |a| !a),

    // Strings
    "Concat" => strn(args).map(|ss| Term::str(ss.concat())),
    "ToString" => to_string_fold(args),
    "ToUpper" => str1(args, |s| s.to_uppercase()),
    "ToLower" => str1(args, |s| s.to_lowercase()),
    "Trim" => str1(args, |s| s.trim().to_string()),
    "StrLen" => strlen(args),
    "Substring" => substring(args),
    "IndexOf" => index_of(args),
    "Replace" => replace(args),
    "CharFromCode" => char_from_code(args),

    // Type tests
    "IsNum" => Some(bool_term(matches!(args, [Term::Num(_)]))),
    "IsStr" => Some(bool_term(matches!(args, [Term::Str(_)]))),
    "IsSym" => Some(bool_term(matches!(args, [Term::Sym(_)]))),
    "IsTrue" => Some(bool_term(is_sym(args, "True"))),
    "IsFalse" => Some(bool_term(is_sym(args, "False"))),
    "IsNil" => Some(bool_term(is_nil(args))),

    // Conditional
    "If" => if_fold(args),

    // Misc
    "Random" => random(args, ctx),
    "ParseNum" => parse_num(args),
    "FreshId" => fresh_id(args, ctx),

    _ => None,
  }
}

fn as_num(t: &Term) -> Option<f64> {
  match t {
    Term::Num(n) => Some(*n),
    _ => None,
  }
}

fn as_str(t: &Term) -> Option<&str> {
  match t {
    Term::Str(s) => Some(s.as_str()),
    _ => None,
  }
}

fn num1(args: &[Term], f: impl FnOnce(f64) -> Option<f64>) -> Option<Term> {
  match args {
    [a] => f(as_num(a)?).map(Term::Num),
    _ => None,
  }
}

fn num2(args: &[Term], f: impl FnOnce(f64, f64) -> Option<f64>) -> Option<Term> {
  match args {
    [a, b] => f(as_num(a)?, as_num(b)?).map(Term::Num),
    _ => None,
  }
}

fn num2_bool(args: &[Term], f: impl FnOnce(f64, f64) -> bool) -> Option<Term> {
  match args {
    [a, b] => Some(bool_term(f(as_num(a)?, as_num(b)?))),
    _ => None,
  }
}

fn bool_of(t: &Term) -> Option<bool> {
  match t {
    Term::Sym(s) if s.as_ref() == "True" => Some(true),
    Term::Sym(s) if s.as_ref() == "False" => Some(false),
    _ => None,
  }
}

fn bool_term(b: bool) -> Term {
  Term::sym(if b { "True" } else { "False" })
}

fn bool1(args: &[Term], f: impl FnOnce(bool) -> bool) -> Option<Term> {
  match args {
    [a] => Some(bool_term(f(bool_of(a)?))),
    _ => None,
  }
}

fn bool2(args: &[Term], f: impl FnOnce(bool, bool) -> bool) -> Option<Term> {
  match args {
    [a, b] => Some(bool_term(f(bool_of(a)?, bool_of(b)?))),
    _ => None,
  }
}

fn terms_eq(args: &[Term]) -> Option<bool> {
  match args {
    [a, b] => Some(a.equal(b)),
    _ => None,
  }
}

fn strn(args: &[Term]) -> Option<Vec<&str>> {
  args.iter().map(as_str).collect()
}

fn str1(args: &[Term], f: impl FnOnce(&str) -> String) -> Option<Term> {
  match args {
    [a] => Some(Term::str(f(as_str(a)?))),
    _ => None,
  }
}

/// `ToString` accepts any ground atom, not just strings.
fn to_string_fold(args: &[Term]) -> Option<Term> {
  match args {
    [Term::Num(n)] => Some(Term::str(crate::core::format::show(&Term::Num(*n)))),
    [Term::Str(s)] => Some(Term::str(s.clone())),
    [Term::Sym(s)] => Some(Term::str(s.to_string())),
    _ => None,
  }
}

fn strlen(args: &[Term]) -> Option<Term> {
  match args {
    [a] => Some(Term::Num(as_str(a)?.chars().count() as f64)),
    _ => None,
  }
}

fn substring(args: &[Term]) -> Option<Term> {
  match args {
    [a, start, end] => {
      let s = as_str(a)?;
      let chars: Vec<char> = s.chars().collect();
      let start = as_num(start)? as usize;
      let end = as_num(end)? as usize;
      if start > end || end > chars.len() {
        return None;
      }
      Some(Term::str(chars[start..end].iter().collect::<String>()))
    }
    _ => None,
  }
}

fn index_of(args: &[Term]) -> Option<Term> {
  match args {
    [haystack, needle] => {
      let haystack = as_str(haystack)?;
      let needle = as_str(needle)?;
      match haystack.find(needle) {
        Some(byte_idx) => Some(Term::Num(haystack[..byte_idx].chars().count() as f64)),
        None => Some(Term::Num(-1.0)),
      }
    }
    _ => None,
  }
}

fn replace(args: &[Term]) -> Option<Term> {
  match args {
    [a, from, to] => {
      let s = as_str(a)?;
      let from = as_str(from)?;
      let to = as_str(to)?;
      Some(Term::str(s.replace(from, to)))
    }
    _ => None,
  }
}

fn char_from_code(args: &[Term]) -> Option<Term> {
  match args {
    [a] => {
      let code = as_num(a)? as u32;
      let c = char::from_u32(code)?;
      Some(Term::str(c.to_string()))
    }
    _ => None,
  }
}

fn is_sym(args: &[Term], name: &str) -> bool {
  matches!(args, [Term::Sym(s)] if s.as_ref() == name)
}

fn is_nil(args: &[Term]) -> bool {
  match args {
    [Term::Sym(s)] => s.as_ref() == "Nil",
    _ => false,
  }
}

fn if_fold(args: &[Term]) -> Option<Term> {
  match args {
    [cond, then_branch, else_branch] => match bool_of(cond)? {
      true => Some(then_branch.clone()),
      false => Some(else_branch.clone()),
    },
    _ => None,
  }
}

fn random(args: &[Term], ctx: &mut PrimitiveContext) -> Option<Term> {
  match args {
    [] => Some(Term::Num(ctx.rng.gen::<f64>())),
    [bound] => {
      let bound = as_num(bound)?;
      if bound <= 0.0 {
        return None;
      }
      Some(Term::Num(ctx.rng.gen_range(0.0..bound)))
    }
    _ => None,
  }
}

fn parse_num(args: &[Term]) -> Option<Term> {
  match args {
    [a] => as_str(a)?.trim().parse::<f64>().ok().map(Term::Num),
    _ => None,
  }
}

fn fresh_id(args: &[Term], ctx: &mut PrimitiveContext) -> Option<Term> {
  match args {
    [] => Some(Term::str(ctx.fresh_ids.next())),
    _ => None,
  }
}
