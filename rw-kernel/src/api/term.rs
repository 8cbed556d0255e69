/*!

A `Term` is a concrete instance of the algebra described in the crate's top-level documentation: an atom (a number,
a string, or an interned symbolic name) or an application of a head term to zero or more argument terms.

Example: a symbol `f` and a symbol `x` can be used to form the term `f[f[x], x]`. Terms are plain, immutable,
owned trees — there is no DAG sharing, no garbage collector, and no notion of sort or type beyond the four
variants below. Structural equality and a memoized structural hash are the only two derived operations the rest of
the crate (the matcher, the rule index, the normalizer) relies on.

*/

use std::fmt;

use once_cell::unsync::OnceCell;
use rw_abs::IString;

use crate::{
  core::format::{FormatStyle, Formattable},
  impl_display_debug_for_formattable,
};

/// A term in the rewriting algebra.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
  /// An IEEE double. Integer-valued doubles render without a fractional part (see `Formattable`).
  Num(f64),
  /// An arbitrary Unicode string, compared byte-exact.
  Str(String),
  /// An interned name. See [`Term::sym`] for the sub-forms (`:attr`, `module/qualified`, built-ins).
  Sym(IString),
  /// A compound term: a head (itself any term) applied to an ordered list of arguments.
  Call(CallNode),
}

/// The payload of [`Term::Call`], factored out so its memoized hash cache doesn't have to be
/// threaded through every match arm that doesn't care about it.
#[derive(Clone)]
pub struct CallNode {
  pub head: Box<Term>,
  pub args: Vec<Term>,
  hash_cache: OnceCell<u64>,
}

impl CallNode {
  fn new(head: Term, args: Vec<Term>) -> Self {
    CallNode { head: Box::new(head), args, hash_cache: OnceCell::new() }
  }
}

// The memoized hash cache is purely derived state; two `CallNode`s with the same head/args are
// equal regardless of whether either has computed and cached its hash yet.
impl PartialEq for CallNode {
  fn eq(&self, other: &Self) -> bool {
    self.head == other.head && self.args == other.args
  }
}

impl fmt::Debug for CallNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CallNode").field("head", &self.head).field("args", &self.args).finish()
  }
}

impl Term {
  pub fn num(n: f64) -> Term {
    Term::Num(n)
  }

  pub fn str(s: impl Into<String>) -> Term {
    Term::Str(s.into())
  }

  /// Constructs a `Sym`. Accepts sub-forms such as `:attr`,
  /// `module/qualified`, and built-in names without special-casing them here — they are
  /// distinguished only by the shape of the name string, inspected where it matters (the
  /// primitive folder, the printer).
  pub fn sym(name: impl Into<IString>) -> Term {
    Term::Sym(name.into())
  }

  pub fn call(head: Term, args: Vec<Term>) -> Term {
    Term::Call(CallNode::new(head, args))
  }

  /// Convenience for the overwhelmingly common case of a symbol applied to arguments, e.g.
  /// `Term::apply("Add", vec![Term::num(2.0), Term::num(3.0)])`.
  pub fn apply(head: impl Into<IString>, args: Vec<Term>) -> Term {
    Term::call(Term::sym(head), args)
  }

  /// The canonical pattern-variable form, `Var["name"]`. `"_"` is the wildcard.
  pub fn pattern_var(name: impl Into<String>) -> Term {
    Term::apply("Var", vec![Term::str(name.into())])
  }

  /// The canonical sequence-variable form, `VarRest["name"]`.
  pub fn pattern_rest(name: impl Into<String>) -> Term {
    Term::apply("VarRest", vec![Term::str(name.into())])
  }

  pub fn head(&self) -> Option<&Term> {
    match self {
      Term::Call(c) => Some(&c.head),
      _ => None,
    }
  }

  pub fn args(&self) -> &[Term] {
    match self {
      Term::Call(c) => &c.args,
      _ => &[],
    }
  }

  /// The symbolic name at the head of a call whose head is itself a plain `Sym`, i.e. the common
  /// case the rule index and primitive folder dispatch on. `None` for atoms or for calls whose
  /// head is itself a compound term.
  pub fn head_sym(&self) -> Option<&IString> {
    match self {
      Term::Call(c) => match c.head.as_ref() {
        Term::Sym(s) => Some(s),
        _ => None,
      },
      _ => None,
    }
  }

  /// Structural equality. `Term` already derives `PartialEq` with exactly
  /// this meaning; this method exists so call sites can write `a.equal(&b)` in prose form,
  /// and so the memoized hash cache is visibly irrelevant to the comparison.
  pub fn equal(&self, other: &Term) -> bool {
    self == other
  }

  /// A stable, memoized structural hash. FNV-1a over a variant-tagged
  /// traversal, masked to 53 bits — a concession to hosts where integers above 2^53 lose
  /// precision, kept here so hash values stay comparable across
  /// a JSON round-trip.
  pub fn hash(&self) -> u64 {
    const MASK_53: u64 = (1u64 << 53) - 1;
    match self {
      Term::Num(n) => fnv1a_bytes(fnv1a_tag(0), &n.to_bits().to_le_bytes()) & MASK_53,
      Term::Str(s) => fnv1a_bytes(fnv1a_tag(1), s.as_bytes()) & MASK_53,
      Term::Sym(s) => fnv1a_bytes(fnv1a_tag(2), s.as_bytes()) & MASK_53,
      Term::Call(c) => *c.hash_cache.get_or_init(|| {
        let mut h = fnv1a_tag(3);
        h = fnv1a_bytes(h, &c.head.hash().to_le_bytes());
        for arg in &c.args {
          h = fnv1a_bytes(h, &arg.hash().to_le_bytes());
        }
        h & MASK_53
      }),
    }
  }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_tag(tag: u8) -> u64 {
  fnv1a_bytes(FNV_OFFSET_BASIS, &[tag])
}

fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
  for &byte in bytes {
    hash ^= byte as u64;
    hash = hash.wrapping_mul(FNV_PRIME);
  }
  hash
}

impl Formattable for Term {
  fn repr(&self, out: &mut dyn fmt::Write, style: FormatStyle) -> fmt::Result {
    match self {
      Term::Num(n) => {
        if n.fract() == 0.0 && n.is_finite() {
          write!(out, "{}", *n as i64)
        } else {
          write!(out, "{}", n)
        }
      }
      Term::Str(s) => {
        if style == FormatStyle::Simple {
          write!(out, "{}", s)
        } else {
          write!(out, "{:?}", s)
        }
      }
      Term::Sym(s) => write!(out, "{}", s),
      Term::Call(c) => {
        let is_empty_head = matches!(c.head.as_ref(), Term::Sym(s) if s.is_empty());
        if is_empty_head {
          out.write_str("{")?;
        } else {
          c.head.repr(out, style)?;
          out.write_str("[")?;
        }
        for (i, arg) in c.args.iter().enumerate() {
          if i > 0 {
            out.write_str(", ")?;
          }
          arg.repr(out, style)?;
        }
        out.write_str(if is_empty_head { "}" } else { "]" })
      }
    }
  }
}

impl_display_debug_for_formattable!(Term);
