#![allow(dead_code)]

/*!

A term-rewriting kernel for a symbolic "universe" language (`spec.md` §1): an algebraic term
tree, a pattern matcher with sequence variables, a priority-ordered rule index, an
innermost-leftmost normalization driver with step-budget safety and optional tracing, a one-shot
meta-layer that lets a universe rewrite its own rule set at load time, and the plumbing that wraps
all of it into dispatching actions against a `Universe[Program, Rules, RuleRules]` term.

Parsing, module linking, the effects bridge, and any CLI/REPL shell are deliberately out of
scope; this crate is a library with no binary target and no I/O of its own.

*/

pub mod api;
pub mod core;
