/*!

`Term`'s wire format: a tagged JSON tree,

```json
{"k": "Num", "v": 42}
{"k": "Str", "v": "..."}
{"k": "Sym", "v": "Name"}
{"k": "Call", "h": <node>, "a": [<node>, ...]}
```

`Serialize`/`Deserialize` are hand-written rather than `#[derive]`d so the shape matches exactly —
in particular the reader leniency this format calls for: an absent or `null` `"h"` decodes as the
empty-head call (`Term::Sym("")`, the same sentinel the printer special-cases to `{}`), and an
absent `"a"` decodes as no arguments. Unknown keys are ignored — no other keys are defined.

*/

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::term::Term;

impl Serialize for Term {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Term::Num(n) => {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("k", "Num")?;
        map.serialize_entry("v", n)?;
        map.end()
      }
      Term::Str(s) => {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("k", "Str")?;
        map.serialize_entry("v", s)?;
        map.end()
      }
      Term::Sym(s) => {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("k", "Sym")?;
        map.serialize_entry("v", s.as_ref())?;
        map.end()
      }
      Term::Call(c) => {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("k", "Call")?;
        map.serialize_entry("h", c.head.as_ref())?;
        map.serialize_entry("a", &c.args)?;
        map.end()
      }
    }
  }
}

impl<'de> Deserialize<'de> for Term {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Term, D::Error> {
    let value = Value::deserialize(deserializer)?;
    term_from_value(&value).map_err(serde::de::Error::custom)
  }
}

fn term_from_value(value: &Value) -> Result<Term, String> {
  let obj = value.as_object().ok_or_else(|| "expected a JSON object".to_string())?;
  let kind = obj.get("k").and_then(Value::as_str).ok_or_else(|| "missing \"k\" tag".to_string())?;
  match kind {
    "Num" => {
      let n = obj.get("v").and_then(Value::as_f64).ok_or_else(|| "Num node missing numeric \"v\"".to_string())?;
      Ok(Term::num(n))
    }
    "Str" => {
      let s = obj.get("v").and_then(Value::as_str).ok_or_else(|| "Str node missing string \"v\"".to_string())?;
      Ok(Term::str(s))
    }
    "Sym" => {
      let s = obj.get("v").and_then(Value::as_str).ok_or_else(|| "Sym node missing string \"v\"".to_string())?;
      Ok(Term::sym(s))
    }
    "Call" => {
      let head = match obj.get("h") {
        None | Some(Value::Null) => Term::sym(""),
        Some(h) => term_from_value(h)?,
      };
      let args = match obj.get("a") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(term_from_value).collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err("Call node's \"a\" must be an array".to_string()),
      };
      Ok(Term::call(head, args))
    }
    other => Err(format!("unknown term kind \"{other}\"")),
  }
}

pub fn to_json_string(term: &Term) -> serde_json::Result<String> {
  serde_json::to_string(term)
}

pub fn from_json_str(s: &str) -> serde_json::Result<Term> {
  serde_json::from_str(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_all_variants() {
    let t = Term::apply("F", vec![Term::num(1.0), Term::str("x"), Term::sym("y")]);
    let json = to_json_string(&t).unwrap();
    assert_eq!(from_json_str(&json).unwrap(), t);
  }

  #[test]
  fn accepts_null_head_as_empty_call() {
    let json = r#"{"k": "Call", "h": null, "a": [{"k": "Num", "v": 1}]}"#;
    let t = from_json_str(json).unwrap();
    assert_eq!(t, Term::call(Term::sym(""), vec![Term::num(1.0)]));
  }

  #[test]
  fn accepts_missing_a_as_no_arguments() {
    let json = r#"{"k": "Call", "h": {"k": "Sym", "v": "Nil"}}"#;
    let t = from_json_str(json).unwrap();
    assert_eq!(t, Term::apply("Nil", vec![]));
  }

  #[test]
  fn rejects_unknown_kind() {
    let json = r#"{"k": "Bogus"}"#;
    assert!(from_json_str(json).is_err());
  }
}
