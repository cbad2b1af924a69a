//! Cache key derivation.

use std::fmt::{self, Write};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::types::Parameters;

/// Identity of a call for caching purposes.
///
/// The canonical text of `(section, name, parameters)`: object keys are
/// sorted at every level and every string is quoted, so two keys are equal
/// exactly when the calls are. Argument maps that differ only in ordering
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Compute the key for a call.
    pub fn new(section: &str, name: &str, parameters: &Parameters) -> Self {
        let mut out = String::new();
        let _ = write!(out, "{section:?}.{name:?}");
        write_object(parameters, &mut out);
        Self(out.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_object(map: &Parameters, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    out.push('{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{key:?}:");
        write_value(&map[key.as_str()], out);
    }
    out.push('}');
}

// Writing into a `String` cannot fail, so `write!` results are discarded.
fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => {
            let _ = write!(out, "{s:?}");
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
    }
}
