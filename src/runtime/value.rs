use std::{fmt, rc::Rc};

use indexmap::IndexMap;

/// Data value read by references and written to the output surface.
///
/// ## Memory Management Model
///
/// Values use `Rc` for heap-allocated variants (String, Array, Object) while
/// keeping primitives unboxed. Values are immutable once built; updates go
/// through a [`Model`](crate::runtime::model::Model) which swaps in a new value
/// and stamps a revision, so cloning a value is always O(1).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of value. Renders as the empty string.
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    /// Object with keys kept in insertion order.
    Object(Rc<IndexMap<Rc<str>, Value>>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_value())
    }
}

impl Value {
    /// Returns the runtime type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Template truthiness: `null`, `false`, zero, the empty string and the
    /// empty array are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(v) => *v,
            Value::Integer(v) => *v != 0,
            Value::Float(v) => *v != 0.0 && !v.is_nan(),
            Value::String(v) => !v.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Change check used before writing output or bumping a revision.
    ///
    /// Same as `==` except that floats compare by bit pattern, so `NaN` is the
    /// same as itself and `0.0` differs from `-0.0`.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same(y)))
            }
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .all(|(key, x)| b.get(key).is_some_and(|y| x.same(y))))
            }
            _ => self == other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Reads one path segment.
    ///
    /// Objects are read by key, arrays by numeric index, and `length` is
    /// available on arrays and strings. Anything else yields `Null`.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(members) => members.get(key).cloned().unwrap_or(Value::Null),
            Value::Array(items) => {
                if key == "length" {
                    return Value::Integer(items.len() as i64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or(Value::Null)
            }
            Value::String(v) if key == "length" => Value::Integer(v.chars().count() as i64),
            _ => Value::Null,
        }
    }

    /// Returns a copy with `key` set, turning non-objects into an empty object.
    pub fn with_member(&self, key: &str, value: Value) -> Value {
        let mut members = match self {
            Value::Object(members) => members.as_ref().clone(),
            _ => IndexMap::new(),
        };
        members.insert(Rc::from(key), value);
        Value::Object(Rc::new(members))
    }

    /// Returns a copy with the value at `path` replaced, creating
    /// intermediate objects as needed. An empty path replaces the whole value.
    pub fn with_path(&self, path: &[&str], value: Value) -> Value {
        match path.split_first() {
            None => value,
            Some((head, rest)) => {
                let child = self.get(head).with_path(rest, value);
                self.with_member(head, child)
            }
        }
    }

    /// Converts this value to text as written into the output surface.
    ///
    /// Unlike [`Value::to_json`], `Null` becomes the empty string and strings
    /// are returned without quotes.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::String(v) => v.to_string(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string_value()).collect();
                parts.join(",")
            }
            Value::Object(_) => self.to_json().to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(v) => serde_json::Value::Bool(*v),
            Value::Integer(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(v) => serde_json::Value::String(v.to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(members) => serde_json::Value::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Boolean(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Value::Integer(v),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(v) => Value::String(Rc::from(v)),
            serde_json::Value::Array(items) => {
                Value::Array(Rc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(members) => Value::Object(Rc::new(
                members
                    .into_iter()
                    .map(|(k, v)| (Rc::from(k), Value::from(v)))
                    .collect(),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Rc::from(v))
    }
}

impl From<Rc<str>> for Value {
    fn from(v: Rc<str>) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }
}

impl<K: Into<Rc<str>>> FromIterator<(K, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Value::Object(Rc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }
}
