use serde::{Deserialize, Serialize};

/// Largest integer an `f64` represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Values stored in a row or bound as statement parameters.
///
/// ```rust
/// use sql_facade::Value;
///
/// let params = vec![Value::from(1), Value::from("alice"), Value::from(true)];
/// assert_eq!(params[2], Value::Integer(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Integer value (64-bit)
    Integer(i64),
    /// Floating point value (64-bit)
    Real(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Numeric view of the value; integers are widened.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Apply the non-safe-integer representation: integers outside
    /// `±MAX_SAFE_INTEGER` degrade to floating point.
    #[must_use]
    pub(crate) fn into_unsafe_integer(self) -> Self {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) if !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) => {
                Value::Real(i as f64)
            }
            other => other,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Parameters bound to one execution of a statement.
///
/// Positional parameters fill `?`/`?NNN` slots in order. Named parameters are matched
/// against `:name`, `@name` and `$name`; the key may be given with or without its prefix.
///
/// ```rust
/// use sql_facade::{Params, Value};
///
/// let positional = Params::from([1, 2]);
/// let named = Params::named([("id", Value::from(7)), (":name", Value::from("bob"))]);
/// assert!(matches!(positional, Params::Positional(ref v) if v.len() == 2));
/// assert!(matches!(named, Params::Named(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Params {
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Params::None => true,
            Params::Positional(values) => values.is_empty(),
            Params::Named(pairs) => pairs.is_empty(),
        }
    }

    /// Look up a named value, ignoring any `:`/`@`/`$` prefix on either side.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let Params::Named(pairs) = self else {
            return None;
        };
        let wanted = strip_param_prefix(name);
        pairs
            .iter()
            .find(|(key, _)| strip_param_prefix(key) == wanted)
            .map(|(_, value)| value)
    }
}

/// Drop the leading `:`, `@` or `$` from a parameter name.
#[must_use]
pub fn strip_param_prefix(name: &str) -> &str {
    name.strip_prefix([':', '@', '$']).unwrap_or(name)
}

impl From<()> for Params {
    fn from((): ()) -> Self {
        Params::None
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Params {
    fn from(values: [T; N]) -> Self {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Params::Positional(vec![value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_integer_degrades_only_outside_safe_range() {
        assert_eq!(
            Value::Integer(MAX_SAFE_INTEGER).into_unsafe_integer(),
            Value::Integer(MAX_SAFE_INTEGER)
        );
        assert_eq!(
            Value::Integer(-MAX_SAFE_INTEGER).into_unsafe_integer(),
            Value::Integer(-MAX_SAFE_INTEGER)
        );
        assert!(matches!(
            Value::Integer(i64::MAX).into_unsafe_integer(),
            Value::Real(_)
        ));
        assert_eq!(Value::from("x").into_unsafe_integer(), Value::from("x"));
    }

    #[test]
    fn named_lookup_ignores_prefixes() {
        let params = Params::named([("$id", 1), ("name", 2)]);
        assert_eq!(params.lookup(":id"), Some(&Value::Integer(1)));
        assert_eq!(params.lookup("@name"), Some(&Value::Integer(2)));
        assert_eq!(params.lookup("missing"), None);
        assert_eq!(Params::from([1]).lookup("id"), None);
    }

    #[test]
    fn bool_binds_as_integer() {
        assert_eq!(Value::from(false), Value::Integer(0));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
