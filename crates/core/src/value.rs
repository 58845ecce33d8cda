//! Positional query parameters and generated query fragments.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// A scalar bound to a positional placeholder (`$1`, `$2`, ...).
///
/// Values are never interpolated into query text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Convert a JSON scalar. Arrays and objects have no SQL scalar form.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => Some(Self::Null),
            JsonValue::Bool(b) => Some(Self::Bool(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().map(Self::Float),
            },
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A generated clause plus the parameters its placeholders refer to.
///
/// `params[i]` is bound to placeholder `$(i + 1)`. An empty `clause` means
/// "no constraint"; callers must then omit the surrounding keyword entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFragment {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

impl QueryFragment {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Position of the placeholder that follows this fragment's parameters.
    pub fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    /// Placeholder positions referenced by `clause`, in textual order.
    pub fn placeholders(&self) -> Vec<usize> {
        let bytes = self.clause.as_bytes();
        let mut out = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    if let Ok(n) = self.clause[start..end].parse() {
                        out.push(n);
                    }
                }
                i = end.max(start);
            } else {
                i += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_convert() {
        assert_eq!(SqlValue::from_json(&json!(null)), Some(SqlValue::Null));
        assert_eq!(SqlValue::from_json(&json!(true)), Some(SqlValue::Bool(true)));
        assert_eq!(SqlValue::from_json(&json!(32)), Some(SqlValue::Int(32)));
        assert_eq!(SqlValue::from_json(&json!(0.25)), Some(SqlValue::Float(0.25)));
        assert_eq!(
            SqlValue::from_json(&json!("Aliya")),
            Some(SqlValue::Text("Aliya".to_string()))
        );
    }

    #[test]
    fn json_containers_have_no_scalar_form() {
        assert_eq!(SqlValue::from_json(&json!([1, 2])), None);
        assert_eq!(SqlValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn none_becomes_null() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(5_i64)), SqlValue::Int(5));
    }

    #[test]
    fn placeholders_are_read_in_order() {
        let fragment = QueryFragment {
            clause: r#""name" ILIKE $1 AND "num_employees" >= $2"#.to_string(),
            params: vec![SqlValue::from("%a%"), SqlValue::from(3_i64)],
        };
        assert_eq!(fragment.placeholders(), vec![1, 2]);
        assert_eq!(fragment.next_placeholder(), 3);
    }
}
