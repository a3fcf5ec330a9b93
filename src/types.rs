use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or used as query parameters.
///
/// The same enum is used for bound values and for fetched record values:
/// ```rust
/// use sql_fluent::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::from("alice"),
///     RowValues::from(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // SQLite stores timestamps as text
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    /// Float view of the value; integers are widened so aggregates such as `AVG` over
    /// integer columns can be read uniformly.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<u32> for RowValues {
    fn from(value: u32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Values bound to a statement, in the placeholder convention the statement uses.
///
/// A statement never mixes conventions: `?` placeholders take `Positional` values in
/// emission order, `:name` placeholders take `Named` values keyed without the colon.
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    Positional(Vec<RowValues>),
    Named(Vec<(String, RowValues)>),
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings::Positional(Vec::new())
    }
}

impl Bindings {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Bindings::Positional(values) => values.len(),
            Bindings::Named(pairs) => pairs.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bound values in binding order, regardless of convention.
    #[must_use]
    pub fn values(&self) -> Vec<&RowValues> {
        match self {
            Bindings::Positional(values) => values.iter().collect(),
            Bindings::Named(pairs) => pairs.iter().map(|(_, value)| value).collect(),
        }
    }

    /// Look up a named binding (name given without the leading `:`).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        match self {
            Bindings::Positional(_) => None,
            Bindings::Named(pairs) => pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v),
        }
    }

    /// Placeholder names, in binding order. Empty for positional bindings.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Bindings::Positional(_) => Vec::new(),
            Bindings::Named(pairs) => pairs.iter().map(|(n, _)| n.as_str()).collect(),
        }
    }
}

impl From<Vec<RowValues>> for Bindings {
    fn from(values: Vec<RowValues>) -> Self {
        Bindings::Positional(values)
    }
}

impl From<Vec<(String, RowValues)>> for Bindings {
    fn from(pairs: Vec<(String, RowValues)>) -> Self {
        Bindings::Named(pairs)
    }
}

/// A query and its parameters bundled together.
///
/// This is what [`StatementBuilder::build`](crate::StatementBuilder::build) produces and
/// what the [`Database`](crate::Database) facade executes.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The parameters to be bound to the query
    pub params: Bindings,
}

impl QueryAndParams {
    pub fn new(query: impl Into<String>, params: impl Into<Bindings>) -> Self {
        Self {
            query: query.into(),
            params: params.into(),
        }
    }

    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Bindings::none(),
        }
    }
}
