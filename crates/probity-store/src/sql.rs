//! Composable SQL fragments with positional parameters
//!
//! Fragments use anonymous `?` placeholders, so parameters are kept in the
//! same textual order as the SQL they belong to. Appending a fragment
//! appends its parameters.

use rusqlite::types::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    sql: String,
    params: Vec<Value>,
}

impl SqlFragment {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// A predicate that matches every row
    pub fn always() -> Self {
        Self::new("TRUE")
    }

    /// Append a parameter for a `?` already present in the SQL
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append SQL containing one `?` and its parameter
    pub fn push_bound(&mut self, sql: &str, value: impl Into<Value>) {
        self.sql.push_str(sql);
        self.params.push(value.into());
    }

    pub fn append(&mut self, other: SqlFragment) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    /// Conjunction of predicates, each wrapped in its own parentheses
    ///
    /// An empty input yields `TRUE`.
    pub fn and_all(parts: impl IntoIterator<Item = SqlFragment>) -> Self {
        let mut out = SqlFragment::default();
        for part in parts {
            if !out.sql.is_empty() {
                out.sql.push_str(" AND ");
            }
            out.sql.push('(');
            out.append(part);
            out.sql.push(')');
        }
        if out.sql.is_empty() {
            return Self::always();
        }
        out
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of `?` placeholders; used to check fragments stay in sync
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}
