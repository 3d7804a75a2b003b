use crate::{Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// How the statement's result rows are mapped back to the caller.
///
/// `Inferred` statements carry a single mapper-inferred result mapping and
/// are candidates for entity materialization; `Manual` statements have a
/// hand-authored mapping and are never intercepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultShape {
    #[default]
    Inferred,
    Manual,
}

/// One named parameter binding. The statement text refers to it as `:name`;
/// resolving placeholders against bindings is the execution layer's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

/// SQL text plus its ordered parameter bindings, ready for the execution
/// layer.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<Param>,
    pub shape: ResultShape,
}

impl Statement {
    pub fn new(kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            kind,
            sql: sql.into(),
            params: Vec::new(),
            shape: ResultShape::default(),
        }
    }

    /// Append a parameter binding.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.push(Param {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend reported generated key, when available.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
}
