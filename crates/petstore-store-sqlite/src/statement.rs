//! Parameterised SQL assembly for partial updates and `IN (...)` predicates.
//!
//! Nothing here touches a connection; the output is statement text plus
//! positional arguments in matching order.

use petstore_core::pet::Id;
use rusqlite::types::Value;

/// A ready-to-run statement: SQL text and its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub sql:  String,
  pub args: Vec<Value>,
}

/// Builds `UPDATE <table> SET a = ?1, b = ?2 WHERE <key> = ?3`, emitting an
/// assignment only for fields that were actually supplied.
///
/// Empty strings and zero ids count as not supplied, so a field can never be
/// cleared through this builder.
#[derive(Debug)]
pub struct UpdateBuilder {
  table:   &'static str,
  columns: Vec<&'static str>,
  args:    Vec<Value>,
}

impl UpdateBuilder {
  pub fn new(table: &'static str) -> Self {
    Self { table, columns: Vec::new(), args: Vec::new() }
  }

  pub fn set_text(mut self, column: &'static str, value: Option<&str>) -> Self {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
      self.columns.push(column);
      self.args.push(Value::Text(v.to_owned()));
    }
    self
  }

  pub fn set_id(mut self, column: &'static str, value: Option<Id>) -> Self {
    if let Some(v) = value.filter(|v| *v != 0) {
      self.columns.push(column);
      self.args.push(Value::Integer(v));
    }
    self
  }

  /// Unlike [`set_id`](Self::set_id), zero is a real value here.
  pub fn set_int(mut self, column: &'static str, value: Option<i64>) -> Self {
    if let Some(v) = value {
      self.columns.push(column);
      self.args.push(Value::Integer(v));
    }
    self
  }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  /// Finish with the required `WHERE key = ?` predicate. Returns `None` when
  /// no field was supplied.
  pub fn build(self, key: &'static str, key_value: impl Into<Value>) -> Option<Statement> {
    if self.is_empty() {
      return None;
    }

    let assignments = self
      .columns
      .iter()
      .enumerate()
      .map(|(i, col)| format!("{col} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let key_param = self.columns.len() + 1;

    let mut args = self.args;
    args.push(key_value.into());

    Some(Statement {
      sql: format!("UPDATE {} SET {assignments} WHERE {key} = ?{key_param}", self.table),
      args,
    })
  }
}

/// `count` numbered placeholders for an `IN` list, starting at `?first`.
pub fn placeholders(first: usize, count: usize) -> String {
  (first..first + count)
    .map(|n| format!("?{n}"))
    .collect::<Vec<_>>()
    .join(", ")
}
