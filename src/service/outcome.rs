//! Structured results of the write helpers.

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The inserted row as returned by the database.
    Inserted { pk: Value, row: Value },
    UniqueViolation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Value),
    NotFound,
    UniqueViolation,
    /// The primary key column was absent from the values.
    MissingKey(&'static str),
    /// Nothing besides the primary key was given.
    NoChanges,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Value),
    NotFound,
    /// Blocked by a constraint, e.g. a RESTRICT foreign key.
    UniqueViolation,
}

fn key_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertOutcome::Inserted { pk, .. } => write!(f, "inserted:{}", key_text(pk)),
            InsertOutcome::UniqueViolation => f.write_str("unique_violation"),
        }
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::Updated(_) => f.write_str("updated"),
            UpdateOutcome::NotFound => f.write_str("not_found"),
            UpdateOutcome::UniqueViolation => f.write_str("unique_violation"),
            UpdateOutcome::MissingKey(pk) => write!(f, "missing_{}", pk),
            UpdateOutcome::NoChanges => f.write_str("no_changes"),
        }
    }
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteOutcome::Deleted(pk) => write!(f, "{} is deleted", key_text(pk)),
            DeleteOutcome::NotFound => f.write_str("not_found"),
            DeleteOutcome::UniqueViolation => f.write_str("unique_violation"),
        }
    }
}
