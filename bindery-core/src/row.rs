use crate::{AsValue, Error, Result, Value};
use std::sync::Arc;

/// Shared reference-counted column label list. One allocation per result
/// shape, shared by every [`Row`] materialized from the same cursor.
pub type RowNames = Arc<[String]>;

/// An ordered, name-indexed container of column values.
///
/// Insertion order is the result-set column order and is significant. Label
/// lookup is case-insensitive, matching the loose label normalization of
/// database drivers. A `Row` is a mutable builder while it is being filled
/// and a plain value object once handed to the caller; it holds no reference
/// back to the cursor that produced it.
#[derive(Debug, Clone, Default)]
pub struct Row {
    labels: RowNames,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(labels: RowNames, values: Vec<Value>) -> Self {
        debug_assert_eq!(labels.len(), values.len());
        Self { labels, values }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.eq_ignore_ascii_case(label))
    }

    /// Overwrite the value of an existing column or append a new one at the
    /// end, preserving the order of everything already present.
    pub fn set(&mut self, label: &str, value: impl Into<Value>) {
        match self.position(label) {
            Some(i) => self.values[i] = value.into(),
            None => {
                let mut labels: Vec<String> = self.labels.to_vec();
                labels.push(label.to_owned());
                self.labels = labels.into();
                self.values.push(value.into());
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.position(label).map(|i| &self.values[i])
    }

    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Typed retrieval by name. Missing column or failed coercion is an
    /// error; a NULL decodes only into types that accept it (`Option`).
    pub fn value<T: AsValue>(&self, label: &str) -> Result<T> {
        match self.get(label) {
            Some(v) => T::try_from_value(v.clone()),
            None => Err(Error::msg(format!("no such column: `{label}`"))),
        }
    }

    /// Typed retrieval by name with an explicit default for NULL or missing.
    pub fn value_or<T: AsValue>(&self, label: &str, default: T) -> Result<T> {
        match self.get(label) {
            Some(v) if !v.is_null() => T::try_from_value(v.clone()),
            _ => Ok(default),
        }
    }

    /// Typed retrieval by zero-based column position.
    pub fn value_at<T: AsValue>(&self, index: usize) -> Result<T> {
        match self.get_at(index) {
            Some(v) => T::try_from_value(v.clone()),
            None => Err(Error::msg(format!("no column at index {index}"))),
        }
    }
}
