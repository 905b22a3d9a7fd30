use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::Value;

/// Column names of a result set, shared by every row it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    names: Vec<String>,
    // name -> last index carrying it
    index: HashMap<String, usize>,
}

impl ColumnNames {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.insert(name.clone(), i);
        }
        Self { names, index }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A row keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRow {
    columns: Arc<ColumnNames>,
    values: Vec<Value>,
}

impl NamedRow {
    #[must_use]
    pub fn new(columns: Arc<ColumnNames>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value from the row by column name; a repeated name resolves to its last column
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.columns
            .position(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &ColumnNames {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Serializes as an object. A repeated column name keeps its last value.
impl Serialize for NamedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.index.len()))?;
        for (i, (name, value)) in self.columns.iter().zip(&self.values).enumerate() {
            if self.columns.position(name) == Some(i) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// One result row, shaped by the statement's raw/pluck mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Default shape: values addressable by column name.
    Named(NamedRow),
    /// Raw mode: values in column order.
    Raw(Vec<Value>),
    /// Pluck mode: the first column only.
    Plucked(Value),
}

impl Row {
    /// Look up a column by name. Only named rows carry names.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        match self {
            Row::Named(row) => row.get(column_name),
            Row::Raw(_) | Row::Plucked(_) => None,
        }
    }

    /// Look up a column by position. A plucked row only has index 0.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Named(row) => row.get_by_index(index),
            Row::Raw(values) => values.get(index),
            Row::Plucked(value) => (index == 0).then_some(value),
        }
    }

    #[must_use]
    pub fn as_named(&self) -> Option<&NamedRow> {
        if let Row::Named(row) = self {
            Some(row)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_raw(&self) -> Option<&[Value]> {
        if let Row::Raw(values) = self {
            Some(values)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_plucked(&self) -> Option<&Value> {
        if let Row::Plucked(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Values in column order, whatever the shape.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Row::Named(row) => row.into_values(),
            Row::Raw(values) => values,
            Row::Plucked(value) => vec![value],
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Row::Named(row) => row.serialize(serializer),
            Row::Raw(values) => values.serialize(serializer),
            Row::Plucked(value) => value.serialize(serializer),
        }
    }
}
