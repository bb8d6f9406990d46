//! Column and schema definitions.

use crate::types::TypeId;
use serde::{Deserialize, Serialize};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub type_id: TypeId,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
        }
    }
}

/// An ordered list of columns describing a tuple layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema from a list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column at the given index.
    pub fn column(&self, idx: usize) -> &Column {
        &self.columns[idx]
    }

    /// Finds a column index by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Builds the output schema of a join: left columns followed by right.
    pub fn join(left: &Schema, right: &Schema) -> Schema {
        let mut columns = Vec::with_capacity(left.column_count() + right.column_count());
        columns.extend_from_slice(&left.columns);
        columns.extend_from_slice(&right.columns);
        Schema::new(columns)
    }
}
