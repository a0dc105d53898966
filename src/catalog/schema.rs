use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::column::Column;

/// The ordered set of columns describing a table or an executor's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn get_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get_column(&self, idx: usize) -> &Column {
        &self.columns[idx]
    }

    pub fn get_column_count(&self) -> usize {
        self.columns.len()
    }

    /// Looks up a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.get_name() == name)
    }

    /// Builds a schema from a subset of another schema's columns.
    pub fn copy_schema(from: &Schema, attrs: &[usize]) -> Schema {
        Schema::new(attrs.iter().map(|&i| from.columns[i].clone()).collect())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", cols.join(", "))
    }
}
