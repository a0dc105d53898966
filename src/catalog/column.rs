use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types_db::type_id::TypeId;

/// A single column in a table schema: a name and a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    column_name: String,
    column_type: TypeId,
}

impl Column {
    pub fn new(column_name: &str, column_type: TypeId) -> Self {
        Self {
            column_name: column_name.to_string(),
            column_type,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.column_name
    }

    pub fn get_type(&self) -> TypeId {
        self.column_type
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column_name, self.column_type)
    }
}
