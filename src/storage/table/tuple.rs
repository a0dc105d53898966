use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::schema::Schema;
use crate::common::rid::RID;
use crate::types_db::value::Value;

/// Per-tuple bookkeeping kept alongside the tuple in the table heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleMeta {
    is_deleted: bool,
}

impl TupleMeta {
    pub fn new(is_deleted: bool) -> Self {
        Self { is_deleted }
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

/// A row of values, located by its RID once stored in a table heap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    rid: RID,
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            rid: RID::default(),
            values,
        }
    }

    pub fn with_rid(values: Vec<Value>, rid: RID) -> Self {
        Self { rid, values }
    }

    pub fn get_rid(&self) -> RID {
        self.rid
    }

    pub fn set_rid(&mut self, rid: RID) {
        self.rid = rid;
    }

    pub fn get_value(&self, column_index: usize) -> &Value {
        &self.values[column_index]
    }

    pub fn get_values(&self) -> &[Value] {
        &self.values
    }

    /// Extracts the index key columns of this tuple, producing a new tuple
    /// conforming to the key schema.
    pub fn key_from_tuple(&self, _schema: &Schema, _key_schema: &Schema, key_attrs: &[usize]) -> Tuple {
        let values = key_attrs.iter().map(|&i| self.values[i].clone()).collect();
        Tuple::new(values)
    }

    pub fn to_string(&self, schema: &Schema) -> String {
        let parts: Vec<String> = schema
            .get_columns()
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| format!("{}={}", c.get_name(), v))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}
