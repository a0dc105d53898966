use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the SQL type of a column or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeId {
    Invalid,
    Boolean,
    Integer,
    BigInt,
    VarChar,
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeId::Invalid => "INVALID",
            TypeId::Boolean => "BOOLEAN",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::VarChar => "VARCHAR",
        };
        write!(f, "{}", name)
    }
}
