use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types_db::type_id::TypeId;

/// The runtime representation of a single SQL value.
///
/// Floating point types are deliberately absent so that `Val` can derive
/// `Eq` and `Hash`, which lets values serve directly as aggregation group
/// keys, hash-join keys and distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Val {
    Null,
    Boolean(bool),
    Integer(i32),
    BigInt(i64),
    VarChar(String),
}

/// A typed SQL value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    val: Val,
}

impl Value {
    pub fn new<T: Into<Val>>(value: T) -> Self {
        Self { val: value.into() }
    }

    pub fn null() -> Self {
        Self { val: Val::Null }
    }

    pub fn get_val(&self) -> &Val {
        &self.val
    }

    pub fn get_type_id(&self) -> TypeId {
        match self.val {
            Val::Null => TypeId::Invalid,
            Val::Boolean(_) => TypeId::Boolean,
            Val::Integer(_) => TypeId::Integer,
            Val::BigInt(_) => TypeId::BigInt,
            Val::VarChar(_) => TypeId::VarChar,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.val, Val::Null)
    }

    /// Interprets this value as a boolean. Nulls and non-boolean values are
    /// treated as false, matching predicate semantics where only a true
    /// comparison accepts a row.
    pub fn as_bool(&self) -> bool {
        matches!(self.val, Val::Boolean(true))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.val {
            Val::Integer(i) => Some(i as i64),
            Val::BigInt(i) => Some(i),
            _ => None,
        }
    }

    /// Three-way comparison between two values of compatible types.
    /// Returns `None` when either side is null or the types are incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (&self.val, &other.val) {
            (Val::Null, _) | (_, Val::Null) => None,
            (Val::Boolean(a), Val::Boolean(b)) => Some(a.cmp(b)),
            (Val::Integer(a), Val::Integer(b)) => Some(a.cmp(b)),
            (Val::BigInt(a), Val::BigInt(b)) => Some(a.cmp(b)),
            (Val::Integer(a), Val::BigInt(b)) => Some((*a as i64).cmp(b)),
            (Val::BigInt(a), Val::Integer(b)) => Some(a.cmp(&(*b as i64))),
            (Val::VarChar(a), Val::VarChar(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn compare_equals(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub fn compare_less_than(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Less)
    }

    pub fn compare_greater_than(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Greater)
    }

    /// Numeric addition for integer types. Null propagates; the result keeps
    /// the wider of the two operand types.
    pub fn add(&self, other: &Value) -> Value {
        match (&self.val, &other.val) {
            (Val::Integer(a), Val::Integer(b)) => Value::new(a.wrapping_add(*b)),
            (Val::BigInt(a), Val::BigInt(b)) => Value::new(a.wrapping_add(*b)),
            (Val::Integer(a), Val::BigInt(b)) | (Val::BigInt(b), Val::Integer(a)) => {
                Value::new((*a as i64).wrapping_add(*b))
            }
            _ => Value::null(),
        }
    }

    /// Returns the smaller of the two values, ignoring nulls.
    pub fn min(&self, other: &Value) -> Value {
        match self.compare(other) {
            Some(Ordering::Greater) => other.clone(),
            Some(_) => self.clone(),
            None => {
                if self.is_null() {
                    other.clone()
                } else {
                    self.clone()
                }
            }
        }
    }

    /// Returns the larger of the two values, ignoring nulls.
    pub fn max(&self, other: &Value) -> Value {
        match self.compare(other) {
            Some(Ordering::Less) => other.clone(),
            Some(_) => self.clone(),
            None => {
                if self.is_null() {
                    other.clone()
                } else {
                    self.clone()
                }
            }
        }
    }
}

impl From<bool> for Val {
    fn from(v: bool) -> Self {
        Val::Boolean(v)
    }
}

impl From<i32> for Val {
    fn from(v: i32) -> Self {
        Val::Integer(v)
    }
}

impl From<i64> for Val {
    fn from(v: i64) -> Self {
        Val::BigInt(v)
    }
}

impl From<&str> for Val {
    fn from(v: &str) -> Self {
        Val::VarChar(v.to_string())
    }
}

impl From<String> for Val {
    fn from(v: String) -> Self {
        Val::VarChar(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.val {
            Val::Null => write!(f, "NULL"),
            Val::Boolean(v) => write!(f, "{}", v),
            Val::Integer(v) => write!(f, "{}", v),
            Val::BigInt(v) => write!(f, "{}", v),
            Val::VarChar(v) => write!(f, "{}", v),
        }
    }
}
