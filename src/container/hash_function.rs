use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::types_db::value::{Val, Value};

/// Hashing scheme for index keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashScheme {
    /// xxh3, downcast to 32 bits by the caller.
    Xxh3,
    /// Integer keys hash to themselves. Lets tests and debugging sessions
    /// steer keys into chosen directory slots.
    Identity,
}

/// Hash function over index key values.
#[derive(Debug, Clone)]
pub struct HashFunction {
    scheme: HashScheme,
}

impl HashFunction {
    pub fn new() -> Self {
        Self {
            scheme: HashScheme::Xxh3,
        }
    }

    pub fn identity() -> Self {
        Self {
            scheme: HashScheme::Identity,
        }
    }

    pub fn get_hash(&self, key: &Value) -> u64 {
        if self.scheme == HashScheme::Identity {
            if let Some(i) = key.as_i64() {
                return i as u64;
            }
        }
        let mut hasher = Xxh3::new();
        match key.get_val() {
            Val::Null => hasher.write_u8(0),
            Val::Boolean(b) => hasher.write_u8(*b as u8),
            Val::Integer(i) => hasher.write_i32(*i),
            Val::BigInt(i) => hasher.write_i64(*i),
            Val::VarChar(s) => hasher.write(s.as_bytes()),
        }
        hasher.finish()
    }
}

impl Default for HashFunction {
    fn default() -> Self {
        Self::new()
    }
}
