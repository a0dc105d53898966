use log::trace;
use serde::{Deserialize, Serialize};

use crate::common::rid::RID;
use crate::types_db::value::Value;

/// Bucket page of the extendible hash table.
///
/// A fixed array of slots, each carrying an occupancy bit and a readable
/// bit. The occupancy bit marks a slot that has ever held an entry and is
/// never cleared, so scans know where the used region ends; the readable
/// bit marks a live entry and is cleared on removal, leaving a tombstone
/// that later inserts reuse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashTableBucketPage {
    max_size: u32,
    occupied: Vec<bool>,
    readable: Vec<bool>,
    entries: Vec<(Value, RID)>,
}

impl HashTableBucketPage {
    pub fn new(max_size: u32) -> Self {
        let n = max_size as usize;
        Self {
            max_size,
            occupied: vec![false; n],
            readable: vec![false; n],
            entries: vec![(Value::null(), RID::default()); n],
        }
    }

    pub fn get_max_size(&self) -> u32 {
        self.max_size
    }

    pub fn is_occupied(&self, idx: usize) -> bool {
        self.occupied[idx]
    }

    pub fn is_readable(&self, idx: usize) -> bool {
        self.readable[idx]
    }

    pub fn key_at(&self, idx: usize) -> &Value {
        &self.entries[idx].0
    }

    pub fn value_at(&self, idx: usize) -> RID {
        self.entries[idx].1
    }

    pub fn num_readable(&self) -> u32 {
        self.readable.iter().filter(|&&r| r).count() as u32
    }

    pub fn is_full(&self) -> bool {
        self.num_readable() >= self.max_size
    }

    pub fn is_empty(&self) -> bool {
        self.num_readable() == 0
    }

    /// Collects every value stored under `key`.
    pub fn get_value(&self, key: &Value, result: &mut Vec<RID>) -> bool {
        let before = result.len();
        for i in 0..self.max_size as usize {
            if self.readable[i] && self.entries[i].0 == *key {
                result.push(self.entries[i].1);
            }
        }
        result.len() > before
    }

    /// Inserts a key-value pair. Fails if the bucket is full or the exact
    /// pair is already present; `(key, value)` is the uniqueness unit.
    pub fn insert(&mut self, key: Value, value: RID) -> bool {
        if self.is_full() {
            return false;
        }
        let mut free_slot = None;
        for i in 0..self.max_size as usize {
            if self.readable[i] {
                if self.entries[i].0 == key && self.entries[i].1 == value {
                    trace!("duplicate ({}, {}) rejected", key, value);
                    return false;
                }
            } else if free_slot.is_none() {
                free_slot = Some(i);
            }
        }
        let slot = free_slot.expect("non-full bucket must have a free slot");
        self.entries[slot] = (key, value);
        self.occupied[slot] = true;
        self.readable[slot] = true;
        true
    }

    /// Removes the exact key-value pair, leaving a tombstone.
    pub fn remove(&mut self, key: &Value, value: &RID) -> bool {
        for i in 0..self.max_size as usize {
            if self.readable[i] && self.entries[i].0 == *key && self.entries[i].1 == *value {
                self.readable[i] = false;
                return true;
            }
        }
        false
    }

    pub fn remove_at(&mut self, idx: usize) {
        self.readable[idx] = false;
    }

    /// Drains every live entry, leaving the bucket empty. Used when
    /// redistributing entries across a split.
    pub fn take_all_entries(&mut self) -> Vec<(Value, RID)> {
        let mut out = Vec::with_capacity(self.num_readable() as usize);
        for i in 0..self.max_size as usize {
            if self.readable[i] {
                out.push(self.entries[i].clone());
                self.readable[i] = false;
            }
        }
        out
    }
}
