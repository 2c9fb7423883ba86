//! Key-value telemetry/config bus.
//!
//! A process-local stand-in for the robot's publish/subscribe table store.
//! Values live in named tables; getters take a caller-supplied default and
//! return it when a key is absent or holds the wrong type, so a missing
//! tunable can never fail a control cycle.

mod tuning;

pub use tuning::TuningStore;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// A value stored on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    FloatArray(Vec<f64>),
}

/// One named table of key/value entries. Thread-safe.
#[derive(Debug, Default)]
pub struct BusTable {
    entries: RwLock<HashMap<String, BusValue>>,
}

impl BusTable {
    fn new() -> Self {
        Self::default()
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.entries.read().get(key) {
            Some(BusValue::Float(v)) => *v,
            Some(other) => {
                log::warn!("bus key '{}' holds {:?}, expected a float", key, other);
                default
            }
            None => default,
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.entries.read().get(key) {
            Some(BusValue::Int(v)) => *v,
            Some(other) => {
                log::warn!("bus key '{}' holds {:?}, expected an int", key, other);
                default
            }
            None => default,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.read().get(key) {
            Some(BusValue::Bool(v)) => *v,
            Some(other) => {
                log::warn!("bus key '{}' holds {:?}, expected a bool", key, other);
                default
            }
            None => default,
        }
    }

    pub fn get_text(&self, key: &str, default: &str) -> String {
        match self.entries.read().get(key) {
            Some(BusValue::Text(v)) => v.clone(),
            Some(other) => {
                log::warn!("bus key '{}' holds {:?}, expected text", key, other);
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    pub fn get_f64_array(&self, key: &str, default: &[f64]) -> Vec<f64> {
        match self.entries.read().get(key) {
            Some(BusValue::FloatArray(v)) => v.clone(),
            Some(other) => {
                log::warn!("bus key '{}' holds {:?}, expected a float array", key, other);
                default.to_vec()
            }
            None => default.to_vec(),
        }
    }

    pub fn set_f64(&self, key: &str, value: f64) {
        self.set(key, BusValue::Float(value));
    }

    pub fn set_i64(&self, key: &str, value: i64) {
        self.set(key, BusValue::Int(value));
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.set(key, BusValue::Bool(value));
    }

    pub fn set_text(&self, key: &str, value: &str) {
        self.set(key, BusValue::Text(value.to_string()));
    }

    pub fn set_f64_array(&self, key: &str, value: &[f64]) {
        self.set(key, BusValue::FloatArray(value.to_vec()));
    }

    pub fn set(&self, key: &str, value: BusValue) {
        self.entries.write().insert(key.to_string(), value);
    }

    /// Whether the key exists at all (any type).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

/// The process-wide table store. Tables are created on first access and
/// shared between producers and consumers.
#[derive(Debug, Default)]
pub struct TelemetryBus {
    tables: RwLock<HashMap<String, Arc<BusTable>>>,
}

impl TelemetryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a table by name, creating it if needed.
    pub fn table(&self, name: &str) -> Arc<BusTable> {
        if let Some(table) = self.tables.read().get(name) {
            return Arc::clone(table);
        }
        let mut tables = self.tables.write();
        Arc::clone(
            tables
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(BusTable::new())),
        )
    }
}
