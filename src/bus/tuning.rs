//! Persisted runtime tunables.
//!
//! Mirrors the tuning values onto a bus table so dashboards can watch and
//! edit them, and writes them through to a JSON file so they survive power
//! cycles. A key read before it exists is created from the caller's
//! default, so tunables are self-registering.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::{BusTable, TelemetryBus};

/// Name of the bus table the tunables are mirrored to.
const TUNE_TABLE: &str = "Tune";

/// Persisted key-value store for runtime tuning.
pub struct TuningStore {
    table: Arc<BusTable>,
    file_path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, Value>>,
}

impl TuningStore {
    /// Open a store backed by a JSON file, creating the file on first save.
    ///
    /// An unreadable or unparsable file is logged and treated as empty; the
    /// store then operates normally and overwrites it on the next save.
    pub fn open(bus: &TelemetryBus, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::error!("failed to parse tuning file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                log::info!(
                    "tuning file {} not loaded ({}), starting empty",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        let store = Self {
            table: bus.table(TUNE_TABLE),
            file_path: Some(path),
            values: Mutex::new(values),
        };
        store.mirror_all();
        store
    }

    /// A store with no file backing; values live for the process only.
    pub fn in_memory(bus: &TelemetryBus) -> Self {
        Self {
            table: bus.table(TUNE_TABLE),
            file_path: None,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        let mut values = self.values.lock();
        match values.get(key) {
            Some(value) => value.as_f64().unwrap_or_else(|| {
                log::warn!("tunable '{}' is not a number, using {}", key, default);
                default
            }),
            None => {
                log::warn!("tunable '{}' does not exist, creating it as {}", key, default);
                values.insert(key.to_string(), default.into());
                self.table.set_f64(key, default);
                self.save(&values);
                default
            }
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        let mut values = self.values.lock();
        match values.get(key) {
            Some(value) => value.as_i64().unwrap_or_else(|| {
                log::warn!("tunable '{}' is not an integer, using {}", key, default);
                default
            }),
            None => {
                log::warn!("tunable '{}' does not exist, creating it as {}", key, default);
                values.insert(key.to_string(), default.into());
                self.table.set_i64(key, default);
                self.save(&values);
                default
            }
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let mut values = self.values.lock();
        match values.get(key) {
            Some(value) => value.as_bool().unwrap_or_else(|| {
                log::warn!("tunable '{}' is not a bool, using {}", key, default);
                default
            }),
            None => {
                log::warn!("tunable '{}' does not exist, creating it as {}", key, default);
                values.insert(key.to_string(), default.into());
                self.table.set_bool(key, default);
                self.save(&values);
                default
            }
        }
    }

    /// Set a value, mirroring it to the bus and the file.
    pub fn set(&self, key: &str, value: Value) {
        let mut values = self.values.lock();
        mirror_to_table(&self.table, key, &value);
        values.insert(key.to_string(), value);
        self.save(&values);
    }

    fn mirror_all(&self) {
        let values = self.values.lock();
        for (key, value) in values.iter() {
            mirror_to_table(&self.table, key, value);
        }
    }

    fn save(&self, values: &BTreeMap<String, Value>) {
        let Some(path) = &self.file_path else {
            return;
        };
        match serde_json::to_string_pretty(values) {
            Ok(serialized) => {
                if let Err(e) = std::fs::write(path, serialized) {
                    log::warn!("failed to save tuning file {}: {}", path.display(), e);
                }
            }
            Err(e) => log::warn!("failed to serialize tuning values: {}", e),
        }
    }
}

fn mirror_to_table(table: &BusTable, key: &str, value: &Value) {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                table.set_f64(key, v);
            }
        }
        Value::Bool(b) => table.set_bool(key, *b),
        Value::String(s) => table.set_text(key, s),
        other => log::warn!("tunable '{}' has unsupported type: {}", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_writes_default_back() {
        let bus = TelemetryBus::new();
        let store = TuningStore::in_memory(&bus);

        assert_eq!(store.get_f64("shooter_speed", 0.8), 0.8);
        // The default is now registered and visible on the bus.
        assert_eq!(store.get_f64("shooter_speed", 0.2), 0.8);
        assert_eq!(bus.table(TUNE_TABLE).get_f64("shooter_speed", 0.0), 0.8);
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let bus = TelemetryBus::new();
        let store = TuningStore::in_memory(&bus);
        store.set("mode", Value::String("fast".into()));
        assert_eq!(store.get_i64("mode", 3), 3);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.json");

        {
            let bus = TelemetryBus::new();
            let store = TuningStore::open(&bus, &path);
            assert_eq!(store.get_i64("tracker_poll_rate_ms", 20), 20);
            store.set("drive_p", 0.05.into());
        }

        let bus = TelemetryBus::new();
        let store = TuningStore::open(&bus, &path);
        assert_eq!(store.get_i64("tracker_poll_rate_ms", 99), 20);
        assert_eq!(store.get_f64("drive_p", 0.0), 0.05);
        // Reopened values are mirrored back to the bus.
        assert_eq!(bus.table(TUNE_TABLE).get_f64("drive_p", 0.0), 0.05);
    }

    #[test]
    fn test_unparsable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.json");
        std::fs::write(&path, "{ not json").unwrap();

        let bus = TelemetryBus::new();
        let store = TuningStore::open(&bus, &path);
        assert_eq!(store.get_f64("anything", 1.0), 1.0);
    }
}
