//! Tiered JSON durability for the memory store.
//!
//! The document has two top-level keys, `long_term` and `contextual`. The
//! contextual tier is persisted for convenience but always recomputed on
//! load. Files written by the legacy assistant (flat collections at the top
//! level, no tiers) are migrated automatically.

use chrono::NaiveDateTime;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::context;
use super::store::MemoryStore;
use super::types::LongTermMemory;
use crate::error::{EngineError, EngineResult};

/// File name used under the default config directory.
pub const MEMORY_FILE: &str = "memory.json";

/// Default memory path: `<config dir>/jeeves/memory.json`.
pub fn default_memory_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jeeves").join(MEMORY_FILE))
}

/// Load the store from disk, migrating legacy documents, and recompute the
/// contextual tier.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or decoded.
/// A missing file is not an error; it yields a fresh store.
pub fn load(path: &Path, now: NaiveDateTime) -> EngineResult<MemoryStore> {
    if !path.exists() {
        debug!(path = %path.display(), "no memory file, starting fresh");
        return Ok(MemoryStore::new());
    }

    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;

    let mut store = if value.get("long_term").is_some() {
        serde_json::from_value(value)?
    } else if value.get("reminders").is_some() && value.get("facts").is_some() {
        migrate_legacy(value)?
    } else {
        return Err(EngineError::malformed(
            "memory file has neither tiered nor legacy schema",
        ));
    };

    context::refresh(&mut store, now);
    debug!(
        path = %path.display(),
        reminders = store.long_term.reminders.len(),
        facts = store.long_term.facts.len(),
        "loaded memory"
    );
    Ok(store)
}

/// Load, degrading to a fresh store on any failure. Used at startup where a
/// corrupt file must not keep the assistant from running.
pub fn load_or_default(path: &Path, now: NaiveDateTime) -> MemoryStore {
    match load(path, now) {
        Ok(store) => store,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to load memory, starting fresh");
            MemoryStore::new()
        }
    }
}

/// Flush the store to disk. Synchronous; called on the mutating thread
/// immediately after a mutation.
pub fn save(path: &Path, store: &MemoryStore) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(store)?;
    fs::write(path, json)?;
    Ok(())
}

/// Flush, logging instead of propagating. In-memory state stays authoritative
/// for the session when the flush fails.
pub fn save_best_effort(path: &Path, store: &MemoryStore) {
    if let Err(err) = save(path, store) {
        warn!(path = %path.display(), error = %err, "durability flush failed");
    }
}

fn migrate_legacy(value: Value) -> EngineResult<MemoryStore> {
    let mut long_term = LongTermMemory::default();
    let Value::Object(mut map) = value else {
        return Err(EngineError::malformed("legacy memory file is not an object"));
    };
    if let Some(reminders) = map.remove("reminders") {
        long_term.reminders = serde_json::from_value(reminders)?;
    }
    if let Some(facts) = map.remove("facts") {
        long_term.facts = serde_json::from_value(facts)?;
    }
    if let Some(events) = map.remove("events") {
        long_term.events = serde_json::from_value(events)?;
    }
    if let Some(preferences) = map.remove("preferences") {
        long_term.preferences = serde_json::from_value(preferences)?;
    }
    if let Some(conversations) = map.remove("conversations") {
        long_term.conversations = serde_json::from_value(conversations)?;
    }
    debug!(
        reminders = long_term.reminders.len(),
        facts = long_term.facts.len(),
        "migrated legacy memory schema"
    );
    Ok(MemoryStore {
        long_term,
        contextual: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time")
    }

    fn temp_path(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("jeeves-memory-{suffix}-{nanos}.json"))
    }

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.upsert_fact("I like tea", "preference", now());
        store.upsert_reminder("call mom", now() + chrono::Duration::hours(2), now());
        store
            .long_term
            .preferences
            .insert("voice".into(), "alex".into());
        store
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("roundtrip");
        let store = seeded_store();
        save(&path, &store).expect("save");

        let loaded = load(&path, now()).expect("load");
        assert_eq!(loaded.long_term, store.long_term);
        // Contextual tier is recomputed, not trusted from disk.
        assert_eq!(loaded.contextual.active_reminders.len(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_yields_fresh_store() {
        let path = temp_path("missing");
        let store = load(&path, now()).expect("load");
        assert!(store.long_term.reminders.is_empty());
    }

    #[test]
    fn legacy_flat_schema_is_migrated() {
        let path = temp_path("legacy");
        let legacy = r#"{
            "reminders": [
                {"message": "call mom", "datetime": "2026-04-02 14:00:00",
                 "created_at": "2026-04-02 09:00:00", "status": "active"}
            ],
            "facts": [
                {"content": "I like tea", "category": "preference",
                 "timestamp": "2026-04-01 09:00:00"}
            ],
            "preferences": {"voice": "alex"},
            "conversations": []
        }"#;
        fs::write(&path, legacy).expect("write");

        let store = load(&path, now()).expect("load");
        assert_eq!(store.long_term.reminders.len(), 1);
        assert_eq!(store.long_term.facts.len(), 1);
        assert_eq!(store.long_term.preferences.get("voice"), Some(&"alex".to_string()));
        assert_eq!(store.contextual.active_reminders.len(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_is_an_error_but_load_or_default_degrades() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json at all").expect("write");
        assert!(load(&path, now()).is_err());
        let store = load_or_default(&path, now());
        assert!(store.long_term.facts.is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unrecognized_schema_is_rejected() {
        let path = temp_path("unknown");
        fs::write(&path, r#"{"something": []}"#).expect("write");
        assert!(load(&path, now()).is_err());
        let _ = fs::remove_file(&path);
    }
}
