//! Persisted "music is manually muted" preference.
//!
//! Values are stored as the literal strings `"true"` / `"false"` so the flag stays
//! readable by anything else on the page that looks at the same key.

use crate::music::ControllerError;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{errors::StorageError, LocalStorage, Storage};

#[cfg(not(target_arch = "wasm32"))]
use rusqlite::OptionalExtension;

pub trait PreferenceStore {
    /// `Ok(None)` when nothing usable has been stored yet.
    fn load_muted(&self) -> Result<Option<bool>, ControllerError>;
    fn store_muted(&mut self, muted: bool) -> Result<(), ControllerError>;
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn flag_value(muted: bool) -> &'static str {
    if muted {
        "true"
    } else {
        "false"
    }
}

/// Keeps the flag for the lifetime of the process only.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    value: Option<String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl MemoryPreferences {
    #[cfg(test)]
    pub fn with_raw(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
        }
    }

    #[cfg(test)]
    pub fn raw(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreferenceStore for MemoryPreferences {
    fn load_muted(&self) -> Result<Option<bool>, ControllerError> {
        Ok(self.value.as_deref().and_then(parse_flag))
    }

    fn store_muted(&mut self, muted: bool) -> Result<(), ControllerError> {
        self.value = Some(flag_value(muted).to_string());
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStoragePreferences {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStoragePreferences {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl PreferenceStore for LocalStoragePreferences {
    fn load_muted(&self) -> Result<Option<bool>, ControllerError> {
        // `true` / `false` are valid JSON, so the typed accessor reads the literals.
        match LocalStorage::get::<bool>(&self.key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::KeyNotFound(_)) | Err(StorageError::SerdeError(_)) => Ok(None),
            Err(e) => Err(ControllerError::Storage(e.to_string())),
        }
    }

    fn store_muted(&mut self, muted: bool) -> Result<(), ControllerError> {
        LocalStorage::set(&self.key, muted).map_err(|e| ControllerError::Storage(e.to_string()))
    }
}

/// Desktop builds keep the flag in a small SQLite settings table.
#[cfg(not(target_arch = "wasm32"))]
pub struct SqlitePreferences {
    conn: rusqlite::Connection,
    key: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl SqlitePreferences {
    pub fn open(key: impl Into<String>) -> Result<Self, ControllerError> {
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join("backdrop"))
            .unwrap_or_else(|| std::path::PathBuf::from(".backdrop"));
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| ControllerError::Storage(format!("Failed to create data dir: {}", e)))?;
        let conn = rusqlite::Connection::open(data_dir.join("backdrop.db"))
            .map_err(|e| ControllerError::Storage(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn, key)
    }

    #[cfg(test)]
    pub fn open_in_memory(key: impl Into<String>) -> Result<Self, ControllerError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| ControllerError::Storage(e.to_string()))?;
        Self::with_connection(conn, key)
    }

    fn with_connection(
        conn: rusqlite::Connection,
        key: impl Into<String>,
    ) -> Result<Self, ControllerError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ControllerError::Storage(e.to_string()))?;

        Ok(Self {
            conn,
            key: key.into(),
        })
    }

    fn raw(&self) -> Result<Option<String>, ControllerError> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [&self.key],
                |row: &rusqlite::Row| row.get(0),
            )
            .optional()
            .map_err(|e| ControllerError::Storage(e.to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreferenceStore for SqlitePreferences {
    fn load_muted(&self) -> Result<Option<bool>, ControllerError> {
        Ok(self.raw()?.as_deref().and_then(parse_flag))
    }

    fn store_muted(&mut self, muted: bool) -> Result<(), ControllerError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                [self.key.as_str(), flag_value(muted)],
            )
            .map_err(|e| ControllerError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_writes_literal_strings() {
        let mut prefs = MemoryPreferences::default();
        assert_eq!(prefs.load_muted(), Ok(None));
        prefs.store_muted(true).unwrap();
        assert_eq!(prefs.raw(), Some("true"));
        prefs.store_muted(false).unwrap();
        assert_eq!(prefs.raw(), Some("false"));
        assert_eq!(prefs.load_muted(), Ok(Some(false)));
    }

    #[test]
    fn unknown_values_read_as_unset() {
        let prefs = MemoryPreferences::with_raw("yes");
        assert_eq!(prefs.load_muted(), Ok(None));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn sqlite_store_round_trips_the_flag() {
        let mut prefs = SqlitePreferences::open_in_memory("musicMuted").unwrap();
        assert_eq!(prefs.load_muted(), Ok(None));

        prefs.store_muted(true).unwrap();
        assert_eq!(prefs.raw().unwrap().as_deref(), Some("true"));
        assert_eq!(prefs.load_muted(), Ok(Some(true)));

        prefs.store_muted(false).unwrap();
        assert_eq!(prefs.load_muted(), Ok(Some(false)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn sqlite_keys_are_independent() {
        let mut prefs = SqlitePreferences::open_in_memory("musicMuted").unwrap();
        prefs.store_muted(true).unwrap();
        let other = SqlitePreferences {
            conn: prefs.conn,
            key: "otherFlag".to_string(),
        };
        assert_eq!(other.load_muted(), Ok(None));
    }
}
