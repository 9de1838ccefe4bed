use std::fs;
use std::path::PathBuf;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// Default location of the settings document, relative to the working
/// directory.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Audio filter switches. `true` means the filter is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSettings {
    pub emphasis: bool,
    pub highpass: bool,
    pub lowpass: bool,
}

/// The last configuration applied to the device.
///
/// Every field is optional: `None` means "never configured". `ctcss`
/// holds the 2-digit CTCSS table index (e.g. `"12"`), `dcs` the
/// 3-digit code plus direction (e.g. `"047N"`); at most one of the two
/// is set at any time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
    pub frequency: Option<f64>,
    pub offset: Option<f64>,
    pub squelch: Option<u8>,
    pub ctcss: Option<String>,
    pub dcs: Option<String>,
    pub volume: Option<u8>,
    pub filter: Option<FilterSettings>,
}

/// Owns the persisted settings document.
///
/// The document is a single JSON object, rewritten wholesale after
/// every successful device write. Loading never fails hard: a missing
/// or unreadable document yields the all-absent default.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: RadioSettings,
}

impl SettingsStore {
    /// Load the settings document at `path`, or start from the
    /// all-absent default if there is none.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    info!("settings loaded from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!(
                        "settings file {} is unreadable ({e}); using defaults",
                        path.display()
                    );
                    RadioSettings::default()
                }
            },
            Err(_) => {
                warn!("settings file {} not found; using defaults", path.display());
                RadioSettings::default()
            }
        };
        Self { path, current }
    }

    /// The last-applied configuration.
    pub fn current(&self) -> &RadioSettings {
        &self.current
    }

    /// Overlay `partial` on the current settings: every `Some` field
    /// overwrites, every `None` field keeps the prior value.
    ///
    /// Setting `ctcss` clears any stored `dcs` and vice versa, so the
    /// two stay mutually exclusive.
    pub fn merge(&mut self, partial: &RadioSettings) {
        if let Some(frequency) = partial.frequency {
            self.current.frequency = Some(frequency);
        }
        if let Some(offset) = partial.offset {
            self.current.offset = Some(offset);
        }
        if let Some(squelch) = partial.squelch {
            self.current.squelch = Some(squelch);
        }
        if partial.ctcss.is_some() {
            self.current.ctcss = partial.ctcss.clone();
            self.current.dcs = None;
        }
        if partial.dcs.is_some() {
            self.current.dcs = partial.dcs.clone();
            self.current.ctcss = None;
        }
        if let Some(volume) = partial.volume {
            self.current.volume = Some(volume);
        }
        if let Some(filter) = partial.filter {
            self.current.filter = Some(filter);
        }
    }

    /// Write the full current record, overwriting any prior document.
    ///
    /// A write failure is logged and the in-memory settings are kept;
    /// the next successful operation will retry the write.
    pub fn persist(&self) {
        match serde_json::to_string_pretty(&self.current) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    error!("failed to save settings to {}: {e}", self.path.display());
                } else {
                    info!("settings saved to {}", self.path.display());
                }
            }
            Err(e) => error!("failed to serialize settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::load(dir.path().join("settings.json"))
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.current(), &RadioSettings::default());
    }

    #[test]
    fn test_load_garbage_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        let store = SettingsStore::load(path);
        assert_eq!(store.current(), &RadioSettings::default());
    }

    #[test]
    fn test_merge_preserves_absent_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.merge(&RadioSettings {
            squelch: Some(4),
            volume: Some(5),
            ..RadioSettings::default()
        });
        store.merge(&RadioSettings {
            squelch: Some(6),
            ..RadioSettings::default()
        });
        assert_eq!(store.current().squelch, Some(6));
        assert_eq!(store.current().volume, Some(5));
    }

    #[test]
    fn test_ctcss_clears_dcs() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.merge(&RadioSettings {
            dcs: Some("047N".to_string()),
            ..RadioSettings::default()
        });
        store.merge(&RadioSettings {
            ctcss: Some("12".to_string()),
            ..RadioSettings::default()
        });
        assert_eq!(store.current().ctcss.as_deref(), Some("12"));
        assert_eq!(store.current().dcs, None);
    }

    #[test]
    fn test_dcs_clears_ctcss() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.merge(&RadioSettings {
            ctcss: Some("12".to_string()),
            ..RadioSettings::default()
        });
        store.merge(&RadioSettings {
            dcs: Some("047N".to_string()),
            ..RadioSettings::default()
        });
        assert_eq!(store.current().ctcss, None);
        assert_eq!(store.current().dcs.as_deref(), Some("047N"));
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::load(&path);
        store.merge(&RadioSettings {
            frequency: Some(145.5),
            offset: Some(0.0),
            squelch: Some(4),
            ..RadioSettings::default()
        });
        store.persist();

        let reloaded = SettingsStore::load(&path);
        assert_eq!(reloaded.current(), store.current());
    }

    #[test]
    fn test_persisted_document_has_null_for_absent_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::load(&path);
        store.merge(&RadioSettings {
            frequency: Some(145.5),
            ..RadioSettings::default()
        });
        store.persist();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["frequency"], serde_json::json!(145.5));
        assert!(doc["ctcss"].is_null());
        assert!(doc["dcs"].is_null());
        assert!(doc["volume"].is_null());
    }

    #[test]
    fn test_persist_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::load(&path);
        store.merge(&RadioSettings {
            frequency: Some(145.5),
            volume: Some(8),
            ..RadioSettings::default()
        });
        store.persist();

        let mut store = SettingsStore::load(&path);
        store.merge(&RadioSettings {
            frequency: Some(446.5),
            ..RadioSettings::default()
        });
        store.persist();

        let reloaded = SettingsStore::load(&path);
        assert_eq!(reloaded.current().frequency, Some(446.5));
        // Merged from the prior document, not dropped.
        assert_eq!(reloaded.current().volume, Some(8));
    }
}
