//! Theme preference persisted under the `darkMode` key.
//!
//! Same policy as the record store: a bad or missing entry loads as the
//! default (`false`), and a failed write is logged and kept as a warning.

use crate::kv::{KvStore, DARK_MODE_KEY};
use crate::service::record_store::PersistenceWarning;
use log::{info, warn};

pub struct Preferences<S: KvStore> {
    storage: S,
    dark_mode: bool,
    persistence_warning: Option<PersistenceWarning>,
}

impl<S: KvStore> Preferences<S> {
    pub fn load(storage: S) -> Self {
        let dark_mode = match storage.get(DARK_MODE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<bool>(&raw).unwrap_or_else(|err| {
                warn!(
                    "event=prefs_load module=prefs status=error error_code=parse_failed error={err}"
                );
                false
            }),
            Ok(None) => false,
            Err(err) => {
                warn!(
                    "event=prefs_load module=prefs status=error error_code=read_failed error={err}"
                );
                false
            }
        };

        Self {
            storage,
            dark_mode,
            persistence_warning: None,
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
        info!("event=prefs_theme module=prefs status=ok dark_mode={enabled}");
        let raw = if enabled { "true" } else { "false" };
        self.persistence_warning = self.storage.set(DARK_MODE_KEY, raw).err().map(|err| {
            warn!(
                "event=prefs_persist module=prefs status=error key={DARK_MODE_KEY} error={err}"
            );
            PersistenceWarning {
                key: DARK_MODE_KEY,
                reason: err.to_string(),
            }
        });
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.set_dark_mode(!self.dark_mode);
        self.dark_mode
    }

    pub fn persistence_warning(&self) -> Option<&PersistenceWarning> {
        self.persistence_warning.as_ref()
    }
}
