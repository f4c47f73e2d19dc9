use std::path::Path;

use skywatch_core::AppError;
use skywatch_services::preferences::{self, Preferences};
use skywatch_services::PreferenceStore;
use skywatch_weather::UnitSystem;

/// Sole owner of the user's preferences.
///
/// Changes go through the pure functions in `skywatch_services::preferences`;
/// whatever differs afterwards is written to the store. Storage failures are
/// logged and the in-memory value still changes.
pub struct PreferencesModel {
    store: PreferenceStore,
    prefs: Preferences,
}

impl PreferencesModel {
    pub fn open(path: &Path) -> Self {
        Self::load(PreferenceStore::open(path))
    }

    pub fn load(store: PreferenceStore) -> Self {
        let prefs = Preferences::load(&store);
        Self { store, prefs }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn favorites(&self) -> &[String] {
        &self.prefs.favorites
    }

    pub fn unit(&self) -> UnitSystem {
        self.prefs.unit
    }

    pub fn dark_mode(&self) -> bool {
        self.prefs.dark_mode
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_available()
    }

    pub fn add_favorite(&mut self, name: &str) -> bool {
        let next = preferences::add_favorite(&self.prefs, name);
        self.commit(next)
    }

    pub fn remove_favorite(&mut self, name: &str) -> bool {
        let next = preferences::remove_favorite(&self.prefs, name);
        self.commit(next)
    }

    pub fn toggle_unit(&mut self) -> UnitSystem {
        let next = preferences::toggle_unit(&self.prefs);
        self.commit(next);
        self.prefs.unit
    }

    pub fn set_unit(&mut self, unit: UnitSystem) -> bool {
        let next = preferences::set_unit(&self.prefs, unit);
        self.commit(next)
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        let next = preferences::toggle_dark_mode(&self.prefs);
        self.commit(next);
        self.prefs.dark_mode
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> bool {
        let next = preferences::set_dark_mode(&self.prefs, dark_mode);
        self.commit(next)
    }

    /// Replace the current preferences, writing changed keys. Returns whether anything changed.
    fn commit(&mut self, next: Preferences) -> bool {
        let changed = next.changed_keys(&self.prefs);
        if changed.is_empty() {
            return false;
        }

        for key in changed {
            if let Err(e) = next.save_key(&self.store, key) {
                let e = AppError::from(e);
                tracing::warn!(
                    "Failed to save preference '{}': {} ({})",
                    key.as_str(),
                    e,
                    e.user_message()
                );
            }
        }

        self.prefs = next;
        true
    }
}
