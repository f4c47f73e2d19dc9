//! User preferences and the pure functions that change them.
//!
//! Every update takes the current [`Preferences`] by reference and returns a
//! new value. Persisting is left to the caller, which compares old and new
//! with [`Preferences::changed_keys`] and writes only what differs.

use serde::{Deserialize, Serialize};
use skywatch_core::StorageError;
use skywatch_weather::UnitSystem;

use crate::preference_store::PreferenceStore;

pub const FAVORITES_KEY: &str = "wa_favorites";
pub const DARK_MODE_KEY: &str = "wa_dark";
pub const UNIT_KEY: &str = "wa_unit";

/// A single persisted preference entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Favorites,
    DarkMode,
    Unit,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [Self::Favorites, Self::DarkMode, Self::Unit];

    /// Storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Favorites => FAVORITES_KEY,
            Self::DarkMode => DARK_MODE_KEY,
            Self::Unit => UNIT_KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Saved city names, in the order they were added
    pub favorites: Vec<String>,
    pub dark_mode: bool,
    pub unit: UnitSystem,
}

impl Preferences {
    /// Read all preferences, using defaults for anything missing or unreadable
    pub fn load(store: &PreferenceStore) -> Self {
        let stored: Vec<String> = store.get(FAVORITES_KEY, Vec::new());

        // Hand-edited data may contain repeats
        let mut favorites: Vec<String> = Vec::with_capacity(stored.len());
        for name in stored {
            if !favorites.contains(&name) {
                favorites.push(name);
            }
        }

        let prefs = Self {
            favorites,
            dark_mode: store.get(DARK_MODE_KEY, false),
            unit: store.get(UNIT_KEY, UnitSystem::default()),
        };

        tracing::debug!(
            "Loaded preferences: {} favorites, dark_mode={}, unit={}",
            prefs.favorites.len(),
            prefs.dark_mode,
            prefs.unit
        );
        prefs
    }

    /// Write one entry to the store
    pub fn save_key(&self, store: &PreferenceStore, key: PreferenceKey) -> Result<(), StorageError> {
        match key {
            PreferenceKey::Favorites => store.set(key.as_str(), &self.favorites),
            PreferenceKey::DarkMode => store.set(key.as_str(), &self.dark_mode),
            PreferenceKey::Unit => store.set(key.as_str(), &self.unit),
        }
    }

    /// Entries whose value differs from `other`
    pub fn changed_keys(&self, other: &Preferences) -> Vec<PreferenceKey> {
        let mut keys = Vec::new();
        if self.favorites != other.favorites {
            keys.push(PreferenceKey::Favorites);
        }
        if self.dark_mode != other.dark_mode {
            keys.push(PreferenceKey::DarkMode);
        }
        if self.unit != other.unit {
            keys.push(PreferenceKey::Unit);
        }
        keys
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|f| f == name)
    }
}

/// Append `name` unless it is already saved (case-sensitive)
pub fn add_favorite(prefs: &Preferences, name: &str) -> Preferences {
    let mut next = prefs.clone();
    if !name.is_empty() && !prefs.is_favorite(name) {
        next.favorites.push(name.to_string());
    }
    next
}

/// Remove the exact match for `name`, if any
pub fn remove_favorite(prefs: &Preferences, name: &str) -> Preferences {
    let mut next = prefs.clone();
    next.favorites.retain(|f| f != name);
    next
}

pub fn toggle_unit(prefs: &Preferences) -> Preferences {
    set_unit(prefs, prefs.unit.toggled())
}

pub fn set_unit(prefs: &Preferences, unit: UnitSystem) -> Preferences {
    Preferences {
        unit,
        ..prefs.clone()
    }
}

pub fn toggle_dark_mode(prefs: &Preferences) -> Preferences {
    set_dark_mode(prefs, !prefs.dark_mode)
}

pub fn set_dark_mode(prefs: &Preferences, dark_mode: bool) -> Preferences {
    Preferences {
        dark_mode,
        ..prefs.clone()
    }
}
