pub mod preference_store;
pub mod preferences;

pub use preference_store::PreferenceStore;
pub use preferences::{
    add_favorite, remove_favorite, set_dark_mode, set_unit, toggle_dark_mode, toggle_unit,
    PreferenceKey, Preferences,
};
