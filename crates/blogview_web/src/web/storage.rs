//! Last radio and slider choices, kept in `localStorage`.

use blogview::config::ViewerConfig;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::ui_model::{PersistedSelections, STORAGE_KEY_SELECTIONS};

fn store() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Stored choices checked against `cfg`; defaults when absent or unreadable.
pub(super) fn load_selections(cfg: &ViewerConfig) -> PersistedSelections {
    let raw = store().and_then(|s| s.get_item(STORAGE_KEY_SELECTIONS).ok().flatten());
    PersistedSelections::from_stored(raw.as_deref(), cfg)
}

pub(super) fn save_selections(sel: &PersistedSelections) {
    let (Some(store), Ok(json)) = (store(), serde_json::to_string(sel)) else {
        return;
    };
    if store.set_item(STORAGE_KEY_SELECTIONS, &json).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("selections: localStorage write failed"));
    }
}
