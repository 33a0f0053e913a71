//! LocalStorage access
//!
//! Every failure (no window, storage disabled, quota) degrades to "absent".

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Read a value, `None` if missing or storage is unavailable
pub fn get_item(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok()?
}

/// Write a value, returning whether it was stored
pub fn set_item(key: &str, value: &str) -> bool {
    match local_storage() {
        Some(storage) => storage.set_item(key, value).is_ok(),
        None => {
            log::warn!("LocalStorage unavailable, dropping write to {}", key);
            false
        }
    }
}
