use web_sys::{Storage, Window};

const USER_ID_KEY: &str = "userId";

fn local_storage(window: &Window) -> Option<Storage> {
    window.local_storage().ok().flatten()
}

pub fn load_user_id(window: &Window) -> Option<String> {
    local_storage(window)?
        .get_item(USER_ID_KEY)
        .ok()
        .flatten()
        .filter(|id| !id.is_empty())
}

pub fn store_user_id(window: &Window, user_id: &str) {
    let Some(storage) = local_storage(window) else {
        log::warn!("localStorage unavailable, identity will not survive reloads");
        return;
    };
    if let Err(error) = storage.set_item(USER_ID_KEY, user_id) {
        log::warn!("failed to persist identity: {error:?}");
    }
}
