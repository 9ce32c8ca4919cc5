//! `localStorage` as a [`KvStore`], and `Date.now()` as a [`Clock`].

use anyhow::{Result, anyhow};
use rz_storage::{Clock, KvStore};
use wasm_bindgen::JsValue;

pub struct LocalStore;

fn storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| anyhow!("no window"))?
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| anyhow!("localStorage is disabled"))
}

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!("{:?}", err)
}

impl KvStore for LocalStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        storage()?.get_item(key).map_err(js_error)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        // Quota errors surface here.
        storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        storage()?.remove_item(key).map_err(js_error)
    }
}

pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_epoch_ms(&self) -> u128 {
        js_sys::Date::now() as u128
    }
}
