//! Rozo mini-app front-end.
//!
//! Browser-only: every module talks to `window`, so the crate is empty on native
//! targets. Catalog, search, ranking and persistence rules come from the shared
//! `rz-*` crates; this crate binds them to the DOM.

#![cfg(target_arch = "wasm32")]

pub mod api;
pub mod discover;
pub mod dom;
pub mod events;
pub mod geolocation;
pub mod history;
pub mod provider;
pub mod state;
pub mod storage;
pub mod wallet;

use wasm_bindgen::prelude::*;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    // Stale receipts go before anything renders the history.
    history::cleanup_receipts();
    history::render_receipts(&els);
    history::sync_miniapp_button(&els);

    events::bind_events(&els)?;

    wallet::detect(&els);
    discover::load_catalogs(&els).await;

    Ok(())
}
