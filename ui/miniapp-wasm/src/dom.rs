//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add a UI element, add a field here
//! and bind it in `Elements::bind()`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Window};

// ── Helpers ──

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn by_id(id: &str) -> Option<Element> {
    document().ok()?.get_element_by_id(id)
}

fn require<T: JsCast>(id: &str) -> Result<T, JsValue> {
    by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has an unexpected element type")))
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document()?.create_element(tag)
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn clear(el: &Element) {
    el.set_inner_html("");
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn hostname() -> String {
    window()
        .ok()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default()
}

/// `Date.now()` as epoch milliseconds.
pub fn now_ms() -> u128 {
    js_sys::Date::now() as u128
}

// ── Elements struct ──

/// Every element the mini-app touches. Clone-friendly; the inner handles are
/// reference-counted by the JS GC.
#[derive(Clone)]
pub struct Elements {
    pub search_input: HtmlInputElement,
    pub catalog_status: Element,
    pub restaurant_list: Element,
    pub ai_service_list: Element,
    pub locate_btn: HtmlElement,
    pub location_status: Element,
    pub bookmark_list: Element,
    pub receipt_list: Element,
    pub wallet_status: Element,
    pub add_miniapp_btn: HtmlElement,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            search_input: require("searchInput")?,
            catalog_status: require("catalogStatus")?,
            restaurant_list: require("restaurantList")?,
            ai_service_list: require("aiServiceList")?,
            locate_btn: require("locateBtn")?,
            location_status: require("locationStatus")?,
            bookmark_list: require("bookmarkList")?,
            receipt_list: require("receiptList")?,
            wallet_status: require("walletStatus")?,
            add_miniapp_btn: require("addMiniAppBtn")?,
        })
    }
}
