//! Local receipt history and the "added to host" flag.

use crate::dom::{self, Elements};
use crate::state;
use crate::storage::LocalStore;
use rz_storage::{DEFAULT_RETENTION_DAYS, MiniAppFlags};
use wasm_bindgen::JsValue;

pub fn cleanup_receipts() {
    let removed = state::receipts(|receipts| receipts.cleanup(DEFAULT_RETENTION_DAYS));
    if removed > 0 {
        gloo_console::log!(format!("removed {removed} expired receipts"));
    }
}

fn format_date(epoch_ms: u128) -> String {
    js_sys::Date::new(&JsValue::from_f64(epoch_ms as f64))
        .to_locale_date_string("en-US", &JsValue::UNDEFINED)
        .into()
}

pub fn render_receipts(els: &Elements) {
    let receipts = state::receipts(|receipts| receipts.list());
    dom::clear(&els.receipt_list);

    if receipts.is_empty() {
        dom::set_text(&els.receipt_list, "No payments yet.");
        return;
    }
    for receipt in receipts {
        let Ok(li) = dom::create_element("li") else { continue };
        let payee = receipt
            .merchant_name
            .as_deref()
            .unwrap_or(&receipt.payee_handle);
        let points = if receipt.points_used { " · points" } else { "" };
        dom::set_text(
            &li,
            &format!(
                "{} · {} {} · {}{}",
                payee,
                receipt.amount_local,
                receipt.currency,
                format_date(receipt.timestamp),
                points
            ),
        );
        let _ = els.receipt_list.append_child(&li);
    }
}

pub fn sync_miniapp_button(els: &Elements) {
    let added = MiniAppFlags::new(LocalStore).is_added(&dom::hostname());
    dom::toggle_class(&els.add_miniapp_btn, "hidden", added);
}

pub fn on_add_miniapp(els: &Elements) {
    MiniAppFlags::new(LocalStore).mark_added(&dom::hostname());
    sync_miniapp_button(els);
}
