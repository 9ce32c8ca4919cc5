use crate::discover;
use crate::dom::{self, Elements};
use crate::state;
use js_sys::Reflect;
use rz_api_types::Coordinates;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

fn number_at(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

/// `GeolocationPosition` → coordinates.
fn read_coordinates(position: &JsValue) -> Option<Coordinates> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).ok()?;
    Some(Coordinates::new(
        number_at(&coords, "latitude")?,
        number_at(&coords, "longitude")?,
    ))
}

/// Ask the browser for a position, then re-rank the list around it.
pub fn locate(els: &Elements) {
    let geolocation = match dom::window().and_then(|w| w.navigator().geolocation()) {
        Ok(geolocation) => geolocation,
        Err(_) => {
            dom::set_text(&els.location_status, "Location is not available in this browser.");
            return;
        }
    };
    dom::set_text(&els.location_status, "Locating…");

    let on_success = {
        let els = els.clone();
        Closure::once(move |position: JsValue| match read_coordinates(&position) {
            Some(origin) => {
                state::set_origin(origin);
                dom::set_text(&els.location_status, "Showing places within 10 miles.");
                discover::render(&els);
            }
            None => dom::set_text(&els.location_status, "Could not read your location."),
        })
    };
    let on_error = {
        let els = els.clone();
        Closure::once(move |_: JsValue| {
            gloo_console::warn!("geolocation request failed");
            dom::set_text(&els.location_status, "Location permission was denied.");
        })
    };

    if geolocation
        .get_current_position_with_error_callback(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
        )
        .is_err()
    {
        dom::set_text(&els.location_status, "Location request failed.");
    }
    on_success.forget();
    on_error.forget();
}
