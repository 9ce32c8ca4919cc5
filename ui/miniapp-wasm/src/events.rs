//! Event binding.
//!
//! Wires the page-level listeners. Row-level handlers (bookmark toggles) are
//! attached by the renderer that creates the rows.

use crate::discover;
use crate::dom::{self, Elements};
use crate::geolocation;
use crate::history;
use crate::state;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach a sync handler for `$event`.
macro_rules! on_event {
    ($target:expr, $event:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::Event)>);
        $target.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all page-level listeners. Call once after init.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    {
        let els2 = els.clone();
        on_event!(els.search_input, "input", move |_: web_sys::Event| {
            discover::on_search_input(&els2);
        });
    }
    {
        let els2 = els.clone();
        on_event!(els.locate_btn, "click", move |_: web_sys::Event| {
            geolocation::locate(&els2);
        });
    }
    {
        let els2 = els.clone();
        on_event!(els.add_miniapp_btn, "click", move |_: web_sys::Event| {
            history::on_add_miniapp(&els2);
        });
    }

    // In-flight catalog loads and wallet detection stop touching state once the
    // page is going away.
    on_event!(dom::window()?, "pagehide", move |_: web_sys::Event| {
        state::mount_guard().unmount();
    });

    Ok(())
}
