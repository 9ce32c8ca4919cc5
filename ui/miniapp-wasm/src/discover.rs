//! Restaurant and AI-service lists: loading, search, distance ranking, bookmarks.

use crate::api::{AI_SERVICES_PATH, FetchSource, RESTAURANTS_PATH};
use crate::dom::{self, Elements};
use crate::state::{self, AppState};
use gloo_timers::future::TimeoutFuture;
use rz_api_types::{AiService, Restaurant};
use rz_discovery::geo::format_miles;
use rz_discovery::ranking::MAP_VIEW_RADIUS;
use rz_discovery::search::SEARCH_DEBOUNCE_MS;
use rz_discovery::{CatalogLoader, filter_entries};
use std::collections::HashSet;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

struct RestaurantRow {
    id: String,
    name: String,
    address: String,
    distance: Option<String>,
    bookmarked: bool,
}

struct ServiceRow {
    name: String,
    category: String,
    description: String,
}

pub async fn load_catalogs(els: &Elements) {
    let guard = state::mount_guard();
    dom::set_text(&els.catalog_status, "Loading…");

    let restaurants: CatalogLoader<Restaurant, _> =
        CatalogLoader::new(FetchSource::new(RESTAURANTS_PATH), guard.clone());
    let ai_services: CatalogLoader<AiService, _> =
        CatalogLoader::new(FetchSource::new(AI_SERVICES_PATH), guard);

    if let Some(loaded) = restaurants.load().await {
        state::with_mut(|s| s.restaurants = loaded);
    }
    if let Some(loaded) = ai_services.load().await {
        state::with_mut(|s| s.ai_services = loaded);
    }

    render(els);
}

/// Record a keystroke and re-render once the input has been quiet long enough.
///
/// The timer re-arms until the keystroke's deadline has passed by `Date.now()`,
/// which some browsers coarsen. A newer keystroke takes over and this one stops.
pub fn on_search_input(els: &Elements) {
    let query = els.search_input.value();
    let due = state::with_mut(|s| {
        s.debouncer.input(&query, dom::now_ms());
        s.debouncer.deadline()
    });
    let Some(due) = due else { return };

    let els = els.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let mut wait_ms = SEARCH_DEBOUNCE_MS;
        loop {
            TimeoutFuture::new(wait_ms as u32).await;
            let now = dom::now_ms();
            let step = state::with_mut(|s| {
                if s.debouncer.deadline() != Some(due) {
                    return DebounceStep::Superseded;
                }
                if now < due {
                    return DebounceStep::Wait(due - now);
                }
                match s.debouncer.poll(now) {
                    Some(_) => DebounceStep::Applied,
                    None => DebounceStep::Superseded,
                }
            });
            match step {
                DebounceStep::Wait(remaining) => wait_ms = remaining,
                DebounceStep::Applied => {
                    render(&els);
                    return;
                }
                DebounceStep::Superseded => return,
            }
        }
    });
}

enum DebounceStep {
    Wait(u128),
    Applied,
    Superseded,
}

pub fn render(els: &Elements) {
    render_status(els);
    render_restaurants(els);
    render_ai_services(els);
    render_bookmarks(els);
}

fn render_status(els: &Elements) {
    let text = state::with(|s| {
        if s.restaurants.loading || s.ai_services.loading {
            return "Loading…".to_owned();
        }
        if let Some(error) = s.restaurants.error.as_ref().or(s.ai_services.error.as_ref()) {
            return error.clone();
        }
        let places = s.restaurants.data.as_ref().map_or(0, Vec::len);
        let services = s.ai_services.data.as_ref().map_or(0, Vec::len);
        format!("{places} places · {services} AI services")
    });
    let failed = state::with(|s| s.restaurants.error.is_some() || s.ai_services.error.is_some());
    dom::toggle_class(&els.catalog_status, "error", failed);
    dom::set_text(&els.catalog_status, &text);
}

fn restaurant_rows(s: &mut AppState) -> Vec<RestaurantRow> {
    let AppState {
        restaurants,
        debouncer,
        origin,
        nearby,
        ..
    } = s;
    let Some(data) = restaurants.data.as_deref() else {
        return Vec::new();
    };

    let matching: HashSet<&str> = filter_entries(data, debouncer.applied())
        .into_iter()
        .map(|r| r.id.as_str())
        .collect();

    let ranked: Vec<(&Restaurant, Option<f64>)> = match origin {
        Some(origin) => nearby
            .get(data, restaurants.revision, *origin, MAP_VIEW_RADIUS)
            .into_iter()
            .map(|ranked| (ranked.entry, Some(ranked.distance_miles)))
            .collect(),
        None => data.iter().map(|r| (r, None)).collect(),
    };

    state::bookmarks(|bookmarks| {
        ranked
            .into_iter()
            .filter(|(r, _)| matching.contains(r.id.as_str()))
            .map(|(r, miles)| RestaurantRow {
                id: r.id.clone(),
                name: r.name.clone(),
                address: r.address.clone(),
                distance: miles.map(format_miles),
                bookmarked: bookmarks.has(&r.id),
            })
            .collect()
    })
}

fn render_restaurants(els: &Elements) {
    let rows = state::with_mut(restaurant_rows);
    dom::clear(&els.restaurant_list);

    for row in rows {
        let Ok(li) = dom::create_element("li") else { continue };
        let label = match &row.distance {
            Some(distance) => format!("{} · {} · {}", row.name, row.address, distance),
            None => format!("{} · {}", row.name, row.address),
        };
        dom::set_text(&li, &label);

        if let Ok(button) = dom::create_element("button") {
            dom::set_text(&button, if row.bookmarked { "★" } else { "☆" });
            dom::add_class(&button, "bookmark");
            let _ = button.set_attribute("data-id", &row.id);
            bind_bookmark_toggle(&button, els, row.id.clone());
            let _ = li.append_child(&button);
        }
        let _ = els.restaurant_list.append_child(&li);
    }
}

fn bind_bookmark_toggle(button: &web_sys::Element, els: &Elements, id: String) {
    let els = els.clone();
    let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
        state::bookmarks(|bookmarks| bookmarks.toggle(&id));
        render_restaurants(&els);
        render_bookmarks(&els);
    }) as Box<dyn FnMut(_)>);
    let _ = button.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref());
    cb.forget();
}

fn render_ai_services(els: &Elements) {
    let rows: Vec<ServiceRow> = state::with(|s| {
        let Some(data) = s.ai_services.data.as_deref() else {
            return Vec::new();
        };
        filter_entries(data, s.debouncer.applied())
            .into_iter()
            .map(|service| ServiceRow {
                name: service.name.clone(),
                category: service.category.clone(),
                description: service.description.clone(),
            })
            .collect()
    });

    dom::clear(&els.ai_service_list);
    for row in rows {
        let Ok(li) = dom::create_element("li") else { continue };
        dom::set_text(&li, &format!("{} ({}) · {}", row.name, row.category, row.description));
        let _ = els.ai_service_list.append_child(&li);
    }
}

fn render_bookmarks(els: &Elements) {
    let names: Vec<String> = state::with(|s| {
        let data = s.restaurants.data.as_deref().unwrap_or_default();
        state::bookmarks(|bookmarks| {
            bookmarks
                .resolve(data, |r| r.id.as_str())
                .into_iter()
                .map(|r| r.name.clone())
                .collect()
        })
    });

    dom::clear(&els.bookmark_list);
    if names.is_empty() {
        dom::set_text(&els.bookmark_list, "No saved places yet.");
        return;
    }
    for name in names {
        let Ok(li) = dom::create_element("li") else { continue };
        dom::set_text(&li, &name);
        let _ = els.bookmark_list.append_child(&li);
    }
}
