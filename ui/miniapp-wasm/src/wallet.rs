//! Injected wallet detection and signing.
//!
//! The host injects `window.rozo` and fires `rozo#ready` when it is done. Either
//! may happen before or after the app starts, so detection probes right away,
//! keeps probing for a few seconds, and a late ready event still connects. A
//! provider that is present but not yet connected is re-checked on its own
//! `ready` event.

use crate::dom::{self, Elements};
use crate::provider::{InjectedProvider, ReadySubscription};
use crate::state::{self, WalletStatus};
use gloo_timers::future::TimeoutFuture;
use rz_discovery::MountGuard;
use rz_wallet_bridge::{ConnectionStatus, WalletBridge};
use std::cell::RefCell;
use std::sync::Arc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const READY_EVENT: &str = "rozo#ready";
const DETECT_TIMEOUT_MS: u32 = 3_000;
const POLL_INTERVAL_MS: u32 = 100;

pub enum Detection {
    Ready(InjectedProvider),
    TimedOut,
    Cancelled,
}

/// `rozo#ready` on `window`; removed on drop.
struct WindowListener {
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        if let Ok(window) = dom::window() {
            let _ = window
                .remove_event_listener_with_callback(READY_EVENT, self.callback.as_ref().unchecked_ref());
        }
    }
}

#[derive(Default)]
struct WalletHandles {
    bridge: Option<WalletBridge>,
    provider_ready: Option<ReadySubscription>,
    window_ready: Option<WindowListener>,
}

thread_local! {
    static WALLET: RefCell<WalletHandles> = RefCell::new(WalletHandles::default());
}

/// Bridge to the detected provider, once there is one.
pub fn bridge() -> Option<WalletBridge> {
    WALLET.with(|w| w.borrow().bridge.clone())
}

fn stop_listening() {
    let (provider_ready, window_ready) = WALLET.with(|w| {
        let mut w = w.borrow_mut();
        (w.provider_ready.take(), w.window_ready.take())
    });
    drop(provider_ready);
    drop(window_ready);
}

/// Wait up to `timeout_ms` for the provider, or until `guard` is unmounted.
pub async fn wait_for_provider(timeout_ms: u32, guard: &MountGuard) -> Detection {
    let mut waited = 0;
    loop {
        if !guard.is_mounted() {
            return Detection::Cancelled;
        }
        if let Some(provider) = InjectedProvider::probe() {
            return Detection::Ready(provider);
        }
        if waited >= timeout_ms {
            return Detection::TimedOut;
        }
        TimeoutFuture::new(POLL_INTERVAL_MS).await;
        waited += POLL_INTERVAL_MS;
    }
}

async fn attach(els: &Elements, provider: InjectedProvider) {
    let bridge = WalletBridge::new(Arc::new(provider.clone()));
    let status = bridge.status().await;
    WALLET.with(|w| w.borrow_mut().bridge = Some(bridge));

    match status {
        Ok(ConnectionStatus::Connected(address)) => {
            state::set_wallet_status(WalletStatus::Ready {
                address: Some(address.0),
            });
            stop_listening();
        }
        Ok(ConnectionStatus::Disconnected) => {
            state::set_wallet_status(WalletStatus::Ready { address: None });
            listen_on_provider(els, &provider);
        }
        Err(err) => {
            gloo_console::warn!(format!("wallet status failed: {err}"));
            state::set_wallet_status(WalletStatus::Ready { address: None });
        }
    }
    render_status(els);
}

fn listen_on_provider(els: &Elements, provider: &InjectedProvider) {
    if WALLET.with(|w| w.borrow().provider_ready.is_some()) {
        return;
    }
    let els = els.clone();
    let reconnect = provider.clone();
    let subscription = provider.on_ready(move || {
        let els = els.clone();
        let provider = reconnect.clone();
        wasm_bindgen_futures::spawn_local(async move {
            attach(&els, provider).await;
        });
    });
    WALLET.with(|w| w.borrow_mut().provider_ready = subscription);
}

fn listen_on_window(els: &Elements) {
    let Ok(window) = dom::window() else { return };
    let els = els.clone();
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Some(provider) = InjectedProvider::probe() {
            let els = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                attach(&els, provider).await;
            });
        }
    });
    if window
        .add_event_listener_with_callback(READY_EVENT, callback.as_ref().unchecked_ref())
        .is_ok()
    {
        WALLET.with(|w| w.borrow_mut().window_ready = Some(WindowListener { callback }));
    }
}

pub fn render_status(els: &Elements) {
    let text = match state::wallet_status() {
        WalletStatus::Detecting => "Looking for wallet…".to_owned(),
        WalletStatus::Ready { address: Some(address) } => format!("Wallet {address}"),
        WalletStatus::Ready { address: None } => "Wallet found, not connected".to_owned(),
        WalletStatus::Missing => "No wallet detected".to_owned(),
    };
    dom::set_text(&els.wallet_status, &text);
}

pub fn detect(els: &Elements) {
    render_status(els);
    listen_on_window(els);

    let els = els.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let guard = state::mount_guard();
        match wait_for_provider(DETECT_TIMEOUT_MS, &guard).await {
            Detection::Ready(provider) => attach(&els, provider).await,
            Detection::TimedOut => {
                gloo_console::log!("no injected wallet after 3s");
                if state::wallet_status() == WalletStatus::Detecting {
                    state::set_wallet_status(WalletStatus::Missing);
                }
                render_status(&els);
            }
            Detection::Cancelled => stop_listening(),
        }
    });
}

// ── Host-facing signing ──

fn connected_bridge() -> Result<WalletBridge, JsValue> {
    bridge().ok_or_else(|| JsValue::from_str("no wallet connected"))
}

fn to_js(err: rz_wallet_bridge::ProviderError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(js_name = walletBalance)]
pub async fn wallet_balance(asset: String) -> Result<String, JsValue> {
    let balance = connected_bridge()?.balance(&asset).await.map_err(to_js)?;
    Ok(balance.amount)
}

#[wasm_bindgen(js_name = signMessage)]
pub async fn sign_message(message: String) -> Result<String, JsValue> {
    connected_bridge()?.sign_message(&message).await.map_err(to_js)
}

#[wasm_bindgen(js_name = signTransaction)]
pub async fn sign_transaction(transaction: String) -> Result<String, JsValue> {
    connected_bridge()?
        .sign_transaction(&transaction)
        .await
        .map_err(to_js)
}

#[wasm_bindgen(js_name = signAuthEntry)]
pub async fn sign_auth_entry(entry: String) -> Result<String, JsValue> {
    connected_bridge()?.sign_auth_entry(&entry).await.map_err(to_js)
}
