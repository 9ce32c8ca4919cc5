//! Application state.
//!
//! `RefCell`-wrapped `thread_local!` storage; WASM is single-threaded. The
//! persisted stores sit in their own slots so a render can read them while the
//! main state is borrowed.

use crate::storage::{BrowserClock, LocalStore};
use rz_api_types::{AiService, Coordinates, Restaurant};
use rz_discovery::{LoadState, MountGuard, NearbyMemo, QueryDebouncer};
use rz_storage::{BookmarkStore, ReceiptStore};
use std::cell::RefCell;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum WalletStatus {
    #[default]
    Detecting,
    Ready {
        address: Option<String>,
    },
    Missing,
}

#[derive(Default)]
pub struct AppState {
    pub mount: MountGuard,
    pub restaurants: LoadState<Restaurant>,
    pub ai_services: LoadState<AiService>,
    pub debouncer: QueryDebouncer,
    pub origin: Option<Coordinates>,
    pub nearby: NearbyMemo,
    pub wallet: WalletStatus,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
    static BOOKMARKS: BookmarkStore<LocalStore> = BookmarkStore::load(LocalStore);
    static RECEIPTS: ReceiptStore<LocalStore, BrowserClock> =
        ReceiptStore::with_clock(LocalStore, BrowserClock);
}

/// Run a closure with shared read access to the state.
pub fn with<F, R>(f: F) -> R
where
    F: FnOnce(&AppState) -> R,
{
    STATE.with(|s| f(&s.borrow()))
}

/// Run a closure with mutable access to the state.
pub fn with_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    STATE.with(|s| f(&mut s.borrow_mut()))
}

pub fn bookmarks<F, R>(f: F) -> R
where
    F: FnOnce(&BookmarkStore<LocalStore>) -> R,
{
    BOOKMARKS.with(f)
}

pub fn receipts<F, R>(f: F) -> R
where
    F: FnOnce(&ReceiptStore<LocalStore, BrowserClock>) -> R,
{
    RECEIPTS.with(f)
}

// ── Convenience accessors ──

pub fn mount_guard() -> MountGuard {
    with(|s| s.mount.clone())
}

pub fn set_origin(origin: Coordinates) {
    with_mut(|s| s.origin = Some(origin));
}

pub fn wallet_status() -> WalletStatus {
    with(|s| s.wallet.clone())
}

pub fn set_wallet_status(status: WalletStatus) {
    with_mut(|s| s.wallet = status);
}
