//! Wallet provider bridging.
//!
//! Providers are injected by the host (a global object in the page, or an EVM
//! connector library). Nothing here retries or queues: every call is forwarded
//! once and its value or rejection handed back unchanged.
//!
//! [`detect`] runs on tokio and is native-only; the browser front-end polls with
//! its own timers.

pub mod bridge;
#[cfg(not(target_arch = "wasm32"))]
pub mod detect;
pub mod provider;

pub use bridge::{ConnectionStatus, ProviderRegistry, WalletBridge};
#[cfg(not(target_arch = "wasm32"))]
pub use detect::{DetectCanceller, Detection, ProviderDetector, ProviderProbe, ReadySignal};
pub use provider::{Balance, MaybeSendSync, ProviderError, WalletProvider};
