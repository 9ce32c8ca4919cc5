//! `window.rozo` as a [`WalletProvider`].
//!
//! Every method forwards to the injected object once. Promise rejections are
//! classified with [`ProviderError::from_rejection`]; a missing method reads as
//! [`ProviderError::Unavailable`].

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use rz_api_types::{WalletAddress, WalletKind};
use rz_wallet_bridge::{Balance, ProviderError, WalletProvider};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub const PROVIDER_GLOBAL: &str = "rozo";
const READY_EVENT: &str = "ready";

#[derive(Clone)]
pub struct InjectedProvider {
    inner: JsValue,
}

fn field(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    field(target, name)?.dyn_into().ok()
}

fn rejection(err: JsValue) -> ProviderError {
    let code = field(&err, "code").and_then(|code| code.as_f64()).map(|code| code as i64);
    let message = field(&err, "message")
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "wallet request failed".to_owned());
    ProviderError::from_rejection(code, &message)
}

/// A plain string, or the first of `keys` holding one.
fn string_result(value: &JsValue, keys: &[&str]) -> Option<String> {
    value
        .as_string()
        .or_else(|| keys.iter().find_map(|key| field(value, key)?.as_string()))
}

impl InjectedProvider {
    /// The provider the host injected, if it is there yet.
    pub fn probe() -> Option<Self> {
        let window = web_sys::window()?;
        field(&window, PROVIDER_GLOBAL).map(|inner| Self { inner })
    }

    async fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, ProviderError> {
        let function = method(&self.inner, name).ok_or(ProviderError::Unavailable)?;
        let result = match args {
            [] => function.call0(&self.inner),
            [a] => function.call1(&self.inner, a),
            [a, b, ..] => function.call2(&self.inner, a, b),
        }
        .map_err(rejection)?;

        match result.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(rejection),
            Err(value) => Ok(value),
        }
    }

    async fn call_for_string(&self, name: &str, arg: &str, keys: &[&str]) -> Result<String, ProviderError> {
        let value = self.call(name, &[JsValue::from_str(arg)]).await?;
        string_result(&value, keys)
            .ok_or_else(|| ProviderError::Rejected(format!("{name} returned no result")))
    }

    /// Subscribe to the provider's own ready event. Dropping the handle unsubscribes.
    pub fn on_ready(&self, callback: impl FnMut() + 'static) -> Option<ReadySubscription> {
        let on = method(&self.inner, "on")?;
        let callback = Closure::<dyn FnMut()>::new(callback);
        on.call2(&self.inner, &JsValue::from_str(READY_EVENT), callback.as_ref())
            .ok()?;
        Some(ReadySubscription {
            provider: self.inner.clone(),
            callback,
        })
    }
}

pub struct ReadySubscription {
    provider: JsValue,
    callback: Closure<dyn FnMut()>,
}

impl Drop for ReadySubscription {
    fn drop(&mut self) {
        if let Some(off) = method(&self.provider, "off") {
            let _ = off.call2(
                &self.provider,
                &JsValue::from_str(READY_EVENT),
                self.callback.as_ref(),
            );
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    fn kind(&self) -> WalletKind {
        WalletKind::Stellar
    }

    async fn is_connected(&self) -> Result<bool, ProviderError> {
        let value = self.call("isConnected", &[]).await?;
        Ok(value
            .as_bool()
            .or_else(|| field(&value, "isConnected")?.as_bool())
            .unwrap_or(false))
    }

    async fn address(&self) -> Result<Option<WalletAddress>, ProviderError> {
        let value = self.call("getAddress", &[]).await?;
        Ok(string_result(&value, &["address"])
            .filter(|address| !address.is_empty())
            .map(WalletAddress))
    }

    async fn balance(&self, asset: &str) -> Result<Balance, ProviderError> {
        let value = self.call("getBalance", &[JsValue::from_str(asset)]).await?;
        let amount = string_result(&value, &["amount", "balance"])
            .or_else(|| value.as_f64().map(|amount| amount.to_string()))
            .ok_or_else(|| ProviderError::Rejected("getBalance returned no amount".to_owned()))?;
        Ok(Balance {
            asset: asset.to_owned(),
            amount,
        })
    }

    async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        self.call_for_string("signMessage", message, &["signedMessage", "signature"])
            .await
    }

    async fn sign_transaction(&self, transaction: &str) -> Result<String, ProviderError> {
        self.call_for_string("signTransaction", transaction, &["signedTxXdr", "signedTransaction"])
            .await
    }

    async fn sign_auth_entry(&self, entry: &str) -> Result<String, ProviderError> {
        self.call_for_string("signAuthEntry", entry, &["signedAuthEntry"])
            .await
    }
}
