//! Typed calls against the Rozo functions gateway.

use crate::error::BackendError;
use crate::session::Session;
use crate::transport::{ApiRequest, Transport};
use rz_api_types::{
    Cart, CartItem, CashbackApplyRequest, CashbackApplyResponse, CashbackBalance,
    CashbackClaimResponse, MerchantListResponse, Order, OrderListResponse,
    PaymentConfirmRequest, PaymentConfirmResponse, PaymentEligibilityRequest,
    PaymentEligibilityResponse, PaymentIntentRequest, PaymentIntentResponse,
    PaymentProcessRequest, PaymentProcessResponse, ProductListResponse, SpendPermission,
    SpendPermissionResponse, UserProfile, UserStats, WalletLoginRequest, WalletLoginResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Key for the `Idempotency-Key` header of a payment submission.
///
/// Retrying the same order from the same payer for the same amount yields the same
/// key, so the gateway can drop the duplicate.
pub fn idempotency_key(order_id: &str, payer_address: &str, amount_usd_cents: u64) -> String {
    let payload = format!("{order_id}:{payer_address}:{amount_usd_cents}");
    hex_lower(&Sha256::digest(payload.as_bytes()))
}

pub struct BackendClient<T> {
    transport: T,
    session: RwLock<Option<Session>>,
}

impl<T: Transport> BackendClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session: RwLock::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_session(&self, session: Session) {
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session);
        }
    }

    pub fn clear_session(&self) {
        if let Ok(mut slot) = self.session.write() {
            *slot = None;
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|slot| slot.clone())
    }

    // ── auth & user ──

    /// Exchange a signed login message for a session. The session is kept for
    /// every later authenticated call.
    pub async fn login(&self, request: &WalletLoginRequest) -> Result<WalletLoginResponse, BackendError> {
        let response: WalletLoginResponse = self
            .call(ApiRequest::post("/wallet-login", to_body(request)?))
            .await?;
        self.set_session(Session::from_token(response.token.clone())?);
        debug!("signed in as {}", response.user_id);
        Ok(response)
    }

    pub async fn spend_permission(&self) -> Result<SpendPermissionResponse, BackendError> {
        self.call_authed(ApiRequest::get("/spend-permission")).await
    }

    pub async fn update_spend_permission(
        &self,
        permission: &SpendPermission,
    ) -> Result<SpendPermissionResponse, BackendError> {
        self.call_authed(ApiRequest::post("/spend-permission", to_body(permission)?))
            .await
    }

    pub async fn user_profile(&self) -> Result<UserProfile, BackendError> {
        self.call_authed(ApiRequest::get("/user/profile")).await
    }

    pub async fn user_stats(&self) -> Result<UserStats, BackendError> {
        self.call_authed(ApiRequest::get("/user/stats")).await
    }

    // ── merchants ──

    pub async fn merchants(&self) -> Result<MerchantListResponse, BackendError> {
        self.call(ApiRequest::get("/merchants")).await
    }

    pub async fn products(&self, merchant_id: &str) -> Result<ProductListResponse, BackendError> {
        self.call(ApiRequest::get(format!("/merchants/{merchant_id}/products")))
            .await
    }

    // ── cashback ──

    pub async fn cashback_balance(&self) -> Result<CashbackBalance, BackendError> {
        self.call_authed(ApiRequest::get("/cashback/balance")).await
    }

    pub async fn apply_cashback(
        &self,
        request: &CashbackApplyRequest,
    ) -> Result<CashbackApplyResponse, BackendError> {
        self.call_authed(ApiRequest::post("/cashback/apply", to_body(request)?))
            .await
    }

    pub async fn claim_cashback(&self) -> Result<CashbackClaimResponse, BackendError> {
        self.call_authed(ApiRequest::post("/cashback/claim", Value::Null))
            .await
    }

    // ── payments ──

    pub async fn check_eligibility(
        &self,
        request: &PaymentEligibilityRequest,
    ) -> Result<PaymentEligibilityResponse, BackendError> {
        self.call_authed(ApiRequest::post("/payments/eligibility", to_body(request)?))
            .await
    }

    pub async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, BackendError> {
        self.call_authed(ApiRequest::post("/payments/intent", to_body(request)?))
            .await
    }

    pub async fn process_payment(
        &self,
        request: &PaymentProcessRequest,
        idempotency_key: &str,
    ) -> Result<PaymentProcessResponse, BackendError> {
        self.call_authed(
            ApiRequest::post("/payments/process", to_body(request)?)
                .with_idempotency_key(idempotency_key),
        )
        .await
    }

    pub async fn confirm_payment(
        &self,
        request: &PaymentConfirmRequest,
    ) -> Result<PaymentConfirmResponse, BackendError> {
        self.call_authed(ApiRequest::post("/payments/confirm", to_body(request)?))
            .await
    }

    // ── cart & orders ──

    pub async fn cart(&self) -> Result<Cart, BackendError> {
        self.call_authed(ApiRequest::get("/cart")).await
    }

    pub async fn add_to_cart(&self, item: &CartItem) -> Result<Cart, BackendError> {
        self.call_authed(ApiRequest::post("/cart/items", to_body(item)?))
            .await
    }

    pub async fn remove_from_cart(&self, product_id: &str) -> Result<Cart, BackendError> {
        self.call_authed(ApiRequest::delete(format!("/cart/items/{product_id}")))
            .await
    }

    pub async fn orders(&self) -> Result<OrderListResponse, BackendError> {
        self.call_authed(ApiRequest::get("/orders")).await
    }

    pub async fn order(&self, order_id: &str) -> Result<Order, BackendError> {
        self.call_authed(ApiRequest::get(format!("/orders/{order_id}")))
            .await
    }

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, BackendError> {
        let path = request.path.clone();
        let value = self.transport.send(request).await?;
        serde_json::from_value(value).map_err(|err| {
            warn!("unexpected response shape from {}: {}", path, err);
            BackendError::Decode(format!("{path}: {err}"))
        })
    }

    async fn call_authed<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, BackendError> {
        let session = self.session().ok_or(BackendError::NotSignedIn)?;
        if session.is_expired() {
            return Err(BackendError::SessionExpired);
        }
        self.call(request.with_bearer(session.token())).await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, BackendError> {
    serde_json::to_value(body).map_err(|err| BackendError::Decode(err.to_string()))
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
