//! Pay a merchant from the connected wallet.
//!
//! The order id is minted here and is the only key the local receipt is stored
//! under. Whatever order id the backend echoes back is informational.

use rz_api_types::{
    PaymentConfirmRequest, PaymentEligibilityRequest, PaymentIntentRequest, PaymentProcessRequest,
    PaymentReceipt,
};
use rz_backend_client::{BackendClient, BackendError, Transport, idempotency_key};
use rz_storage::{Clock, KvStore, ReceiptStore, SystemClock};
use rz_wallet_bridge::{ProviderError, WalletBridge};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub payee_handle: String,
    pub amount_usd_cents: u64,
    pub currency: String,
    pub description: String,
    pub use_points: bool,
    pub merchant_name: Option<String>,
    pub merchant_logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Paid(PaymentReceipt),
    /// The user declined the signature prompt.
    Cancelled { order_id: String },
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("no wallet connected")]
    WalletNotConnected,
    #[error("payment not allowed: {0}")]
    NotEligible(String),
    #[error("payment was not accepted")]
    NotAccepted,
    #[error("payment was not confirmed: {0}")]
    NotConfirmed(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Wallet(#[from] ProviderError),
}

pub struct Checkout<T, S, C = SystemClock> {
    backend: Arc<BackendClient<T>>,
    wallet: WalletBridge,
    receipts: ReceiptStore<S, C>,
}

impl<T, S, C> Checkout<T, S, C>
where
    T: Transport,
    S: KvStore,
    C: Clock,
{
    pub fn new(backend: Arc<BackendClient<T>>, wallet: WalletBridge, receipts: ReceiptStore<S, C>) -> Self {
        Self {
            backend,
            wallet,
            receipts,
        }
    }

    pub fn receipts(&self) -> &ReceiptStore<S, C> {
        &self.receipts
    }

    pub async fn pay(&self, request: &PaymentRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let payer = self
            .wallet
            .address()
            .await?
            .ok_or(CheckoutError::WalletNotConnected)?;

        let eligibility = self
            .backend
            .check_eligibility(&PaymentEligibilityRequest {
                wallet_address: payer.0.clone(),
                payee_handle: request.payee_handle.clone(),
                amount_usd_cents: request.amount_usd_cents,
            })
            .await?;
        if !eligibility.eligible {
            return Err(CheckoutError::NotEligible(
                eligibility.reason.unwrap_or_else(|| "not eligible".to_owned()),
            ));
        }

        let order_id = Uuid::new_v4().to_string();
        let intent = self
            .backend
            .create_intent(&PaymentIntentRequest {
                order_id: order_id.clone(),
                wallet_address: payer.0.clone(),
                wallet_kind: self.wallet.kind(),
                payee_handle: request.payee_handle.clone(),
                amount_usd_cents: request.amount_usd_cents,
                currency: request.currency.clone(),
                use_points: request.use_points,
            })
            .await?;

        let signed_transaction = match self.wallet.sign_transaction(&intent.unsigned_transaction).await {
            Ok(signed) => signed,
            Err(err) if err.is_user_rejection() => {
                info!("payment {} cancelled in wallet", order_id);
                return Ok(CheckoutOutcome::Cancelled { order_id });
            }
            Err(err) => return Err(err.into()),
        };

        let processed = self
            .backend
            .process_payment(
                &PaymentProcessRequest {
                    intent_id: intent.intent_id.clone(),
                    order_id: order_id.clone(),
                    signed_transaction,
                },
                &idempotency_key(&order_id, &payer.0, request.amount_usd_cents),
            )
            .await?;
        if !processed.accepted {
            return Err(CheckoutError::NotAccepted);
        }

        let confirmation = self
            .backend
            .confirm_payment(&PaymentConfirmRequest {
                order_id: order_id.clone(),
                tx_hash: processed.tx_hash.clone(),
            })
            .await?;
        debug!(
            "payment {} confirmed={} status={} cashback={}",
            order_id, confirmation.confirmed, confirmation.status, confirmation.cashback_points
        );
        if !confirmation.confirmed {
            warn!("payment {} not confirmed: {}", order_id, confirmation.status);
            return Err(CheckoutError::NotConfirmed(confirmation.status));
        }

        let receipt = PaymentReceipt {
            order_id: processed.order_id.unwrap_or(intent.order_id),
            payer_address: payer.0,
            payee_handle: request.payee_handle.clone(),
            amount_usd_cents: request.amount_usd_cents,
            amount_local: intent.amount_local,
            currency: request.currency.clone(),
            timestamp: self.receipts.clock().now_epoch_ms(),
            description: request.description.clone(),
            points_used: request.use_points,
            merchant_name: request.merchant_name.clone(),
            merchant_logo: request.merchant_logo.clone(),
            tx_hash: processed.tx_hash,
        };
        self.receipts.save(&order_id, receipt.clone());
        info!("payment {} to {} completed", order_id, request.payee_handle);

        Ok(CheckoutOutcome::Paid(PaymentReceipt { order_id, ..receipt }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rz_api_types::{WalletAddress, WalletKind};
    use rz_backend_client::{ApiRequest, Session};
    use rz_storage::{FixedClock, InMemoryStore};
    use rz_wallet_bridge::{Balance, WalletProvider};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const NOW: u64 = 1_760_000_000_000;

    /// Answers by path; records every request.
    struct RoutedTransport {
        routes: HashMap<&'static str, Value>,
        sent: Mutex<Vec<ApiRequest>>,
    }

    impl RoutedTransport {
        fn new(routes: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
            Self {
                routes: routes.into_iter().collect(),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn paths(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|r| r.path.clone()).collect()
        }
    }

    #[async_trait]
    impl Transport for RoutedTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, BackendError> {
            let response = self.routes.get(request.path.as_str()).cloned();
            self.sent.lock().unwrap().push(request.clone());
            response.ok_or(BackendError::Status {
                status: 404,
                body: request.path,
            })
        }
    }

    struct StubWallet {
        sign: Result<String, ProviderError>,
    }

    #[async_trait]
    impl WalletProvider for StubWallet {
        fn kind(&self) -> WalletKind {
            WalletKind::Evm
        }

        async fn is_connected(&self) -> Result<bool, ProviderError> {
            Ok(true)
        }

        async fn address(&self) -> Result<Option<WalletAddress>, ProviderError> {
            Ok(Some(WalletAddress("0xpayer".to_owned())))
        }

        async fn balance(&self, asset: &str) -> Result<Balance, ProviderError> {
            Ok(Balance {
                asset: asset.to_owned(),
                amount: "100".to_owned(),
            })
        }

        async fn sign_message(&self, _message: &str) -> Result<String, ProviderError> {
            self.sign.clone()
        }

        async fn sign_transaction(&self, _transaction: &str) -> Result<String, ProviderError> {
            self.sign.clone()
        }

        async fn sign_auth_entry(&self, _entry: &str) -> Result<String, ProviderError> {
            self.sign.clone()
        }
    }

    fn session() -> anyhow::Result<Session> {
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &json!({"sub": "user-1", "exp": 4_000_000_000u64}),
            &jsonwebtoken::EncodingKey::from_secret(b"secret"),
        )?;
        Ok(Session::from_token(token)?)
    }

    fn happy_routes(eligible: bool, accepted: bool) -> Vec<(&'static str, Value)> {
        let reason = (!eligible).then_some("daily limit reached");
        vec![
            (
                "/payments/eligibility",
                json!({"eligible": eligible, "reason": reason}),
            ),
            (
                "/payments/intent",
                json!({
                    "intent_id": "intent-7",
                    "order_id": "backend-order-99",
                    "unsigned_transaction": "0xunsigned",
                    "amount_local": "12.50"
                }),
            ),
            (
                "/payments/process",
                json!({"accepted": accepted, "tx_hash": "0xtx", "order_id": "backend-order-99"}),
            ),
            (
                "/payments/confirm",
                json!({"confirmed": true, "status": "completed", "cashback_points": 12}),
            ),
        ]
    }

    fn checkout(
        routes: Vec<(&'static str, Value)>,
        sign: Result<String, ProviderError>,
    ) -> anyhow::Result<Checkout<RoutedTransport, InMemoryStore, FixedClock>> {
        let backend = Arc::new(BackendClient::new(RoutedTransport::new(routes)));
        backend.set_session(session()?);
        Ok(Checkout::new(
            backend,
            WalletBridge::new(Arc::new(StubWallet { sign })),
            ReceiptStore::with_clock(InMemoryStore::default(), FixedClock::at(NOW)),
        ))
    }

    fn lunch() -> PaymentRequest {
        PaymentRequest {
            payee_handle: "cafe-aroma".to_owned(),
            amount_usd_cents: 1250,
            currency: "USD".to_owned(),
            description: "Lunch".to_owned(),
            use_points: false,
            merchant_name: Some("Cafe Aroma".to_owned()),
            merchant_logo: None,
        }
    }

    #[tokio::test]
    async fn paid_receipt_is_stored_under_our_order_id() -> anyhow::Result<()> {
        let checkout = checkout(happy_routes(true, true), Ok("0xsigned".to_owned()))?;

        let CheckoutOutcome::Paid(receipt) = checkout.pay(&lunch()).await? else {
            anyhow::bail!("expected a paid outcome");
        };

        assert_ne!(receipt.order_id, "backend-order-99");
        assert!(checkout.receipts().get("backend-order-99").is_none());

        let stored = checkout.receipts().get(&receipt.order_id).expect("receipt saved");
        assert_eq!(stored, receipt);
        assert_eq!(stored.tx_hash.as_deref(), Some("0xtx"));
        assert_eq!(stored.amount_local, "12.50");
        assert_eq!(stored.timestamp, u128::from(NOW));
        Ok(())
    }

    #[tokio::test]
    async fn process_uses_idempotency_key_for_the_order() -> anyhow::Result<()> {
        let checkout = checkout(happy_routes(true, true), Ok("0xsigned".to_owned()))?;
        let CheckoutOutcome::Paid(receipt) = checkout.pay(&lunch()).await? else {
            anyhow::bail!("expected a paid outcome");
        };

        let sent = checkout.backend.transport().sent.lock().unwrap().clone();
        let process = sent
            .iter()
            .find(|r| r.path == "/payments/process")
            .expect("process sent");
        assert_eq!(
            process.idempotency_key.as_deref(),
            Some(idempotency_key(&receipt.order_id, "0xpayer", 1250).as_str())
        );
        Ok(())
    }

    #[tokio::test]
    async fn user_rejection_cancels_without_receipt() -> anyhow::Result<()> {
        let checkout = checkout(happy_routes(true, true), Err(ProviderError::UserRejected))?;

        let outcome = checkout.pay(&lunch()).await?;
        assert!(matches!(outcome, CheckoutOutcome::Cancelled { .. }));
        assert!(checkout.receipts().list_ids().is_empty());
        assert!(!checkout.backend.transport().paths().contains(&"/payments/process".to_owned()));
        Ok(())
    }

    #[tokio::test]
    async fn other_wallet_errors_fail() -> anyhow::Result<()> {
        let checkout = checkout(
            happy_routes(true, true),
            Err(ProviderError::Rejected("insufficient funds".to_owned())),
        )?;

        let err = checkout.pay(&lunch()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Wallet(ProviderError::Rejected(_))));
        assert!(checkout.receipts().list_ids().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn ineligible_payment_stops_before_intent() -> anyhow::Result<()> {
        let checkout = checkout(happy_routes(false, true), Ok("0xsigned".to_owned()))?;

        let err = checkout.pay(&lunch()).await.unwrap_err();
        assert!(matches!(&err, CheckoutError::NotEligible(reason) if reason == "daily limit reached"));
        assert_eq!(checkout.backend.transport().paths(), ["/payments/eligibility"]);
        Ok(())
    }

    #[tokio::test]
    async fn unconfirmed_payment_saves_nothing() -> anyhow::Result<()> {
        let mut routes = happy_routes(true, true);
        routes.retain(|(path, _)| *path != "/payments/confirm");
        routes.push(("/payments/confirm", json!({"confirmed": false, "status": "failed"})));
        let checkout = checkout(routes, Ok("0xsigned".to_owned()))?;

        let err = checkout.pay(&lunch()).await.unwrap_err();
        assert!(matches!(&err, CheckoutError::NotConfirmed(status) if status == "failed"));
        assert!(checkout.receipts().list_ids().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_submission_saves_nothing() -> anyhow::Result<()> {
        let checkout = checkout(happy_routes(true, false), Ok("0xsigned".to_owned()))?;

        let err = checkout.pay(&lunch()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotAccepted));
        assert!(checkout.receipts().list_ids().is_empty());
        Ok(())
    }
}
