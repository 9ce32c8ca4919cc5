use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Evm,
    Stellar,
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

// ── Catalog ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub cashback_rate: Option<f64>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiService {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub cashback_rate: Option<f64>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
}

// ── Local receipts ──

/// A completed payment, kept locally for the history view.
///
/// `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReceipt {
    pub order_id: String,
    pub payer_address: String,
    pub payee_handle: String,
    pub amount_usd_cents: u64,
    pub amount_local: String,
    pub currency: String,
    pub timestamp: u128,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub points_used: bool,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_logo: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

// ── Backend: auth & user ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletLoginRequest {
    pub wallet_address: String,
    pub wallet_kind: WalletKind,
    pub message: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletLoginResponse {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendPermission {
    pub wallet_address: String,
    pub spender: String,
    pub token: String,
    pub allowance_usd_cents: u64,
    pub period_seconds: u64,
    #[serde(default)]
    pub start_epoch_s: Option<u64>,
    #[serde(default)]
    pub end_epoch_s: Option<u64>,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendPermissionResponse {
    #[serde(default)]
    pub permission: Option<SpendPermission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub wallet_address: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_payments: u64,
    pub total_spent_usd_cents: u64,
    pub total_cashback_points: u64,
}

// ── Backend: merchants & products ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub cashback_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub merchant_id: String,
    pub name: String,
    pub price_usd_cents: u64,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantListResponse {
    pub merchants: Vec<Merchant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

// ── Backend: cashback ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackBalance {
    pub wallet_address: String,
    pub points: u64,
    pub usd_cents_equivalent: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackApplyRequest {
    pub order_id: String,
    pub points: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackApplyResponse {
    pub applied: bool,
    pub discount_usd_cents: u64,
    pub remaining_points: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackClaimResponse {
    pub claimed_points: u64,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

// ── Backend: payments ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEligibilityRequest {
    pub wallet_address: String,
    pub payee_handle: String,
    pub amount_usd_cents: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEligibilityResponse {
    pub eligible: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub order_id: String,
    pub wallet_address: String,
    pub wallet_kind: WalletKind,
    pub payee_handle: String,
    pub amount_usd_cents: u64,
    pub currency: String,
    pub use_points: bool,
}

/// The backend answers with the unsigned transaction the wallet has to sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    pub intent_id: String,
    pub order_id: String,
    pub unsigned_transaction: String,
    pub amount_local: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProcessRequest {
    pub intent_id: String,
    pub order_id: String,
    pub signed_transaction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProcessResponse {
    pub accepted: bool,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmRequest {
    pub order_id: String,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmResponse {
    pub confirmed: bool,
    pub status: String,
    #[serde(default)]
    pub cashback_points: u64,
}

// ── Backend: cart & orders ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_usd_cents: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_usd_cents: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub status: String,
    pub total_usd_cents: u64,
    pub created_at_epoch_ms: u128,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
}

// ── Mini-app manifest ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniAppManifest {
    pub account_association: AccountAssociation,
    pub frame: MiniAppFrame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniAppFrame {
    pub version: String,
    pub name: String,
    pub icon_url: String,
    pub home_url: String,
    pub image_url: String,
    pub button_title: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}
