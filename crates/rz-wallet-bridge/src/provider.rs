use async_trait::async_trait;
use rz_api_types::{WalletAddress, WalletKind};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("user rejected the request")]
    UserRejected,
    #[error("wallet rejected the request: {0}")]
    Rejected(String),
    #[error("wallet provider unavailable")]
    Unavailable,
}

/// EIP-1193 code for a user-declined request.
const USER_REJECTED_CODE: i64 = 4001;

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::UserRejected)
    }

    /// Classify a raw provider rejection (code and message as the provider sent them).
    pub fn from_rejection(code: Option<i64>, message: &str) -> Self {
        let lowered = message.to_lowercase();
        let user_declined = code == Some(USER_REJECTED_CODE)
            || lowered.contains("user rejected")
            || lowered.contains("user denied")
            || lowered.contains("user cancelled")
            || lowered.contains("user canceled");

        if user_declined {
            ProviderError::UserRejected
        } else {
            ProviderError::Rejected(message.to_owned())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub asset: String,
    pub amount: String,
}

/// `Send + Sync` natively. Browser providers wrap JS handles, which are neither.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WalletProvider: MaybeSendSync {
    fn kind(&self) -> WalletKind;
    async fn is_connected(&self) -> Result<bool, ProviderError>;
    async fn address(&self) -> Result<Option<WalletAddress>, ProviderError>;
    async fn balance(&self, asset: &str) -> Result<Balance, ProviderError>;
    async fn sign_message(&self, message: &str) -> Result<String, ProviderError>;
    async fn sign_transaction(&self, transaction: &str) -> Result<String, ProviderError>;
    /// Stellar/Soroban authorization entry (base64 XDR in, signed XDR out).
    async fn sign_auth_entry(&self, entry: &str) -> Result<String, ProviderError>;
}
