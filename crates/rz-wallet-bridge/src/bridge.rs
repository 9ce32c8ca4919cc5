use crate::provider::{Balance, ProviderError, WalletProvider};
use rz_api_types::{WalletAddress, WalletKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected(WalletAddress),
    Disconnected,
}

/// Pass-through front for one provider.
#[derive(Clone)]
pub struct WalletBridge {
    provider: Arc<dyn WalletProvider>,
}

impl WalletBridge {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    pub fn kind(&self) -> WalletKind {
        self.provider.kind()
    }

    pub async fn status(&self) -> Result<ConnectionStatus, ProviderError> {
        if !self.provider.is_connected().await? {
            return Ok(ConnectionStatus::Disconnected);
        }
        Ok(match self.provider.address().await? {
            Some(address) => ConnectionStatus::Connected(address),
            None => ConnectionStatus::Disconnected,
        })
    }

    pub async fn address(&self) -> Result<Option<WalletAddress>, ProviderError> {
        self.provider.address().await
    }

    pub async fn balance(&self, asset: &str) -> Result<Balance, ProviderError> {
        self.provider.balance(asset).await
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        debug!("forwarding sign_message to {:?} provider", self.kind());
        self.provider.sign_message(message).await
    }

    pub async fn sign_transaction(&self, transaction: &str) -> Result<String, ProviderError> {
        debug!("forwarding sign_transaction to {:?} provider", self.kind());
        self.provider.sign_transaction(transaction).await
    }

    pub async fn sign_auth_entry(&self, entry: &str) -> Result<String, ProviderError> {
        debug!("forwarding sign_auth_entry to {:?} provider", self.kind());
        self.provider.sign_auth_entry(entry).await
    }
}

/// Providers by wallet family; the EVM connector and the Stellar-side injected
/// wallet run side by side.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<WalletKind, Arc<dyn WalletProvider>>,
}

impl ProviderRegistry {
    pub fn register(&mut self, provider: Arc<dyn WalletProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn bridge(&self, kind: WalletKind) -> Option<WalletBridge> {
        self.providers.get(&kind).cloned().map(WalletBridge::new)
    }
}
