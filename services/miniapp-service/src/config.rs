use anyhow::{Context, Result};
use rz_api_types::AccountAssociation;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub(crate) struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub restaurants_path: PathBuf,
    pub ai_services_path: PathBuf,
    pub public_url: String,
    pub account_association: AccountAssociation,
    pub tls: Option<TlsPaths>,
}

impl ServiceConfig {
    /// Reads `MINIAPP_*` variables, falling back to local-development defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("MINIAPP_BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_owned())
            .parse()
            .context("MINIAPP_BIND_ADDR is not a socket address")?;

        let tls = match (lookup("MINIAPP_TLS_CERT"), lookup("MINIAPP_TLS_KEY")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => anyhow::bail!("MINIAPP_TLS_CERT and MINIAPP_TLS_KEY must be set together"),
        };

        let public_url = lookup("MINIAPP_PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_owned())
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            bind_addr,
            restaurants_path: lookup("MINIAPP_RESTAURANTS_PATH")
                .unwrap_or_else(|| "public/restaurants.json".to_owned())
                .into(),
            ai_services_path: lookup("MINIAPP_AI_SERVICES_PATH")
                .unwrap_or_else(|| "public/ai-services.json".to_owned())
                .into(),
            public_url,
            account_association: AccountAssociation {
                header: lookup("MINIAPP_ACCOUNT_HEADER").unwrap_or_default(),
                payload: lookup("MINIAPP_ACCOUNT_PAYLOAD").unwrap_or_default(),
                signature: lookup("MINIAPP_ACCOUNT_SIGNATURE").unwrap_or_default(),
            },
            tls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() -> anyhow::Result<()> {
        let config = ServiceConfig::from_lookup(|_| None)?;
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.public_url, "http://localhost:3000");
        assert!(config.tls.is_none());
        Ok(())
    }

    #[test]
    fn public_url_trailing_slash_is_trimmed() -> anyhow::Result<()> {
        let config = ServiceConfig::from_lookup(lookup_from(&[("MINIAPP_PUBLIC_URL", "https://rozo.example/")]))?;
        assert_eq!(config.public_url, "https://rozo.example");
        Ok(())
    }

    #[test]
    fn tls_needs_both_paths() {
        let result = ServiceConfig::from_lookup(lookup_from(&[("MINIAPP_TLS_CERT", "cert.pem")]));
        assert!(result.is_err());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let result = ServiceConfig::from_lookup(lookup_from(&[("MINIAPP_BIND_ADDR", "not-an-addr")]));
        assert!(result.is_err());
    }
}
