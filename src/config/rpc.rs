//! RPC endpoint configuration
//!
//! Resolution order:
//! 1. `RPC_URL` environment variable
//! 2. `rpc_url` from the config file
//! 3. The public testnet endpoint (rate limited)

/// Environment variable that overrides the configured endpoint
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Public endpoint used when nothing else is configured
pub const DEFAULT_RPC_URL: &str = "https://rpc-testnet.unit0.dev";

/// Resolved RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    url: String,
}

impl RpcConfig {
    /// Resolve from the environment, falling back to `configured`
    pub fn resolve(configured: Option<&str>) -> Self {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Using RPC_URL from environment");
                return Self::with_url(url.trim());
            }
        }

        match configured {
            Some(url) => Self::with_url(url),
            None => {
                tracing::warn!("No RPC configured, using public endpoint (rate limited)");
                Self::with_url(DEFAULT_RPC_URL)
            }
        }
    }

    /// Create with an explicit URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
