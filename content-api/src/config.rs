//! Content API client configuration.

use std::fmt;
use std::str::FromStr;

/// Stage whose API host has no stage prefix.
const PRODUCTION_STAGE: &str = "prod";

/// The identity a token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Identity {
    /// Public read access.
    #[default]
    Anonymous,
    /// Privileged server-to-server access.
    Server,
}

impl Identity {
    /// Token endpoint path for this identity.
    pub fn token_path(&self) -> &'static str {
        match self {
            Identity::Anonymous => "/identity/anonymous-token",
            Identity::Server => "/identity/server-token",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => f.write_str("anonymous"),
            Identity::Server => f.write_str("server"),
        }
    }
}

impl FromStr for Identity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anonymous" | "anon" => Ok(Identity::Anonymous),
            "server" => Ok(Identity::Server),
            other => Err(format!("unknown identity: {}", other)),
        }
    }
}

/// Configuration for [`crate::ContentApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentApiConfig {
    /// Base URL without trailing slash, e.g. `https://staging-api.example.com`.
    pub base_url: String,
    /// Key sent as `x-api-key` when requesting server tokens.
    pub api_key: Option<String>,
    /// Identity used for content reads.
    pub read_identity: Identity,
    /// Cache tokens per (site, identity) for the lifetime of the client.
    pub cache_tokens: bool,
}

impl ContentApiConfig {
    /// Create a config for an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            read_identity: Identity::Anonymous,
            cache_tokens: false,
        }
    }

    /// Create a config whose host is selected by the deployment stage.
    pub fn for_stage(stage: &str, domain: &str) -> Self {
        Self::new(Self::base_url_for_stage(stage, domain))
    }

    /// `https://<domain>` for production, `https://<stage>-<domain>` otherwise.
    pub fn base_url_for_stage(stage: &str, domain: &str) -> String {
        let stage = stage.trim().to_lowercase();
        if stage.is_empty() || stage == PRODUCTION_STAGE {
            format!("https://{}", domain)
        } else {
            format!("https://{}-{}", stage, domain)
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_read_identity(mut self, identity: Identity) -> Self {
        self.read_identity = identity;
        self
    }

    pub fn with_token_cache(mut self, enabled: bool) -> Self {
        self.cache_tokens = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_for_stage() {
        assert_eq!(
            ContentApiConfig::base_url_for_stage("prod", "api.example.com"),
            "https://api.example.com"
        );
        assert_eq!(
            ContentApiConfig::base_url_for_stage("Staging", "api.example.com"),
            "https://staging-api.example.com"
        );
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        assert_eq!(
            ContentApiConfig::new("http://localhost:8080/").base_url,
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_identity_parsing() {
        assert_eq!("SERVER".parse::<Identity>(), Ok(Identity::Server));
        assert_eq!("anonymous".parse::<Identity>(), Ok(Identity::Anonymous));
        assert!("root".parse::<Identity>().is_err());
    }
}
