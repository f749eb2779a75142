//! binlist.net lookup client.
//!
//! Requires the `http` feature.
//!
//! Issues `GET {base_url}{prefix}` with an `Accept-Version` header. The
//! request timeout is the smaller of the client default and the time left
//! on the `LookupContext` deadline.

use super::{is_valid_prefix, BinlistPayload, IssuerInfo, IssuerLookup, LookupContext};
use crate::error::LookupError;
use std::time::Duration;
use ureq::Agent;

/// Default binlist endpoint.
pub const DEFAULT_LOOKUP_URL: &str = "https://lookup.binlist.net/";

/// Blocking binlist.net client.
#[derive(Debug, Clone)]
pub struct BinlistClient {
    agent: Agent,
    base_url: String,
    accept_version: String,
    timeout: Duration,
}

impl BinlistClient {
    /// Creates a client for `base_url` with the given default timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            agent: Agent::new(),
            base_url,
            accept_version: "3".to_string(),
            timeout,
        }
    }

    /// Sets the `Accept-Version` header value.
    pub fn accept_version(mut self, version: impl Into<String>) -> Self {
        self.accept_version = version.into();
        self
    }

    /// Returns the URL queried for `prefix`.
    pub fn url_for(&self, prefix: &str) -> String {
        format!("{}{}", self.base_url, prefix)
    }

    fn effective_timeout(&self, ctx: &LookupContext) -> Duration {
        match ctx.remaining() {
            Some(left) => left.min(self.timeout),
            None => self.timeout,
        }
    }
}

impl Default for BinlistClient {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL, Duration::from_secs(5))
    }
}

impl IssuerLookup for BinlistClient {
    fn lookup(&self, prefix: &str, ctx: &LookupContext) -> Result<IssuerInfo, LookupError> {
        if !is_valid_prefix(prefix) {
            return Err(LookupError::InvalidPrefix(prefix.to_string()));
        }
        ctx.check()?;

        let response = self
            .agent
            .get(&self.url_for(prefix))
            .set("Accept-Version", &self.accept_version)
            .timeout(self.effective_timeout(ctx))
            .call();

        let response = match response {
            Ok(r) => r,
            Err(ureq::Error::Status(code, _)) => return Err(LookupError::Status(code)),
            Err(ureq::Error::Transport(t)) => {
                // A transport error after the deadline is the timeout firing.
                ctx.check()?;
                return Err(LookupError::Transport(t.to_string()));
            }
        };

        if response.status() != 200 {
            return Err(LookupError::Status(response.status()));
        }

        let payload: BinlistPayload = response
            .into_json()
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        Ok(IssuerInfo::from(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::CancelToken;

    #[test]
    fn test_url_for() {
        let client = BinlistClient::new("http://localhost:9", Duration::from_secs(1));
        assert_eq!(client.url_for("453914"), "http://localhost:9/453914");
    }

    #[test]
    fn test_invalid_prefix_not_sent() {
        let client = BinlistClient::default();
        assert_eq!(
            client.lookup("45", &LookupContext::unbounded()),
            Err(LookupError::InvalidPrefix("45".to_string()))
        );
    }

    #[test]
    fn test_cancelled_before_request() {
        let client = BinlistClient::new("http://localhost:9", Duration::from_secs(1));
        let token = CancelToken::new();
        token.cancel();
        let ctx = LookupContext::with_timeout(Duration::from_secs(1), token);
        assert_eq!(client.lookup("453914", &ctx), Err(LookupError::Cancelled));
    }

    #[test]
    fn test_effective_timeout_uses_deadline() {
        let client = BinlistClient::new("http://localhost:9", Duration::from_secs(5));
        let ctx = LookupContext::with_timeout(Duration::from_millis(100), CancelToken::new());
        assert!(client.effective_timeout(&ctx) <= Duration::from_millis(100));
        assert_eq!(
            client.effective_timeout(&LookupContext::unbounded()),
            Duration::from_secs(5)
        );
    }
}
