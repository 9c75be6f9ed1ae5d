// Bearer credential plumbing.
//
// The server requires `Authorization: Bearer <token>` on every request,
// including each event-stream (re)connection attempt. Token retrieval is
// delegated to a provider so the host can rotate tokens at any time -- the
// client never caches the value, it re-reads it per request.

use secrecy::{ExposeSecret, SecretString};

/// Supplies the current bearer credential.
///
/// Called once per outgoing request and once per event-stream reconnection
/// attempt, so a token refreshed between attempts is picked up without any
/// re-wiring.
pub trait TokenProvider: Send + Sync {
    /// The current token, without the `Bearer ` prefix.
    fn bearer_token(&self) -> SecretString;
}

/// A fixed token, for hosts whose credential never rotates mid-session.
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> SecretString {
        self.0.clone()
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> SecretString + Send + Sync,
{
    fn bearer_token(&self) -> SecretString {
        self()
    }
}

/// Render the `Authorization` header value for the provider's current token.
pub(crate) fn authorization_value(provider: &dyn TokenProvider) -> String {
    format!("Bearer {}", provider.bearer_token().expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_round_trips() {
        let provider = StaticToken::new(SecretString::from("abc123".to_string()));
        assert_eq!(authorization_value(&provider), "Bearer abc123");
    }

    #[test]
    fn closure_provider_is_re_read() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let calls = AtomicU32::new(0);
        let provider = move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            SecretString::from(format!("token-{n}"))
        };

        assert_eq!(authorization_value(&provider), "Bearer token-0");
        assert_eq!(authorization_value(&provider), "Bearer token-1");
    }
}
