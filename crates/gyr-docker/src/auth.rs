//! Anonymous bearer-token authentication for registry requests.
//!
//! A registry that wants auth answers the first manifest request with 401
//! and a `WWW-Authenticate` header naming the token service (`realm`), the
//! registry `service`, and the `scope` being requested. Fetching the realm
//! with those parameters and no credentials yields a short-lived pull
//! token, which is all a digest lookup on a public image needs.

use serde::Deserialize;

/// A parsed `WWW-Authenticate` bearer challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub service: Option<String>,
    pub scope: Option<String>,
}

impl BearerChallenge {
    /// Parse a `WWW-Authenticate` header value.
    ///
    /// Returns `None` when the scheme is not `Bearer` or no realm is
    /// given. Parameters other than `realm`, `service`, and `scope` are
    /// ignored.
    pub fn parse(header: &str) -> Option<Self> {
        let params = header.strip_prefix("Bearer ")?;

        let mut realm = None;
        let mut service = None;
        let mut scope = None;
        for param in params.split(',') {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                "realm" => realm = Some(value),
                "service" => service = Some(value),
                "scope" => scope = Some(value),
                _ => {}
            }
        }

        Some(Self {
            realm: realm?,
            service,
            scope,
        })
    }
}

/// Token service response. Registries answer with `token`,
/// `access_token`, or both.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    token: String,
    #[serde(default)]
    access_token: String,
}

impl TokenResponse {
    /// The usable token, preferring `token` over `access_token`.
    pub(crate) fn into_token(self) -> Option<String> {
        if !self.token.is_empty() {
            Some(self.token)
        } else if !self.access_token.is_empty() {
            Some(self.access_token)
        } else {
            None
        }
    }
}
