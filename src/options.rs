//! Engine configuration and per-call overrides. Per-call options win over
//! the client-wide defaults when a transaction is created or validated.

use crate::flow::Flow;

/// Client-wide configuration shared by every transaction.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    issuer: String,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    response_type: String,
    response_mode: Option<String>,
    ignore_signature: bool,
}

impl ClientOptions {
    #[must_use]
    pub fn new(issuer: &str, client_id: &str, redirect_uri: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes: vec!["openid".to_string()],
            response_type: "code".to_string(),
            response_mode: None,
            ignore_signature: false,
        }
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_response_mode(mut self, response_mode: &str) -> Self {
        self.response_mode = Some(response_mode.to_string());
        self
    }

    #[must_use]
    pub fn with_ignore_signature(mut self, ignore_signature: bool) -> Self {
        self.ignore_signature = ignore_signature;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn response_type(&self) -> &str {
        &self.response_type
    }

    #[must_use]
    pub fn response_mode(&self) -> Option<&str> {
        self.response_mode.as_deref()
    }

    #[must_use]
    pub fn ignore_signature(&self) -> bool {
        self.ignore_signature
    }
}

/// Per-call overrides. Every field is optional; a set field must match the
/// persisted transaction meta exactly for the saved transaction to remain
/// valid.
#[derive(Clone, Debug, Default)]
pub struct TransactionOptions {
    pub flow: Option<Flow>,
    pub issuer: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub code_verifier: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub activation_token: Option<String>,
    pub recovery_token: Option<String>,
    pub with_credentials: Option<bool>,
}

impl TransactionOptions {
    #[must_use]
    pub fn for_flow(flow: Flow) -> Self {
        Self {
            flow: Some(flow),
            ..Self::default()
        }
    }
}
