//! Collaborator interfaces. The engine owns flow decisions; everything that
//! touches the network lives behind these traits and is injected by the
//! embedding application.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::oauth::OauthUrls;
use crate::proto::response::RemediationResponse;
use crate::transaction::TransactionMeta;

/// Result of beginning a new protocol transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractResult {
    /// Server-issued handle identifying the in-progress transaction.
    pub interaction_handle: String,
    /// Authoritative state echoed by the server, when it differs from the
    /// requested one.
    pub state: Option<String>,
}

/// Tokens produced by a successful code exchange. Opaque to the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Tokens {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

/// Parameters for exchanging an interaction code, all derived from the
/// persisted transaction meta.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenParams {
    pub interaction_code: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub code_verifier: String,
    pub scopes: Vec<String>,
    pub ignore_signature: bool,
}

/// Transport for the remediation protocol: begin a transaction, fetch the
/// current remediation set, and submit one step.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Begin a new transaction using the prepared meta.
    async fn interact(&self, meta: &TransactionMeta) -> Result<InteractResult, Error>;

    /// Fetch the current remediation set for an in-progress transaction.
    async fn introspect(&self, interaction_handle: &str)
        -> Result<RemediationResponse, Error>;

    /// Submit the payload for one named remediation and return the next
    /// response.
    async fn proceed(
        &self,
        response: &RemediationResponse,
        name: &str,
        payload: Value,
    ) -> Result<RemediationResponse, Error>;
}

/// Exchanges an interaction code for tokens.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange_code(
        &self,
        params: &TokenParams,
        urls: &OauthUrls,
    ) -> Result<Tokens, Error>;
}

#[async_trait]
impl<T: ProtocolClient + ?Sized> ProtocolClient for std::sync::Arc<T> {
    async fn interact(&self, meta: &TransactionMeta) -> Result<InteractResult, Error> {
        (**self).interact(meta).await
    }

    async fn introspect(&self, interaction_handle: &str)
        -> Result<RemediationResponse, Error> {
        (**self).introspect(interaction_handle).await
    }

    async fn proceed(
        &self,
        response: &RemediationResponse,
        name: &str,
        payload: Value,
    ) -> Result<RemediationResponse, Error> {
        (**self).proceed(response, name, payload).await
    }
}

#[async_trait]
impl<T: TokenExchanger + ?Sized> TokenExchanger for std::sync::Arc<T> {
    async fn exchange_code(
        &self,
        params: &TokenParams,
        urls: &OauthUrls,
    ) -> Result<Tokens, Error> {
        (**self).exchange_code(params, urls).await
    }
}
