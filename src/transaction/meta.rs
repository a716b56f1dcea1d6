//! The persisted transaction context and its manager: create, load,
//! validate, and clear the OAuth/PKCE material that spans the requests and
//! redirects of one logical transaction.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::flow::Flow;
use crate::oauth::{self, OauthUrls};
use crate::options::{ClientOptions, TransactionOptions};
use crate::transaction::TransactionStore;

/// Everything one transaction needs to survive a page reload or redirect:
/// OAuth parameters, PKCE material, the chosen flow, and the interaction
/// handle obtained from the first network round-trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub flow: Flow,
    pub issuer: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub response_mode: Option<String>,
    pub scopes: Vec<String>,
    pub state: String,
    pub nonce: String,
    pub urls: OauthUrls,
    pub ignore_signature: bool,
    pub code_verifier: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
    pub activation_token: Option<String>,
    pub recovery_token: Option<String>,
    pub with_credentials: bool,
    pub interaction_handle: Option<String>,
    /// Step history tracked by the flow monitor; append-only for the life of
    /// the transaction.
    pub remediations: Vec<String>,
}

/// Create a fresh transaction meta: generated OAuth parameters merged with
/// caller overrides (caller wins), plus the computed endpoint URLs.
///
/// # Errors
/// Returns an error if randomness is unavailable or the issuer URL is
/// invalid.
pub fn create(
    options: &ClientOptions,
    overrides: &TransactionOptions,
    flow: Flow,
) -> Result<TransactionMeta, Error> {
    let prep = oauth::prepare_token_params()?;

    let issuer = overrides
        .issuer
        .clone()
        .unwrap_or_else(|| options.issuer().to_string());
    let urls = oauth::oauth_urls(&issuer)?;

    let code_verifier = overrides
        .code_verifier
        .clone()
        .unwrap_or(prep.code_verifier);
    let code_challenge = overrides
        .code_challenge
        .clone()
        .unwrap_or_else(|| oauth::code_challenge(&code_verifier));

    Ok(TransactionMeta {
        flow,
        issuer,
        client_id: overrides
            .client_id
            .clone()
            .unwrap_or_else(|| options.client_id().to_string()),
        redirect_uri: overrides
            .redirect_uri
            .clone()
            .unwrap_or_else(|| options.redirect_uri().to_string()),
        response_type: options.response_type().to_string(),
        response_mode: options.response_mode().map(ToString::to_string),
        scopes: overrides
            .scopes
            .clone()
            .unwrap_or_else(|| options.scopes().to_vec()),
        state: overrides.state.clone().unwrap_or(prep.state),
        nonce: overrides.nonce.clone().unwrap_or(prep.nonce),
        urls,
        ignore_signature: options.ignore_signature(),
        code_verifier,
        code_challenge,
        code_challenge_method: overrides
            .code_challenge_method
            .clone()
            .unwrap_or(prep.code_challenge_method),
        activation_token: overrides.activation_token.clone(),
        recovery_token: overrides.recovery_token.clone(),
        with_credentials: overrides.with_credentials.unwrap_or(true),
        interaction_handle: None,
        remediations: Vec::new(),
    })
}

/// Whether persisted meta is still usable for the caller's configuration.
/// Every key the caller supplies must match exactly, and a configured
/// non-sentinel flow must equal the persisted flow.
#[must_use]
pub fn is_valid(
    meta: &TransactionMeta,
    options: &ClientOptions,
    overrides: &TransactionOptions,
) -> bool {
    let checks: [(&Option<String>, &str); 3] = [
        (&overrides.state, &meta.state),
        (&overrides.code_challenge, &meta.code_challenge),
        (&overrides.code_challenge_method, &meta.code_challenge_method),
    ];
    for (supplied, persisted) in checks {
        if supplied.as_deref().is_some_and(|v| v != persisted) {
            return false;
        }
    }

    let optional_checks: [(&Option<String>, &Option<String>); 2] = [
        (&overrides.activation_token, &meta.activation_token),
        (&overrides.recovery_token, &meta.recovery_token),
    ];
    for (supplied, persisted) in optional_checks {
        if supplied.is_some() && supplied != persisted {
            return false;
        }
    }

    // client-wide keys are always configured, overrides win
    let issuer = overrides.issuer.as_deref().unwrap_or(options.issuer());
    let client_id = overrides
        .client_id
        .as_deref()
        .unwrap_or(options.client_id());
    let redirect_uri = overrides
        .redirect_uri
        .as_deref()
        .unwrap_or(options.redirect_uri());
    if issuer != meta.issuer || client_id != meta.client_id || redirect_uri != meta.redirect_uri {
        return false;
    }

    is_valid_for_flow(meta, overrides.flow)
}

/// Specific flows never share transaction data; sentinel flows resume
/// whatever is persisted.
#[must_use]
pub fn is_valid_for_flow(meta: &TransactionMeta, flow: Option<Flow>) -> bool {
    match flow {
        Some(flow) if !flow.is_sentinel() => flow == meta.flow,
        _ => true,
    }
}

/// The persisted meta, only if it exists and is still valid.
///
/// # Errors
/// Returns an error if the storage medium fails.
pub fn saved<S: TransactionStore>(
    store: &S,
    options: &ClientOptions,
    overrides: &TransactionOptions,
) -> Result<Option<TransactionMeta>, Error> {
    Ok(store
        .load()?
        .filter(|meta| is_valid(meta, options, overrides)))
}

/// Saved-and-valid meta, or a fresh one. Persisted-but-invalid meta is
/// surfaced as a warning only; it usually means a configuration change or
/// two applications sharing one storage key.
///
/// # Errors
/// Returns an error if storage, randomness, or URL computation fails.
pub fn get<S: TransactionStore>(
    store: &S,
    options: &ClientOptions,
    overrides: &TransactionOptions,
    flow: Flow,
) -> Result<TransactionMeta, Error> {
    if store.exists() {
        if let Some(meta) = saved(store, options, overrides)? {
            return Ok(meta);
        }
        warn!(
            "saved transaction meta does not match the current configuration; \
             two apps may be sharing a storage key"
        );
    }
    create(options, overrides, flow)
}

/// Whether a saved, valid transaction already holds an interaction handle.
#[must_use]
pub fn has_interaction_handle<S: TransactionStore>(
    store: &S,
    options: &ClientOptions,
    overrides: &TransactionOptions,
) -> bool {
    saved(store, options, overrides)
        .ok()
        .flatten()
        .is_some_and(|meta| meta.interaction_handle.is_some())
}

/// # Errors
/// Returns an error if the storage medium fails.
pub fn save<S: TransactionStore>(store: &S, meta: &TransactionMeta) -> Result<(), Error> {
    store.save(meta)
}

/// # Errors
/// Returns an error if the storage medium fails.
pub fn clear<S: TransactionStore>(store: &S) -> Result<(), Error> {
    store.clear()
}
