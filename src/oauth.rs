//! OAuth parameter preparation for the multi-request transaction context:
//! state/nonce generation, PKCE verifier and challenge, and the authorize and
//! token endpoint URLs derived from the issuer.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::Error;

pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// Endpoint URLs computed once per transaction from the issuer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OauthUrls {
    pub authorize_url: String,
    pub token_url: String,
}

/// Freshly generated OAuth parameters for a new transaction.
#[derive(Clone, Debug)]
pub struct TokenParamsPrep {
    pub state: String,
    pub nonce: String,
    pub code_verifier: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

/// Generate state, nonce, and PKCE material for a new transaction.
///
/// # Errors
/// Returns an error if the system randomness source fails.
pub fn prepare_token_params() -> Result<TokenParamsPrep, Error> {
    let state = random_url_safe()?;
    let nonce = random_url_safe()?;
    let code_verifier = random_url_safe()?;
    let code_challenge = code_challenge(&code_verifier);

    Ok(TokenParamsPrep {
        state,
        nonce,
        code_verifier,
        code_challenge,
        code_challenge_method: CODE_CHALLENGE_METHOD.to_string(),
    })
}

/// S256 code challenge for a PKCE verifier.
#[must_use]
pub fn code_challenge(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Compute the authorize/token endpoints under the issuer.
///
/// # Errors
/// Returns an error if the issuer cannot be parsed, has no host, or uses an
/// unsupported scheme.
pub fn oauth_urls(issuer: &str) -> Result<OauthUrls, Error> {
    let base = endpoint_base(issuer)?;

    Ok(OauthUrls {
        authorize_url: format!("{base}/v1/authorize"),
        token_url: format!("{base}/v1/token"),
    })
}

fn endpoint_base(issuer: &str) -> Result<String, Error> {
    let url = Url::parse(issuer)?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::IssuerScheme(scheme.to_string()));
    }

    if url.host().is_none() {
        return Err(Error::IssuerUrl(url::ParseError::EmptyHost));
    }

    Ok(issuer.trim_end_matches('/').to_string())
}

/// 32 bytes of OS randomness, base64url without padding. The same shape is
/// used for state, nonce, and the PKCE verifier.
fn random_url_safe() -> Result<String, Error> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes).map_err(|_| Error::Entropy)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
