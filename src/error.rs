use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to gather randomness")]
    Entropy,
    #[error("invalid issuer url: {0}")]
    IssuerUrl(#[from] url::ParseError),
    #[error("unsupported issuer scheme: {0}")]
    IssuerScheme(String),
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("transaction storage: {0}")]
    Storage(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("token exchange: {0}")]
    TokenExchange(String),
    #[error("self service account unlock is not enabled for this organization")]
    UnlockNotSupported,
    #[error("current flow is not finished, check policy settings for your organization")]
    FlowUnfinished,
}
