//! # Varco (authentication flow client engine)
//!
//! `varco` drives server-driven, multi-step authentication flows from the
//! client side. Each server response carries a set of named remediations
//! with their input schemas; the engine selects one, shapes the caller's
//! values into the credentials that step expects, submits it, and repeats
//! until the flow reaches tokens, a terminal message, or a step that needs
//! more input.
//!
//! ## Flows
//!
//! Authentication, registration, password recovery, and account unlock each
//! carry their own ordered step set and a monitor that vets step ordering
//! and detects remediation loops. An unconfigured or resumed flow applies no
//! flow-shaping rules at all.
//!
//! ## Transaction context
//!
//! OAuth/PKCE material, the chosen flow, and the step history persist across
//! requests and redirects through an injected [`TransactionStore`]. Saved
//! context is validated against the caller's configuration on every call and
//! recreated when it no longer matches.
//!
//! ## Collaborators
//!
//! The network never appears in this crate: transports implement
//! [`ProtocolClient`] and [`TokenExchanger`], storage implements
//! [`TransactionStore`], and the engine composes them.

pub mod authenticator;
pub mod engine;
pub mod error;
pub mod flow;
pub mod oauth;
pub mod options;
pub mod proto;
mod remediate;
pub mod remediator;
pub mod transaction;
pub mod values;

pub use engine::{FlowEngine, StartedTransaction};
pub use error::Error;
pub use flow::{Flow, FlowMonitor, FlowSpecification};
pub use options::{ClientOptions, TransactionOptions};
pub use proto::client::{InteractResult, ProtocolClient, TokenExchanger, TokenParams, Tokens};
pub use proto::response::RemediationResponse;
pub use transaction::{
    Feature, MemoryStore, NextStep, Transaction, TransactionMeta, TransactionStatus,
    TransactionStore,
};
pub use values::Values;
