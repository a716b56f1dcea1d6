//! Transaction results handed back to callers, the persisted transaction
//! meta, and the storage interface it travels through.

mod meta;
mod store;

pub use meta::{
    TransactionMeta, clear, create, get, has_interaction_handle, is_valid, save, saved,
};
pub use store::{MemoryStore, TransactionStore};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::proto::client::Tokens;
use crate::proto::response::{FactorData, Message};

/// Terminal and non-terminal outcomes of one engine invocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failure,
    Terminal,
    Canceled,
}

/// Server-side features advertised by the first response of a transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Registration,
    PasswordRecovery,
    AccountUnlock,
}

/// Normalized result of one call into the engine. Exactly one of
/// `next_step`, `tokens`, `error`, or `messages` is the primary payload,
/// depending on `status`.
#[derive(Debug, Default)]
pub struct Transaction {
    pub status: TransactionStatus,
    pub next_step: Option<NextStep>,
    pub tokens: Option<Tokens>,
    pub error: Option<Error>,
    pub messages: Vec<Message>,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Transaction {
    #[must_use]
    pub fn pending(next_step: Option<NextStep>, messages: Vec<Message>) -> Self {
        Self {
            status: TransactionStatus::Pending,
            next_step,
            messages,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn success(tokens: Tokens) -> Self {
        Self {
            status: TransactionStatus::Success,
            tokens: Some(tokens),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(error: Error) -> Self {
        Self {
            status: TransactionStatus::Failure,
            error: Some(error),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn terminal(messages: Vec<Message>) -> Self {
        Self {
            status: TransactionStatus::Terminal,
            messages,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn canceled() -> Self {
        Self {
            status: TransactionStatus::Canceled,
            ..Self::default()
        }
    }
}

/// Caller-facing description of the step the flow is waiting on. Recomputed
/// from the current remediation descriptor on every call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextStep {
    pub name: String,
    pub inputs: Vec<Input>,
    pub options: Vec<ChoiceOption>,
    pub can_skip: bool,
    /// Factor type of the related authenticator (`email`, `phone`, ...).
    #[serde(rename = "type")]
    pub step_type: Option<String>,
    pub authenticator: Option<FactorData>,
    pub authenticator_enrollments: Vec<FactorData>,
    pub poll: Option<PollInfo>,
}

/// A field the caller must supply for the step, merging server metadata with
/// the factor's fixed field name and type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: Option<String>,
    pub required: bool,
    pub secret: bool,
    pub visible: bool,
}

impl Input {
    #[must_use]
    pub fn new(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            label: None,
            required: true,
            secret: false,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A selectable option surfaced to the caller, e.g. one enrollable factor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: Option<String>,
    pub value: String,
}

/// Polling guidance for steps that wait on an out-of-band action.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PollInfo {
    pub required: bool,
    pub refresh: Option<u64>,
}
