//! Top-level flows and the mapping from a flow to the remediation steps,
//! ordering rules, and options that apply to it.

mod monitor;

pub use monitor::{FlowMonitor, Rule};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::remediator::step;

/// A named top-level user journey. `Default` and `Proceed` are resume
/// sentinels: they carry no flow-shaping rules and accept any persisted
/// transaction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    #[default]
    Default,
    Proceed,
    #[serde(alias = "login", alias = "signin")]
    Authenticate,
    #[serde(alias = "signup", alias = "enroll_profile")]
    Register,
    #[serde(alias = "reset_password")]
    RecoverPassword,
    UnlockAccount,
}

impl Flow {
    /// Parse a flow identifier, grouping synonyms. Unrecognized identifiers
    /// fall back to `Default` so new server-side flow names keep working.
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        match identifier {
            "authenticate" | "login" | "signin" => Self::Authenticate,
            "register" | "signup" | "enroll_profile" => Self::Register,
            "recover_password" | "reset_password" => Self::RecoverPassword,
            "unlock_account" => Self::UnlockAccount,
            "proceed" => Self::Proceed,
            "default" => Self::Default,
            other => {
                debug!(flow = other, "unrecognized flow identifier, using default");
                Self::Default
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Proceed => "proceed",
            Self::Authenticate => "authenticate",
            Self::Register => "register",
            Self::RecoverPassword => "recover_password",
            Self::UnlockAccount => "unlock_account",
        }
    }

    /// Sentinel flows resume whatever transaction is persisted and are
    /// exempt from flow-equality validation.
    #[must_use]
    pub fn is_sentinel(self) -> bool {
        matches!(self, Self::Default | Self::Proceed)
    }
}

const AUTHENTICATION_STEPS: &[&str] = &[
    step::IDENTIFY,
    step::SELECT_AUTHENTICATOR_AUTHENTICATE,
    step::CHALLENGE_AUTHENTICATOR,
    step::AUTHENTICATOR_VERIFICATION_DATA,
    step::SELECT_AUTHENTICATOR_ENROLL,
    step::ENROLL_AUTHENTICATOR,
    step::ENROLL_POLL,
    step::SKIP,
];

const REGISTRATION_STEPS: &[&str] = &[
    step::SELECT_ENROLL_PROFILE,
    step::ENROLL_PROFILE,
    step::SELECT_AUTHENTICATOR_ENROLL,
    step::ENROLL_AUTHENTICATOR,
    step::AUTHENTICATOR_VERIFICATION_DATA,
    step::ENROLL_POLL,
    step::SKIP,
];

const PASSWORD_RECOVERY_STEPS: &[&str] = &[
    step::IDENTIFY,
    step::SELECT_AUTHENTICATOR_AUTHENTICATE,
    step::CHALLENGE_AUTHENTICATOR,
    step::AUTHENTICATOR_VERIFICATION_DATA,
    step::RESET_AUTHENTICATOR,
];

const ACCOUNT_UNLOCK_STEPS: &[&str] = &[
    step::IDENTIFY,
    step::UNLOCK_ACCOUNT,
    step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT,
    step::SELECT_AUTHENTICATOR_AUTHENTICATE,
    step::CHALLENGE_AUTHENTICATOR,
    step::AUTHENTICATOR_VERIFICATION_DATA,
];

const PASSWORD_RECOVERY_ACTIONS: &[&str] = &[
    step::CURRENT_AUTHENTICATOR_RECOVER,
    step::CURRENT_AUTHENTICATOR_ENROLLMENT_RECOVER,
];

/// Everything the pipeline needs to drive one flow: the ordered remediation
/// steps, an optional action allow-list, credential semantics for the first
/// network call, and the ordering rules for the flow monitor.
#[derive(Clone, Copy, Debug)]
pub struct FlowSpecification {
    pub flow: Flow,
    pub remediators: &'static [&'static str],
    pub actions: Option<&'static [&'static str]>,
    pub with_credentials: bool,
}

impl FlowSpecification {
    /// Resolve the specification for a flow. Sentinel flows get the
    /// authentication step set with no monitor rules, so a resumed
    /// transaction is never shaped by another flow's rules.
    #[must_use]
    pub fn for_flow(flow: Flow) -> Self {
        match flow {
            Flow::Register => Self {
                flow,
                remediators: REGISTRATION_STEPS,
                actions: None,
                with_credentials: false,
            },
            Flow::RecoverPassword => Self {
                flow,
                remediators: PASSWORD_RECOVERY_STEPS,
                actions: Some(PASSWORD_RECOVERY_ACTIONS),
                with_credentials: false,
            },
            Flow::UnlockAccount => Self {
                flow,
                remediators: ACCOUNT_UNLOCK_STEPS,
                actions: None,
                with_credentials: true,
            },
            Flow::Authenticate => Self {
                flow,
                remediators: AUTHENTICATION_STEPS,
                actions: None,
                with_credentials: true,
            },
            Flow::Default | Flow::Proceed => Self {
                flow,
                remediators: AUTHENTICATION_STEPS,
                actions: None,
                with_credentials: true,
            },
        }
    }

    /// Build the flow monitor, hydrated with the step history persisted on
    /// the transaction meta.
    #[must_use]
    pub fn monitor(&self, history: Vec<String>) -> FlowMonitor {
        FlowMonitor::for_flow(self.flow).with_history(history)
    }

    /// True when the action allow-list names this step.
    #[must_use]
    pub fn is_action(&self, name: &str) -> bool {
        self.actions.is_some_and(|actions| actions.contains(&name))
    }
}
