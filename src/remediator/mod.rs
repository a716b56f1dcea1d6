//! Remediation-step handlers. Each variant decides whether it can proceed
//! with the values at hand, builds the submission payload for its step, and
//! derives the caller-facing description of what is needed next. A handler
//! is constructed from one remediation descriptor and never mutates it.

mod action;
mod enroll_poll;
mod enroll_profile;
mod identify;
mod select_authenticator;
mod skip;
mod unlock_account;
mod verification_data;
mod verify_authenticator;

pub use action::Action;
pub use enroll_poll::EnrollPoll;
pub use enroll_profile::EnrollProfile;
pub use identify::Identify;
pub use select_authenticator::SelectAuthenticator;
pub use skip::Skip;
pub use unlock_account::UnlockAccount;
pub use verification_data::VerificationData;
pub use verify_authenticator::VerifyAuthenticator;

use serde_json::Value;

use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::{ChoiceOption, Input, NextStep};
use crate::values::Values;

/// Remediation step names used by the protocol.
pub mod step {
    pub const IDENTIFY: &str = "identify";
    pub const UNLOCK_ACCOUNT: &str = "unlock-account";
    pub const SELECT_AUTHENTICATOR_AUTHENTICATE: &str = "select-authenticator-authenticate";
    pub const SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT: &str = "select-authenticator-unlock-account";
    pub const SELECT_AUTHENTICATOR_ENROLL: &str = "select-authenticator-enroll";
    pub const CHALLENGE_AUTHENTICATOR: &str = "challenge-authenticator";
    pub const ENROLL_AUTHENTICATOR: &str = "enroll-authenticator";
    pub const RESET_AUTHENTICATOR: &str = "reset-authenticator";
    pub const AUTHENTICATOR_VERIFICATION_DATA: &str = "authenticator-verification-data";
    pub const ENROLL_PROFILE: &str = "enroll-profile";
    pub const SELECT_ENROLL_PROFILE: &str = "select-enroll-profile";
    pub const ENROLL_POLL: &str = "enroll-poll";
    pub const SKIP: &str = "skip";
    pub const SELECT_ENROLLMENT_CHANNEL: &str = "select-enrollment-channel";
    pub const CURRENT_AUTHENTICATOR_RECOVER: &str = "currentAuthenticator-recover";
    pub const CURRENT_AUTHENTICATOR_ENROLLMENT_RECOVER: &str =
        "currentAuthenticatorEnrollment-recover";
}

/// Closed set of step handlers, resolved by step name.
#[derive(Clone, Debug)]
pub enum Remediator {
    Identify(Identify),
    UnlockAccount(UnlockAccount),
    SelectAuthenticator(SelectAuthenticator),
    VerifyAuthenticator(VerifyAuthenticator),
    VerificationData(VerificationData),
    EnrollProfile(EnrollProfile),
    EnrollPoll(EnrollPoll),
    Skip(Skip),
    Action(Action),
}

impl Remediator {
    /// Resolve the handler for a remediation descriptor. Unknown step names
    /// have no handler and are never auto-remediated.
    #[must_use]
    pub fn for_remediation(remediation: &Remediation) -> Option<Self> {
        let remediation = remediation.clone();
        let name = remediation.name.clone();
        match name.as_str() {
            step::IDENTIFY => Some(Self::Identify(Identify::new(remediation))),
            step::UNLOCK_ACCOUNT => Some(Self::UnlockAccount(UnlockAccount::new(remediation))),
            step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT => Some(Self::SelectAuthenticator(
                SelectAuthenticator::with_identifier(remediation),
            )),
            step::SELECT_AUTHENTICATOR_AUTHENTICATE | step::SELECT_AUTHENTICATOR_ENROLL => Some(
                Self::SelectAuthenticator(SelectAuthenticator::new(remediation)),
            ),
            step::CHALLENGE_AUTHENTICATOR
            | step::ENROLL_AUTHENTICATOR
            | step::RESET_AUTHENTICATOR => Some(Self::VerifyAuthenticator(
                VerifyAuthenticator::new(remediation),
            )),
            step::AUTHENTICATOR_VERIFICATION_DATA => {
                Some(Self::VerificationData(VerificationData::new(remediation)))
            }
            step::ENROLL_PROFILE => Some(Self::EnrollProfile(EnrollProfile::new(remediation))),
            // the registration entry selector takes no input
            step::SELECT_ENROLL_PROFILE => Some(Self::Action(Action::new(remediation))),
            step::ENROLL_POLL => Some(Self::EnrollPoll(EnrollPoll::new(remediation))),
            step::SKIP => Some(Self::Skip(Skip::new(remediation))),
            _ => None,
        }
    }

    /// Handler for an allow-listed action step: proceeds with an empty
    /// payload and the base step description.
    #[must_use]
    pub fn for_action(remediation: &Remediation) -> Self {
        Self::Action(Action::new(remediation.clone()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Identify(r) => r.name(),
            Self::UnlockAccount(r) => r.name(),
            Self::SelectAuthenticator(r) => r.name(),
            Self::VerifyAuthenticator(r) => r.name(),
            Self::VerificationData(r) => r.name(),
            Self::EnrollProfile(r) => r.name(),
            Self::EnrollPoll(r) => r.name(),
            Self::Skip(r) => r.name(),
            Self::Action(r) => r.name(),
        }
    }

    /// Whether the values bag satisfies this step.
    #[must_use]
    pub fn can_remediate(&self, values: &Values) -> bool {
        match self {
            Self::Identify(r) => r.can_remediate(values),
            Self::UnlockAccount(_) | Self::Action(_) => true,
            Self::SelectAuthenticator(r) => r.can_remediate(values),
            Self::VerifyAuthenticator(r) => r.can_remediate(values),
            Self::VerificationData(r) => r.can_remediate(values),
            Self::EnrollProfile(r) => r.can_remediate(values),
            Self::EnrollPoll(r) => r.can_remediate(values),
            Self::Skip(r) => r.can_remediate(values),
        }
    }

    /// The exact submission payload for this step. Callers check
    /// [`Self::can_remediate`] first; missing values degrade to an empty
    /// payload rather than a panic.
    #[must_use]
    pub fn payload(&self, values: &Values) -> Value {
        match self {
            Self::Identify(r) => r.payload(values),
            Self::UnlockAccount(r) => r.payload(),
            Self::SelectAuthenticator(r) => r.payload(values),
            Self::VerifyAuthenticator(r) => r.payload(values),
            Self::VerificationData(r) => r.payload(values),
            Self::EnrollProfile(r) => r.payload(values),
            Self::EnrollPoll(r) => r.payload(),
            Self::Skip(r) => r.payload(),
            Self::Action(r) => r.payload(),
        }
    }

    /// Caller-facing description of this step, enriched with response
    /// context where the step calls for it.
    #[must_use]
    pub fn next_step(&self, response: &RemediationResponse) -> NextStep {
        match self {
            Self::Identify(r) => r.next_step(response),
            Self::UnlockAccount(r) => r.next_step(response),
            Self::SelectAuthenticator(r) => r.next_step(response),
            Self::VerifyAuthenticator(r) => r.next_step(response),
            Self::VerificationData(r) => r.next_step(response),
            Self::EnrollProfile(r) => r.next_step(response),
            Self::EnrollPoll(r) => r.next_step(response),
            Self::Skip(r) => r.next_step(response),
            Self::Action(r) => r.next_step(response),
        }
    }

    /// The values bag with this step's consumed keys removed, applied after
    /// a successful submission so later steps cannot resubmit them.
    #[must_use]
    pub fn values_after_proceed(&self, values: &Values) -> Values {
        match self {
            Self::Identify(r) => r.values_after_proceed(values),
            Self::UnlockAccount(_) | Self::Action(_) => values.clone(),
            Self::SelectAuthenticator(r) => r.values_after_proceed(values),
            Self::VerifyAuthenticator(r) => r.values_after_proceed(values),
            Self::VerificationData(r) => r.values_after_proceed(values),
            Self::EnrollProfile(r) => r.values_after_proceed(values),
            Self::EnrollPoll(r) => r.values_after_proceed(values),
            Self::Skip(r) => r.values_after_proceed(values),
        }
    }

    /// Sibling remediation names representing alternative actions while this
    /// step is pending. Only polling steps have peers.
    #[must_use]
    pub fn peer_remediations(&self, remediations: &[Remediation]) -> Vec<String> {
        match self {
            Self::EnrollPoll(r) => r.peer_remediations(remediations),
            _ => Vec::new(),
        }
    }
}

/// Step description derived from the remediation descriptor alone. Variants
/// start from this and enrich it.
pub(crate) fn base_next_step(
    remediation: &Remediation,
    response: &RemediationResponse,
) -> NextStep {
    NextStep {
        name: remediation.name.clone(),
        inputs: inputs_from(remediation),
        options: options_from(remediation),
        can_skip: response.contains(step::SKIP),
        step_type: remediation
            .relates_to
            .as_ref()
            .and_then(|f| f.factor_type.clone()),
        authenticator: remediation.relates_to.clone(),
        authenticator_enrollments: Vec::new(),
        poll: None,
    }
}

/// Flatten the remediation form into caller inputs. Credential fields are
/// skipped here; verification steps derive them from their authenticator.
fn inputs_from(remediation: &Remediation) -> Vec<Input> {
    let mut inputs = Vec::new();
    for field in &remediation.value {
        if field.name == "credentials" {
            continue;
        }
        if !field.options.is_empty() {
            inputs.push(Input::new(&field.name, "string"));
            continue;
        }
        if let Some(form) = &field.form {
            for child in &form.value {
                let mut input = Input::new(
                    &child.name,
                    child.field_type.as_deref().unwrap_or("string"),
                );
                input.label = child.label.clone();
                input.required = child.required.unwrap_or(false);
                input.secret = child.secret.unwrap_or(false);
                inputs.push(input);
            }
            continue;
        }
        let mut input = Input::new(
            &field.name,
            field.field_type.as_deref().unwrap_or("string"),
        );
        input.label = field.label.clone();
        input.required = field.required.unwrap_or(false);
        input.secret = field.secret.unwrap_or(false);
        input.visible = field.visible.unwrap_or(true);
        inputs.push(input);
    }
    inputs
}

/// Selectable options across the remediation's fields. Compound options
/// surface their stable factor key as the option value.
fn options_from(remediation: &Remediation) -> Vec<ChoiceOption> {
    let mut options = Vec::new();
    for field in &remediation.value {
        for option in &field.options {
            let value = option
                .value
                .as_text()
                .or_else(|| option.value.field("key"))
                .or_else(|| option.value.field("id"));
            if let Some(value) = value {
                options.push(ChoiceOption {
                    label: option.label.clone(),
                    value: value.to_string(),
                });
            }
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::{Remediator, base_next_step, step};
    use crate::proto::response::{
        FieldOption, Form, FormField, OptionValue, Remediation, RemediationResponse,
    };

    fn authenticator_options() -> FormField {
        FormField {
            name: "authenticator".to_string(),
            options: vec![
                FieldOption {
                    label: Some("Phone".to_string()),
                    value: OptionValue::Fields {
                        form: Form {
                            value: vec![
                                FormField {
                                    name: "id".to_string(),
                                    value: Some(serde_json::json!("id-phone")),
                                    ..FormField::default()
                                },
                                FormField {
                                    name: "key".to_string(),
                                    value: Some(serde_json::json!("phone")),
                                    ..FormField::default()
                                },
                            ],
                        },
                    },
                },
                FieldOption {
                    label: Some("Email".to_string()),
                    value: OptionValue::Fields {
                        form: Form {
                            value: vec![
                                FormField {
                                    name: "id".to_string(),
                                    value: Some(serde_json::json!("id-email")),
                                    ..FormField::default()
                                },
                                FormField {
                                    name: "key".to_string(),
                                    value: Some(serde_json::json!("email")),
                                    ..FormField::default()
                                },
                            ],
                        },
                    },
                },
            ],
            ..FormField::default()
        }
    }

    #[test]
    fn unknown_step_names_have_no_handler() {
        let remediation = Remediation {
            name: "redirect-idp".to_string(),
            ..Remediation::default()
        };
        assert!(Remediator::for_remediation(&remediation).is_none());
    }

    #[test]
    fn base_next_step_surfaces_options_by_factor_key() {
        let remediation = Remediation {
            name: step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT.to_string(),
            value: vec![
                authenticator_options(),
                FormField {
                    name: "identifier".to_string(),
                    label: Some("Username".to_string()),
                    ..FormField::default()
                },
            ],
            ..Remediation::default()
        };
        let next_step = base_next_step(&remediation, &RemediationResponse::default());

        assert_eq!(next_step.name, step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT);
        assert_eq!(next_step.options.len(), 2);
        assert_eq!(next_step.options[0].label.as_deref(), Some("Phone"));
        assert_eq!(next_step.options[0].value, "phone");
        assert_eq!(next_step.options[1].value, "email");
        assert!(next_step
            .inputs
            .iter()
            .any(|input| input.name == "authenticator"));
        assert!(next_step
            .inputs
            .iter()
            .any(|input| input.name == "identifier"));
    }

    #[test]
    fn can_skip_reflects_a_skip_sibling() {
        let remediation = Remediation {
            name: step::ENROLL_AUTHENTICATOR.to_string(),
            ..Remediation::default()
        };
        let response = RemediationResponse {
            needed_to_proceed: vec![
                remediation.clone(),
                Remediation {
                    name: step::SKIP.to_string(),
                    ..Remediation::default()
                },
            ],
            ..RemediationResponse::default()
        };
        assert!(base_next_step(&remediation, &response).can_skip);
    }
}
