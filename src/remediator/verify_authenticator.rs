use serde_json::{Value, json};

use crate::authenticator::Authenticator;
use crate::remediator::base_next_step;
use crate::proto::response::{FormField, Remediation, RemediationResponse};
use crate::transaction::NextStep;
use crate::values::{Values, keys};

/// Verification-style steps (`challenge-authenticator`,
/// `enroll-authenticator`, `reset-authenticator`). The step delegates to the
/// factor handler resolved from the remediation at construction time.
#[derive(Clone, Debug)]
pub struct VerifyAuthenticator {
    remediation: Remediation,
    authenticator: Authenticator,
}

const CONSUMED: &[&str] = &[
    keys::VERIFICATION_CODE,
    keys::PASSWORD,
    keys::ANSWER,
    keys::QUESTION,
    keys::QUESTION_KEY,
    keys::CLIENT_DATA,
    keys::ATTESTATION,
    keys::AUTHENTICATOR_DATA,
    keys::SIGNATURE_DATA,
];

impl VerifyAuthenticator {
    pub(crate) fn new(remediation: Remediation) -> Self {
        let authenticator = Authenticator::for_remediation(&remediation);
        Self {
            remediation,
            authenticator,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    fn credentials_field(&self) -> Option<&FormField> {
        self.remediation
            .value
            .iter()
            .find(|field| field.name == "credentials")
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        self.authenticator.can_verify(values)
    }

    pub(crate) fn payload(&self, values: &Values) -> Value {
        match self.authenticator.map_credentials(values) {
            Some(credentials) => json!({ "credentials": credentials }),
            None => json!({}),
        }
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        let mut next_step = base_next_step(&self.remediation, response);
        next_step.inputs = self.authenticator.inputs(self.credentials_field());
        if let Some(context) = &response.context {
            next_step.authenticator_enrollments = context.authenticator_enrollments.clone();
        }
        next_step
    }

    pub(crate) fn values_after_proceed(&self, values: &Values) -> Values {
        values.without(CONSUMED)
    }
}

#[cfg(test)]
mod tests {
    use super::VerifyAuthenticator;
    use crate::proto::response::{
        FactorData, Form, FormField, Remediation, RemediationResponse, ResponseContext,
    };
    use crate::values::{Values, keys};

    fn challenge_email() -> Remediation {
        Remediation {
            name: "challenge-authenticator".to_string(),
            value: vec![FormField {
                name: "credentials".to_string(),
                required: Some(true),
                form: Some(Form {
                    value: vec![FormField {
                        name: "passcode".to_string(),
                        label: Some("Enter code".to_string()),
                        ..FormField::default()
                    }],
                }),
                ..FormField::default()
            }],
            relates_to: Some(FactorData {
                id: "id-email".to_string(),
                key: "email".to_string(),
                display_name: Some("Email".to_string()),
                factor_type: Some("email".to_string()),
                ..FactorData::default()
            }),
            ..Remediation::default()
        }
    }

    #[test]
    fn delegates_to_the_resolved_authenticator() {
        let verify = VerifyAuthenticator::new(challenge_email());

        assert!(!verify.can_remediate(&Values::new()));
        let values = Values::new().with(keys::VERIFICATION_CODE, "test-passcode");
        assert!(verify.can_remediate(&values));
        assert_eq!(
            verify.payload(&values),
            serde_json::json!({ "credentials": { "passcode": "test-passcode" } })
        );
    }

    #[test]
    fn next_step_carries_factor_metadata_and_inputs() {
        let verify = VerifyAuthenticator::new(challenge_email());
        let response = RemediationResponse {
            needed_to_proceed: vec![challenge_email()],
            context: Some(ResponseContext {
                authenticator_enrollments: vec![FactorData {
                    id: "id-phone".to_string(),
                    key: "phone".to_string(),
                    ..FactorData::default()
                }],
                ..ResponseContext::default()
            }),
            ..RemediationResponse::default()
        };

        let next_step = verify.next_step(&response);
        assert_eq!(next_step.name, "challenge-authenticator");
        assert_eq!(next_step.step_type.as_deref(), Some("email"));
        assert_eq!(next_step.inputs.len(), 1);
        assert_eq!(next_step.inputs[0].name, keys::VERIFICATION_CODE);
        assert_eq!(next_step.inputs[0].label.as_deref(), Some("Enter code"));
        assert_eq!(next_step.authenticator_enrollments.len(), 1);
        assert_eq!(
            next_step.authenticator.as_ref().map(|f| f.key.as_str()),
            Some("email")
        );
    }

    #[test]
    fn consumes_credential_keys_after_proceed() {
        let verify = VerifyAuthenticator::new(challenge_email());
        let values = Values::new()
            .with(keys::VERIFICATION_CODE, "test-passcode")
            .with("custom_field", "kept");

        let trimmed = verify.values_after_proceed(&values);
        assert!(!trimmed.has(keys::VERIFICATION_CODE));
        assert!(trimmed.has("custom_field"));
    }
}
