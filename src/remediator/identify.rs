use serde_json::{Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::NextStep;
use crate::values::{Values, keys};

/// The identification step: submits the username and, when the form asks
/// for credentials up front, the password alongside it.
#[derive(Clone, Debug)]
pub struct Identify {
    remediation: Remediation,
}

impl Identify {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self { remediation }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        values.has(keys::USERNAME)
    }

    pub(crate) fn payload(&self, values: &Values) -> Value {
        let mut payload = json!({
            "identifier": values.get_str(keys::USERNAME).unwrap_or_default(),
        });

        let wants_credentials = self
            .remediation
            .value
            .iter()
            .any(|field| field.name == "credentials");
        if wants_credentials {
            if let Some(password) = values.get_str(keys::PASSWORD) {
                payload["credentials"] = json!({ "passcode": password });
            }
        }
        if values.flag(keys::REMEMBER_ME) {
            payload["rememberMe"] = json!(true);
        }
        payload
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        let mut next_step = base_next_step(&self.remediation, response);
        // callers supply the username under its values key, not the wire name
        for input in &mut next_step.inputs {
            if input.name == "identifier" {
                input.name = keys::USERNAME.to_string();
            }
        }
        next_step
    }

    pub(crate) fn values_after_proceed(&self, values: &Values) -> Values {
        values.without(&[keys::USERNAME, keys::PASSWORD, keys::REMEMBER_ME])
    }
}

#[cfg(test)]
mod tests {
    use super::Identify;
    use crate::proto::response::{FormField, Remediation};
    use crate::values::{Values, keys};

    fn remediation(with_credentials: bool) -> Remediation {
        let mut value = vec![FormField {
            name: "identifier".to_string(),
            label: Some("Username".to_string()),
            ..FormField::default()
        }];
        if with_credentials {
            value.push(FormField {
                name: "credentials".to_string(),
                ..FormField::default()
            });
        }
        Remediation {
            name: "identify".to_string(),
            value,
            ..Remediation::default()
        }
    }

    #[test]
    fn requires_a_username() {
        let identify = Identify::new(remediation(false));
        assert!(!identify.can_remediate(&Values::new()));
        assert!(identify.can_remediate(&Values::new().with(keys::USERNAME, "myname")));
    }

    #[test]
    fn includes_password_only_when_the_form_asks() {
        let values = Values::new()
            .with(keys::USERNAME, "myname")
            .with(keys::PASSWORD, "hunter2");

        let plain = Identify::new(remediation(false));
        assert_eq!(
            plain.payload(&values),
            serde_json::json!({ "identifier": "myname" })
        );

        let with_credentials = Identify::new(remediation(true));
        assert_eq!(
            with_credentials.payload(&values),
            serde_json::json!({
                "identifier": "myname",
                "credentials": { "passcode": "hunter2" },
            })
        );
    }

    #[test]
    fn consumes_identity_keys_after_proceed() {
        let identify = Identify::new(remediation(false));
        let values = Values::new()
            .with(keys::USERNAME, "myname")
            .with(keys::VERIFICATION_CODE, "123456");

        let trimmed = identify.values_after_proceed(&values);
        assert!(!trimmed.has(keys::USERNAME));
        assert!(trimmed.has(keys::VERIFICATION_CODE));
    }
}
