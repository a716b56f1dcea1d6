use serde_json::{Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{FormField, Remediation, RemediationResponse};
use crate::transaction::NextStep;
use crate::values::{Values, keys};

/// Factor-selection steps. The caller supplies a stable factor key; the
/// payload carries the server-assigned id found in the matching option. The
/// unlock variant also submits the username alongside the selection.
#[derive(Clone, Debug)]
pub struct SelectAuthenticator {
    remediation: Remediation,
    with_identifier: bool,
}

impl SelectAuthenticator {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self {
            remediation,
            with_identifier: false,
        }
    }

    pub(crate) fn with_identifier(remediation: Remediation) -> Self {
        Self {
            remediation,
            with_identifier: true,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    fn authenticator_field(&self) -> Option<&FormField> {
        self.remediation
            .value
            .iter()
            .find(|field| field.name == "authenticator")
    }

    /// Server-assigned id for the factor key the caller chose.
    fn selected_id(&self, values: &Values) -> Option<&str> {
        let chosen = values.get_str(keys::AUTHENTICATOR)?;
        self.authenticator_field()?
            .options
            .iter()
            .find(|option| option.value.field("key") == Some(chosen))
            .and_then(|option| option.value.field("id"))
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        if self.with_identifier && !values.has(keys::USERNAME) {
            return false;
        }
        self.selected_id(values).is_some()
    }

    pub(crate) fn payload(&self, values: &Values) -> Value {
        let mut payload = json!({
            "authenticator": { "id": self.selected_id(values).unwrap_or_default() },
        });
        if self.with_identifier {
            payload["identifier"] = json!(values.get_str(keys::USERNAME).unwrap_or_default());
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
        if self.with_identifier {
            values.without(&[keys::AUTHENTICATOR, keys::USERNAME])
        } else {
            values.without(&[keys::AUTHENTICATOR])
        }
    }
}
