use serde_json::{Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::NextStep;
use crate::values::{Values, keys};

/// Collects the delivery method for a factor before it is challenged, e.g.
/// sms versus voice for a phone factor.
#[derive(Clone, Debug)]
pub struct VerificationData {
    remediation: Remediation,
}

impl VerificationData {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self { remediation }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        values.has(keys::METHOD_TYPE)
    }

    pub(crate) fn payload(&self, values: &Values) -> Value {
        let id = self
            .remediation
            .relates_to
            .as_ref()
            .map(|factor| factor.id.as_str())
            .unwrap_or_default();
        json!({
            "authenticator": {
                "id": id,
                "methodType": values.get_str(keys::METHOD_TYPE).unwrap_or_default(),
            },
        })
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        base_next_step(&self.remediation, response)
    }

    pub(crate) fn values_after_proceed(&self, values: &Values) -> Values {
        values.without(&[keys::METHOD_TYPE])
    }
}
