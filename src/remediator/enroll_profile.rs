use serde_json::{Map, Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{FormField, Remediation, RemediationResponse};
use crate::transaction::NextStep;
use crate::values::Values;

/// Registration profile enrollment. The server's `userProfile` form drives
/// both the required-field check and which value keys this step consumes.
#[derive(Clone, Debug)]
pub struct EnrollProfile {
    remediation: Remediation,
}

impl EnrollProfile {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self { remediation }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    fn profile_fields(&self) -> impl Iterator<Item = &FormField> {
        self.remediation
            .value
            .iter()
            .filter(|field| field.name == "userProfile")
            .filter_map(|field| field.form.as_ref())
            .flat_map(|form| form.value.iter())
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        let mut saw_field = false;
        for field in self.profile_fields() {
            saw_field = true;
            if field.required.unwrap_or(false) && !values.has(&field.name) {
                return false;
            }
        }
        saw_field
    }

    pub(crate) fn payload(&self, values: &Values) -> Value {
        let mut profile = Map::new();
        for field in self.profile_fields() {
            if let Some(value) = values.get(&field.name) {
                profile.insert(field.name.clone(), value.clone());
            }
        }
        json!({ "userProfile": Value::Object(profile) })
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        base_next_step(&self.remediation, response)
    }

    pub(crate) fn values_after_proceed(&self, values: &Values) -> Values {
        let consumed: Vec<&str> = self
            .profile_fields()
            .map(|field| field.name.as_str())
            .collect();
        values.without(&consumed)
    }
}
