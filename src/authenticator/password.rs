use serde_json::{Value, json};

use crate::authenticator::merged_input;
use crate::proto::response::{FactorData, FormField};
use crate::transaction::Input;
use crate::values::{Values, keys};

/// Password factor: a single secret value submitted as a passcode.
#[derive(Clone, Debug)]
pub struct Password {
    factor: FactorData,
}

impl Password {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::PASSWORD)
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        values
            .get_str(keys::PASSWORD)
            .map(|password| json!({ "passcode": password }))
    }

    pub(crate) fn inputs(&self, field: Option<&FormField>) -> Vec<Input> {
        let mut input = merged_input(field, keys::PASSWORD, "string");
        input.secret = true;
        vec![input]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}
