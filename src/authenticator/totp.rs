use serde_json::{Value, json};

use crate::authenticator::merged_input;
use crate::proto::response::{FactorData, FormField};
use crate::transaction::Input;
use crate::values::{Values, keys};

/// Time-based code from an authenticator app. Same input shape as the
/// generic verification code; kept as its own variant because app factors
/// grow special cases (push, number challenge) over time.
#[derive(Clone, Debug)]
pub struct Totp {
    factor: FactorData,
}

impl Totp {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::VERIFICATION_CODE)
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        values
            .get_str(keys::VERIFICATION_CODE)
            .map(|code| json!({ "totp": code }))
    }

    pub(crate) fn inputs(&self, field: Option<&FormField>) -> Vec<Input> {
        vec![merged_input(field, keys::VERIFICATION_CODE, "string")]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}
