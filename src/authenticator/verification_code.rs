use serde_json::{Value, json};

use crate::authenticator::merged_input;
use crate::proto::response::{FactorData, FormField};
use crate::transaction::Input;
use crate::values::{Values, keys};

/// Generic handler for factors that only need a single opaque code: email,
/// phone, and any factor key the crate does not recognize. A factor gets its
/// own variant only once it needs more than this.
#[derive(Clone, Debug)]
pub struct VerificationCode {
    factor: FactorData,
}

impl VerificationCode {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::VERIFICATION_CODE)
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        values
            .get_str(keys::VERIFICATION_CODE)
            .map(|code| json!({ "passcode": code }))
    }

    pub(crate) fn inputs(&self, field: Option<&FormField>) -> Vec<Input> {
        vec![merged_input(field, keys::VERIFICATION_CODE, "string")]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::VerificationCode;
    use crate::proto::response::{FactorData, Form, FormField};
    use crate::values::{Values, keys};

    #[test]
    fn maps_code_to_passcode() {
        let code = VerificationCode::new(FactorData::default());
        let values = Values::new().with(keys::VERIFICATION_CODE, "test-passcode");

        assert!(code.can_verify(&values));
        assert_eq!(
            code.map_credentials(&values),
            Some(serde_json::json!({ "passcode": "test-passcode" }))
        );
        assert!(!code.can_verify(&Values::new()));
    }

    #[test]
    fn inputs_merge_server_label_with_fixed_name() {
        let code = VerificationCode::new(FactorData::default());
        let field = FormField {
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
        };

        let inputs = code.inputs(Some(&field));
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, keys::VERIFICATION_CODE);
        assert_eq!(inputs[0].field_type, "string");
        assert_eq!(inputs[0].label.as_deref(), Some("Enter code"));
        assert!(inputs[0].required);
    }
}
