use serde_json::{Value, json};

use crate::proto::response::FactorData;
use crate::transaction::Input;
use crate::values::{Values, keys};

/// Hardware-key enrollment: the browser produced an attestation over the
/// server's activation data. The browser API call itself happens outside
/// this crate; only its outputs travel through the values bag.
#[derive(Clone, Debug)]
pub struct WebauthnEnrollment {
    factor: FactorData,
}

impl WebauthnEnrollment {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::CLIENT_DATA) && values.has(keys::ATTESTATION)
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        let client_data = values.get_str(keys::CLIENT_DATA)?;
        let attestation = values.get_str(keys::ATTESTATION)?;
        Some(json!({ "clientData": client_data, "attestation": attestation }))
    }

    pub(crate) fn inputs(&self) -> Vec<Input> {
        vec![
            Input::new(keys::CLIENT_DATA, "string")
                .with_label("Client Data")
                .hidden(),
            Input::new(keys::ATTESTATION, "string")
                .with_label("Attestation")
                .hidden(),
        ]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}

/// Hardware-key verification: an assertion over the challenge carried in the
/// factor's contextual data.
#[derive(Clone, Debug)]
pub struct WebauthnVerification {
    factor: FactorData,
}

impl WebauthnVerification {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::CLIENT_DATA)
            && values.has(keys::AUTHENTICATOR_DATA)
            && values.has(keys::SIGNATURE_DATA)
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        let client_data = values.get_str(keys::CLIENT_DATA)?;
        let authenticator_data = values.get_str(keys::AUTHENTICATOR_DATA)?;
        let signature_data = values.get_str(keys::SIGNATURE_DATA)?;
        Some(json!({
            "clientData": client_data,
            "authenticatorData": authenticator_data,
            "signatureData": signature_data,
        }))
    }

    pub(crate) fn inputs(&self) -> Vec<Input> {
        vec![
            Input::new(keys::CLIENT_DATA, "string").hidden(),
            Input::new(keys::AUTHENTICATOR_DATA, "string").hidden(),
            Input::new(keys::SIGNATURE_DATA, "string").hidden(),
        ]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}
