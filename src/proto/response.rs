//! Parsed remediation-response tree. A fresh, immutable tree arrives with
//! every server response; remediation handlers read it but never modify it.
//!
//! Field names follow the camelCase wire form of the remediation protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One server response: the ordered candidate steps, optional context about
/// the factor being worked on, and an interaction code once the flow has
/// completed successfully.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemediationResponse {
    pub needed_to_proceed: Vec<Remediation>,
    pub context: Option<ResponseContext>,
    pub interaction_code: Option<String>,
    pub messages: Vec<Message>,
}

impl RemediationResponse {
    /// A response with nothing left to proceed with and no interaction code
    /// ends the flow.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.interaction_code.is_none() && self.needed_to_proceed.is_empty()
    }

    #[must_use]
    pub fn find_remediation(&self, name: &str) -> Option<&Remediation> {
        self.needed_to_proceed.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find_remediation(name).is_some()
    }

    /// Top-level messages plus per-field validation messages nested inside
    /// remediation forms, in document order.
    #[must_use]
    pub fn collect_messages(&self) -> Vec<Message> {
        let mut collected = self.messages.clone();
        for remediation in &self.needed_to_proceed {
            for field in &remediation.value {
                collect_field_messages(field, &mut collected);
            }
        }
        collected
    }
}

fn collect_field_messages(field: &FormField, into: &mut Vec<Message>) {
    into.extend(field.messages.iter().cloned());
    if let Some(form) = &field.form {
        for child in &form.value {
            collect_field_messages(child, into);
        }
    }
}

/// Context attached to a response while a factor is being enrolled or
/// challenged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseContext {
    pub current_authenticator: Option<FactorData>,
    pub authenticator_enrollments: Vec<FactorData>,
}

/// A server-declared candidate step with its input schema.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Remediation {
    pub name: String,
    pub value: Vec<FormField>,
    /// Factor this step relates to, when the step challenges or enrolls one.
    pub relates_to: Option<FactorData>,
    /// Suggested polling interval in milliseconds, for polling steps.
    pub refresh: Option<u64>,
}

/// One field descriptor inside a remediation form. Compound values carry a
/// nested [`Form`]; selectable values carry [`FieldOption`]s.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub label: Option<String>,
    pub required: Option<bool>,
    pub secret: Option<bool>,
    pub visible: Option<bool>,
    pub value: Option<Value>,
    pub form: Option<Form>,
    pub options: Vec<FieldOption>,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Form {
    pub value: Vec<FormField>,
}

/// A selectable option of a form field. Authenticator options carry a nested
/// form holding the server-assigned `id` and the stable factor `key`;
/// simpler options (security questions) carry a plain string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub label: Option<String>,
    pub value: OptionValue,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Text(String),
    Fields { form: Form },
}

impl OptionValue {
    /// Looks up a named scalar inside a compound option value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Fields { form } => form
                .value
                .iter()
                .find(|f| f.name == name)
                .and_then(|f| f.value.as_ref())
                .and_then(Value::as_str),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Fields { .. } => None,
        }
    }
}

/// Factor description sent alongside challenge/enroll steps (`relatesTo` on
/// the wire, dereferenced by the transport).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactorData {
    pub id: String,
    pub key: String,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub factor_type: Option<String>,
    pub methods: Vec<Value>,
    pub contextual_data: Option<ContextualData>,
}

/// Factor-specific context: an already-enrolled security question, the
/// question catalog during enrollment, or hardware-key challenge material.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextualData {
    pub enrolled_question: Option<EnrolledQuestion>,
    pub questions: Vec<Question>,
    pub question_keys: Vec<String>,
    pub challenge_data: Option<Value>,
    pub activation_data: Option<Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrolledQuestion {
    pub question: Option<String>,
    pub question_key: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    pub question: String,
    pub question_key: String,
}

/// A server message attached to a response or a single form field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    pub message: String,
    pub class: MessageClass,
    pub i18n_key: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageClass {
    #[default]
    Info,
    Warn,
    Error,
}
