//! Verification-factor handlers. Each variant maps raw caller values into
//! the credential shape its factor submits, and declares the inputs the
//! caller must supply. Variant choice is a pure function of the factor key
//! and, for security-question and hardware-key factors, whether "already
//! enrolled" contextual data is present.

mod password;
mod security_question;
mod totp;
mod verification_code;
mod webauthn;

pub use password::Password;
pub use security_question::{SecurityQuestionEnrollment, SecurityQuestionVerification};
pub use totp::Totp;
pub use verification_code::VerificationCode;
pub use webauthn::{WebauthnEnrollment, WebauthnVerification};

use serde_json::Value;

use crate::proto::response::{FactorData, FormField, Remediation};
use crate::transaction::Input;
use crate::values::Values;

/// Stable factor keys. Keys not listed here are handled by the generic
/// verification-code variant, so new single-code factor types need no
/// client change.
pub mod factor {
    pub const PASSWORD: &str = "password";
    pub const SECURITY_QUESTION: &str = "security_question";
    pub const TOTP: &str = "totp";
    pub const WEBAUTHN: &str = "webauthn";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
}

/// Closed set of factor handlers.
#[derive(Clone, Debug)]
pub enum Authenticator {
    Password(Password),
    SecurityQuestionEnrollment(SecurityQuestionEnrollment),
    SecurityQuestionVerification(SecurityQuestionVerification),
    Totp(Totp),
    WebauthnEnrollment(WebauthnEnrollment),
    WebauthnVerification(WebauthnVerification),
    VerificationCode(VerificationCode),
}

impl Authenticator {
    /// Resolve the handler for the factor a remediation relates to.
    #[must_use]
    pub fn for_remediation(remediation: &Remediation) -> Self {
        let factor = remediation.relates_to.clone().unwrap_or_default();
        let key = factor.key.clone();
        match key.as_str() {
            factor::PASSWORD => Self::Password(Password::new(factor)),
            factor::SECURITY_QUESTION => {
                let enrolled = factor
                    .contextual_data
                    .as_ref()
                    .is_some_and(|data| data.enrolled_question.is_some());
                if enrolled {
                    Self::SecurityQuestionVerification(SecurityQuestionVerification::new(factor))
                } else {
                    Self::SecurityQuestionEnrollment(SecurityQuestionEnrollment::new(factor))
                }
            }
            factor::TOTP => Self::Totp(Totp::new(factor)),
            factor::WEBAUTHN => {
                let challenged = factor
                    .contextual_data
                    .as_ref()
                    .is_some_and(|data| data.challenge_data.is_some());
                if challenged {
                    Self::WebauthnVerification(WebauthnVerification::new(factor))
                } else {
                    Self::WebauthnEnrollment(WebauthnEnrollment::new(factor))
                }
            }
            _ => Self::VerificationCode(VerificationCode::new(factor)),
        }
    }

    /// Whether the values bag holds the minimum this factor needs to build
    /// credentials. Pure predicate.
    #[must_use]
    pub fn can_verify(&self, values: &Values) -> bool {
        match self {
            Self::Password(a) => a.can_verify(values),
            Self::SecurityQuestionEnrollment(a) => a.can_verify(values),
            Self::SecurityQuestionVerification(a) => a.can_verify(values),
            Self::Totp(a) => a.can_verify(values),
            Self::WebauthnEnrollment(a) => a.can_verify(values),
            Self::WebauthnVerification(a) => a.can_verify(values),
            Self::VerificationCode(a) => a.can_verify(values),
        }
    }

    /// Project recognized values into the factor's credential payload.
    /// Returns `None` when required values are missing.
    #[must_use]
    pub fn map_credentials(&self, values: &Values) -> Option<Value> {
        match self {
            Self::Password(a) => a.map_credentials(values),
            Self::SecurityQuestionEnrollment(a) => a.map_credentials(values),
            Self::SecurityQuestionVerification(a) => a.map_credentials(values),
            Self::Totp(a) => a.map_credentials(values),
            Self::WebauthnEnrollment(a) => a.map_credentials(values),
            Self::WebauthnVerification(a) => a.map_credentials(values),
            Self::VerificationCode(a) => a.map_credentials(values),
        }
    }

    /// The inputs the caller must supply, merging server-declared metadata
    /// with the factor's fixed field names.
    #[must_use]
    pub fn inputs(&self, field: Option<&FormField>) -> Vec<Input> {
        match self {
            Self::Password(a) => a.inputs(field),
            Self::SecurityQuestionEnrollment(a) => a.inputs(),
            Self::SecurityQuestionVerification(a) => a.inputs(),
            Self::Totp(a) => a.inputs(field),
            Self::WebauthnEnrollment(a) => a.inputs(),
            Self::WebauthnVerification(a) => a.inputs(),
            Self::VerificationCode(a) => a.inputs(field),
        }
    }

    #[must_use]
    pub fn factor(&self) -> &FactorData {
        match self {
            Self::Password(a) => a.factor(),
            Self::SecurityQuestionEnrollment(a) => a.factor(),
            Self::SecurityQuestionVerification(a) => a.factor(),
            Self::Totp(a) => a.factor(),
            Self::WebauthnEnrollment(a) => a.factor(),
            Self::WebauthnVerification(a) => a.factor(),
            Self::VerificationCode(a) => a.factor(),
        }
    }
}

/// Merge a server-declared credentials field into a fixed input: the nested
/// form carries label/secret, the field itself the required flag.
pub(crate) fn merged_input(field: Option<&FormField>, name: &str, field_type: &str) -> Input {
    let nested = field
        .and_then(|f| f.form.as_ref())
        .and_then(|form| form.value.first());

    let mut input = Input::new(name, field_type);
    if let Some(source) = nested.or(field) {
        input.label = source.label.clone();
        input.secret = source.secret.unwrap_or(false);
        input.required = source
            .required
            .or_else(|| field.and_then(|f| f.required))
            .unwrap_or(true);
    }
    input
}
