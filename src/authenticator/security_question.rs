use serde_json::{Value, json};

use crate::proto::response::FactorData;
use crate::transaction::Input;
use crate::values::{Values, keys};

const CUSTOM_QUESTION_KEY: &str = "custom";

/// First-time enrollment: the caller picks a catalog question by key or
/// supplies a custom question, plus the answer.
#[derive(Clone, Debug)]
pub struct SecurityQuestionEnrollment {
    factor: FactorData,
}

impl SecurityQuestionEnrollment {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::ANSWER)
            && (values.has(keys::QUESTION_KEY) || values.has(keys::QUESTION))
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        let answer = values.get_str(keys::ANSWER)?;
        if let Some(question) = values.get_str(keys::QUESTION) {
            return Some(json!({
                "questionKey": CUSTOM_QUESTION_KEY,
                "question": question,
                "answer": answer,
            }));
        }
        let question_key = values.get_str(keys::QUESTION_KEY)?;
        Some(json!({ "questionKey": question_key, "answer": answer }))
    }

    pub(crate) fn inputs(&self) -> Vec<Input> {
        vec![
            Input::new(keys::QUESTION_KEY, "string").with_label("Choose a security question"),
            Input::new(keys::ANSWER, "string").with_label("Answer"),
        ]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}

/// Verification against an already-enrolled question. The question key comes
/// from the factor's contextual data, never from caller input.
#[derive(Clone, Debug)]
pub struct SecurityQuestionVerification {
    factor: FactorData,
}

impl SecurityQuestionVerification {
    pub(crate) fn new(factor: FactorData) -> Self {
        Self { factor }
    }

    pub(crate) fn can_verify(&self, values: &Values) -> bool {
        values.has(keys::ANSWER)
    }

    pub(crate) fn map_credentials(&self, values: &Values) -> Option<Value> {
        let answer = values.get_str(keys::ANSWER)?;
        let enrolled = self
            .factor
            .contextual_data
            .as_ref()?
            .enrolled_question
            .as_ref()?;
        Some(json!({ "questionKey": enrolled.question_key, "answer": answer }))
    }

    pub(crate) fn inputs(&self) -> Vec<Input> {
        vec![Input::new(keys::ANSWER, "string").with_label("Answer")]
    }

    pub(crate) fn factor(&self) -> &FactorData {
        &self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::{SecurityQuestionEnrollment, SecurityQuestionVerification};
    use crate::proto::response::{ContextualData, EnrolledQuestion, FactorData};
    use crate::values::{Values, keys};

    fn enrolled_factor() -> FactorData {
        FactorData {
            contextual_data: Some(ContextualData {
                enrolled_question: Some(EnrolledQuestion {
                    question: Some("First pet?".to_string()),
                    question_key: "first_pet".to_string(),
                }),
                ..ContextualData::default()
            }),
            ..FactorData::default()
        }
    }

    #[test]
    fn verification_pulls_question_key_from_contextual_data() {
        let verification = SecurityQuestionVerification::new(enrolled_factor());
        let values = Values::new().with(keys::ANSWER, "rex");

        assert!(verification.can_verify(&values));
        assert_eq!(
            verification.map_credentials(&values),
            Some(serde_json::json!({ "questionKey": "first_pet", "answer": "rex" }))
        );
    }

    #[test]
    fn verification_without_enrolled_question_yields_no_credentials() {
        let verification = SecurityQuestionVerification::new(FactorData::default());
        let values = Values::new().with(keys::ANSWER, "rex");
        assert_eq!(verification.map_credentials(&values), None);
    }

    #[test]
    fn enrollment_supports_catalog_and_custom_questions() {
        let enrollment = SecurityQuestionEnrollment::new(FactorData::default());

        let catalog = Values::new()
            .with(keys::QUESTION_KEY, "first_pet")
            .with(keys::ANSWER, "rex");
        assert!(enrollment.can_verify(&catalog));
        assert_eq!(
            enrollment.map_credentials(&catalog),
            Some(serde_json::json!({ "questionKey": "first_pet", "answer": "rex" }))
        );

        let custom = Values::new()
            .with(keys::QUESTION, "Favorite color?")
            .with(keys::ANSWER, "green");
        assert_eq!(
            enrollment.map_credentials(&custom),
            Some(serde_json::json!({
                "questionKey": "custom",
                "question": "Favorite color?",
                "answer": "green",
            }))
        );

        let incomplete = Values::new().with(keys::ANSWER, "rex");
        assert!(!enrollment.can_verify(&incomplete));
    }
}
