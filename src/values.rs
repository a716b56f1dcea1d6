//! Loosely-typed caller input, accumulated before a remediation attempt
//! consumes it. Keys a step does not recognize are left for later steps in
//! the same invocation (auto-chaining).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known value keys. Steps look these up by name; unknown keys are
/// simply carried along.
pub mod keys {
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const REMEMBER_ME: &str = "remember_me";
    pub const AUTHENTICATOR: &str = "authenticator";
    pub const VERIFICATION_CODE: &str = "verification_code";
    pub const ANSWER: &str = "answer";
    pub const QUESTION: &str = "question";
    pub const QUESTION_KEY: &str = "question_key";
    pub const CLIENT_DATA: &str = "client_data";
    pub const ATTESTATION: &str = "attestation";
    pub const AUTHENTICATOR_DATA: &str = "authenticator_data";
    pub const SIGNATURE_DATA: &str = "signature_data";
    pub const METHOD_TYPE: &str = "method_type";
    pub const START_POLLING: &str = "start_polling";
    pub const SKIP: &str = "skip";
}

/// Flat bag of user-supplied values keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(Map<String, Value>);

impl Values {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Builder-style insert, convenient for call sites and tests.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// True when the key holds a usable value: present, not null, and not an
    /// empty string.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// True when the key holds an explicit boolean `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Copy of the bag with the given keys removed. Used by steps to trim
    /// the values they consumed before the next step runs.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        let mut trimmed = self.clone();
        for key in keys {
            trimmed.0.remove(*key);
        }
        trimmed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}
