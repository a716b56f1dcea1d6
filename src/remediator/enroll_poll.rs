use serde_json::{Value, json};

use crate::remediator::{base_next_step, step};
use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::{NextStep, PollInfo};
use crate::values::{Values, keys};

/// Polling while an out-of-band enrollment completes. Only proceeds when the
/// caller explicitly opted into polling; the flag is consumed on each poll
/// so a stale value cannot keep the chain spinning.
#[derive(Clone, Debug)]
pub struct EnrollPoll {
    remediation: Remediation,
}

impl EnrollPoll {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self { remediation }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        values.flag(keys::START_POLLING)
    }

    pub(crate) fn payload(&self) -> Value {
        json!({})
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        let mut next_step = base_next_step(&self.remediation, response);
        if next_step.authenticator.is_none() {
            next_step.authenticator = response
                .context
                .as_ref()
                .and_then(|context| context.current_authenticator.clone());
        }
        next_step.poll = Some(PollInfo {
            required: true,
            refresh: self.remediation.refresh,
        });
        next_step
    }

    pub(crate) fn values_after_proceed(&self, values: &Values) -> Values {
        values.without(&[keys::START_POLLING])
    }

    pub(crate) fn peer_remediations(&self, remediations: &[Remediation]) -> Vec<String> {
        remediations
            .iter()
            .filter(|remediation| remediation.name == step::SELECT_ENROLLMENT_CHANNEL)
            .map(|remediation| remediation.name.clone())
            .collect()
    }
}
