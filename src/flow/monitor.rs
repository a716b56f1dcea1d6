//! Per-flow step-ordering rules and loop detection. The rules are data, not
//! code: each flow carries a table of forbidden transitions tuned against
//! observed server behavior, and the table is the single place to adjust
//! when those rules change.

use tracing::debug;

use crate::flow::Flow;
use crate::proto::response::Remediation;
use crate::remediator::step;

/// One ordering rule consulted when a step is evaluated as a candidate.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// The step is not a candidate until some other step has been processed
    /// in this invocation.
    RequirePrevious(&'static str),
    /// Forbidden (current, previous) pairs.
    ForbidAfter(&'static str, &'static [&'static str]),
    /// Forbidden while another step is present in the current candidate set.
    ForbidWhenPresent(&'static str, &'static [&'static str]),
    /// Forbidden once another step already appears in the persisted history;
    /// a later stage was reached via another path.
    ForbidAfterSeen(&'static str, &'static [&'static str]),
}

const AUTHENTICATION_RULES: &[Rule] = &[
    Rule::ForbidAfter(
        step::SELECT_AUTHENTICATOR_AUTHENTICATE,
        &[
            step::SELECT_AUTHENTICATOR_AUTHENTICATE,
            step::CHALLENGE_AUTHENTICATOR,
        ],
    ),
    Rule::ForbidWhenPresent(
        step::SELECT_AUTHENTICATOR_AUTHENTICATE,
        &[step::CHALLENGE_AUTHENTICATOR],
    ),
];

const REGISTRATION_RULES: &[Rule] = &[Rule::ForbidAfter(
    step::ENROLL_PROFILE,
    &[step::ENROLL_PROFILE],
)];

const PASSWORD_RECOVERY_RULES: &[Rule] = &[
    Rule::ForbidAfter(
        step::SELECT_AUTHENTICATOR_AUTHENTICATE,
        &[step::CHALLENGE_AUTHENTICATOR],
    ),
    Rule::ForbidWhenPresent(
        step::AUTHENTICATOR_VERIFICATION_DATA,
        &[step::CHALLENGE_AUTHENTICATOR],
    ),
];

const ACCOUNT_UNLOCK_RULES: &[Rule] = &[
    // identify must never auto-remediate just because a username was passed
    Rule::RequirePrevious(step::IDENTIFY),
    Rule::ForbidAfter(
        step::UNLOCK_ACCOUNT,
        &[
            step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT,
            step::SELECT_AUTHENTICATOR_AUTHENTICATE,
            step::CHALLENGE_AUTHENTICATOR,
        ],
    ),
    Rule::ForbidAfter(
        step::SELECT_AUTHENTICATOR_AUTHENTICATE,
        &[
            step::UNLOCK_ACCOUNT,
            step::CHALLENGE_AUTHENTICATOR,
            step::SELECT_AUTHENTICATOR_AUTHENTICATE,
        ],
    ),
    Rule::ForbidAfter(
        step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT,
        &[
            step::IDENTIFY,
            step::SELECT_AUTHENTICATOR_AUTHENTICATE,
            step::CHALLENGE_AUTHENTICATOR,
        ],
    ),
    Rule::ForbidAfter(
        step::CHALLENGE_AUTHENTICATOR,
        &[step::IDENTIFY, step::UNLOCK_ACCOUNT],
    ),
    Rule::ForbidAfter(
        step::AUTHENTICATOR_VERIFICATION_DATA,
        &[
            step::IDENTIFY,
            step::UNLOCK_ACCOUNT,
            step::CHALLENGE_AUTHENTICATOR,
        ],
    ),
    Rule::ForbidWhenPresent(
        step::SELECT_AUTHENTICATOR_AUTHENTICATE,
        &[step::CHALLENGE_AUTHENTICATOR],
    ),
    // single-shot steps must not come back once a later stage is on record
    Rule::ForbidAfterSeen(
        step::UNLOCK_ACCOUNT,
        &[step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT],
    ),
    Rule::ForbidAfterSeen(
        step::SELECT_AUTHENTICATOR_UNLOCK_ACCOUNT,
        &[step::CHALLENGE_AUTHENTICATOR],
    ),
];

/// Tracks step history for one flow and vets candidate steps against the
/// flow's ordering rules. Sentinel flows carry an empty rule table.
#[derive(Clone, Debug)]
pub struct FlowMonitor {
    rules: &'static [Rule],
    finish_requires: Option<&'static str>,
    /// Last step processed in this invocation; rule checks read it.
    previous_step: Option<String>,
    /// Last step handed to [`Self::loop_detected`], independent of rules.
    loop_step: Option<String>,
    /// Every step name processed in the current transaction, persisted on
    /// the transaction meta so it survives redirects. Append-only.
    history: Vec<String>,
}

impl FlowMonitor {
    #[must_use]
    pub fn for_flow(flow: Flow) -> Self {
        let (rules, finish_requires): (&[Rule], Option<&str>) = match flow {
            Flow::Authenticate => (AUTHENTICATION_RULES, None),
            Flow::Register => (REGISTRATION_RULES, Some(step::ENROLL_PROFILE)),
            Flow::RecoverPassword => (PASSWORD_RECOVERY_RULES, None),
            Flow::UnlockAccount => (ACCOUNT_UNLOCK_RULES, None),
            Flow::Default | Flow::Proceed => (&[], None),
        };
        Self {
            rules,
            finish_requires,
            previous_step: None,
            loop_step: None,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    /// Whether the step may be pursued given the previous step, the
    /// persisted history, and the full candidate set.
    #[must_use]
    pub fn is_candidate(&self, name: &str, remediations: &[Remediation]) -> bool {
        for rule in self.rules {
            let rejected = match rule {
                Rule::RequirePrevious(current) => {
                    *current == name && self.previous_step.is_none()
                }
                Rule::ForbidAfter(current, previous) => {
                    *current == name
                        && self
                            .previous_step
                            .as_deref()
                            .is_some_and(|p| previous.contains(&p))
                }
                Rule::ForbidWhenPresent(current, present) => {
                    *current == name
                        && remediations
                            .iter()
                            .any(|r| present.contains(&r.name.as_str()))
                }
                Rule::ForbidAfterSeen(current, seen) => {
                    *current == name
                        && self.history.iter().any(|h| seen.contains(&h.as_str()))
                }
            };
            if rejected {
                debug!(step = name, ?rule, "step rejected by flow rules");
                return false;
            }
        }
        true
    }

    /// In-memory guard against chaining the same step twice in a row within
    /// one invocation, independent of the persisted history.
    pub fn loop_detected(&mut self, name: &str) -> bool {
        if self.loop_step.as_deref() == Some(name) {
            return true;
        }
        self.loop_step = Some(name.to_string());
        false
    }

    /// Record a processed step: becomes the previous step for rule checks
    /// and is appended to the persisted history.
    pub fn note_proceeded(&mut self, name: &str) {
        self.previous_step = Some(name.to_string());
        self.history.push(name.to_string());
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether the flow may complete. Flows with required follow-up steps
    /// report finished only once those steps are on record.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finish_requires
            .map_or(true, |required| self.history.iter().any(|h| h == required))
    }
}
