//! The auto-chaining remediation loop: pick the best acceptable step,
//! submit it, and keep going while the caller's values satisfy the next
//! step. Bounded iteration with a repeat guard, so a malformed response
//! table can never spin forever.

use tracing::debug;

use crate::error::Error;
use crate::flow::{FlowMonitor, FlowSpecification};
use crate::proto::client::ProtocolClient;
use crate::proto::response::{Message, MessageClass, RemediationResponse};
use crate::remediator::Remediator;
use crate::transaction::NextStep;
use crate::values::Values;

/// Upper bound on steps submitted in one invocation. Real flows stay far
/// below this; the bound only matters for malformed response chains.
const MAX_CHAIN_STEPS: usize = 16;

pub(crate) struct RemediateOutcome {
    pub response: RemediationResponse,
    pub next_step: Option<NextStep>,
    pub messages: Vec<Message>,
    pub terminal: bool,
}

impl RemediateOutcome {
    fn pending(
        response: RemediationResponse,
        next_step: Option<NextStep>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            response,
            next_step,
            messages,
            terminal: false,
        }
    }
}

enum Selection {
    /// A step the flow accepts and the values satisfy.
    Proceed(Remediator),
    /// Nothing can be submitted; the best acceptable step to describe, if
    /// any.
    Pending(Option<Remediator>),
}

/// First step, in flow order (actions first), that the monitor accepts.
/// Among accepted steps the first satisfiable one wins; otherwise the first
/// accepted step becomes the pending description.
fn select_remediator(
    response: &RemediationResponse,
    values: &Values,
    spec: &FlowSpecification,
    monitor: &FlowMonitor,
) -> Selection {
    let mut fallback: Option<Remediator> = None;
    let actions = spec.actions.unwrap_or(&[]);

    for name in actions.iter().chain(spec.remediators.iter()) {
        let Some(remediation) = response.find_remediation(name) else {
            continue;
        };
        let remediator = match Remediator::for_remediation(remediation) {
            Some(remediator) => remediator,
            None if spec.is_action(name) => Remediator::for_action(remediation),
            None => continue,
        };
        if !monitor.is_candidate(name, &response.needed_to_proceed) {
            continue;
        }
        if remediator.can_remediate(values) {
            return Selection::Proceed(remediator);
        }
        if fallback.is_none() {
            fallback = Some(remediator);
        }
    }
    Selection::Pending(fallback)
}

/// Step description when selection found nothing acceptable: the first
/// flow-known remediation in server order, without monitor filtering.
fn describe_next_step(
    response: &RemediationResponse,
    spec: &FlowSpecification,
) -> Option<NextStep> {
    for remediation in &response.needed_to_proceed {
        let name = remediation.name.as_str();
        if !spec.remediators.contains(&name) && !spec.is_action(name) {
            continue;
        }
        if let Some(remediator) = Remediator::for_remediation(remediation) {
            return Some(remediator.next_step(response));
        }
        if spec.is_action(name) {
            return Some(Remediator::for_action(remediation).next_step(response));
        }
    }
    None
}

pub(crate) async fn remediate<C: ProtocolClient>(
    client: &C,
    mut response: RemediationResponse,
    values: &Values,
    spec: &FlowSpecification,
    monitor: &mut FlowMonitor,
) -> Result<RemediateOutcome, Error> {
    let mut values = values.clone();

    for _ in 0..MAX_CHAIN_STEPS {
        if response.interaction_code.is_some() {
            return Ok(RemediateOutcome {
                response,
                next_step: None,
                messages: Vec::new(),
                terminal: false,
            });
        }
        if response.is_terminal() {
            let messages = response.collect_messages();
            return Ok(RemediateOutcome {
                response,
                next_step: None,
                messages,
                terminal: true,
            });
        }

        let remediator = match select_remediator(&response, &values, spec, monitor) {
            Selection::Proceed(remediator) => remediator,
            Selection::Pending(fallback) => {
                let next_step = fallback
                    .map(|remediator| remediator.next_step(&response))
                    .or_else(|| describe_next_step(&response, spec));
                let messages = response.collect_messages();
                return Ok(RemediateOutcome::pending(response, next_step, messages));
            }
        };

        if monitor.loop_detected(remediator.name()) {
            debug!(
                step = remediator.name(),
                "remediation loop detected, stopping auto-chain"
            );
            let next_step = Some(remediator.next_step(&response));
            let messages = response.collect_messages();
            return Ok(RemediateOutcome::pending(response, next_step, messages));
        }

        debug!(step = remediator.name(), "submitting remediation");
        let payload = remediator.payload(&values);
        let next = client.proceed(&response, remediator.name(), payload).await?;
        monitor.note_proceeded(remediator.name());
        values = remediator.values_after_proceed(&values);

        // error-class messages stop the chain; the caller resubmits against
        // the same in-progress transaction
        let messages = next.collect_messages();
        if messages
            .iter()
            .any(|message| message.class == MessageClass::Error)
        {
            let next_step = describe_next_step(&next, spec);
            let terminal = next.is_terminal();
            return Ok(RemediateOutcome {
                response: next,
                next_step,
                messages,
                terminal,
            });
        }
        response = next;
    }

    debug!("auto-chain step bound reached, returning current step");
    let next_step = describe_next_step(&response, spec);
    let messages = response.collect_messages();
    Ok(RemediateOutcome::pending(response, next_step, messages))
}
