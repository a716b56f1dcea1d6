//! The orchestration pipeline: establish or resume a transaction, fetch the
//! current remediation set, auto-chain through satisfiable steps, and settle
//! into a normalized transaction result. Every call is stateless except for
//! the injected transaction store; concurrent calls against one stored
//! transaction are not coordinated here.

use std::sync::Mutex;

use tracing::warn;

use crate::error::Error;
use crate::flow::{Flow, FlowSpecification};
use crate::options::{ClientOptions, TransactionOptions};
use crate::proto::client::{ProtocolClient, TokenExchanger, TokenParams};
use crate::proto::response::RemediationResponse;
use crate::remediate::remediate;
use crate::remediator::step;
use crate::transaction::{
    self, Feature, Transaction, TransactionMeta, TransactionStore,
};
use crate::values::Values;

/// Result of beginning a transaction without driving it: the persisted meta
/// and the features the server's first response advertises.
#[derive(Clone, Debug)]
pub struct StartedTransaction {
    pub meta: TransactionMeta,
    pub enabled_features: Vec<Feature>,
    pub response: RemediationResponse,
}

/// Client engine for server-driven authentication flows. Generic over the
/// injected transport and transaction store.
pub struct FlowEngine<C, S> {
    client: C,
    store: S,
    options: ClientOptions,
    flow: Mutex<Option<Flow>>,
}

impl<C, S> FlowEngine<C, S>
where
    C: ProtocolClient + TokenExchanger,
    S: TransactionStore,
{
    #[must_use]
    pub fn new(client: C, store: S, options: ClientOptions) -> Self {
        Self {
            client,
            store,
            options,
            flow: Mutex::new(None),
        }
    }

    /// The flow selected by the most recent call, if any.
    #[must_use]
    pub fn current_flow(&self) -> Option<Flow> {
        self.flow.lock().ok().and_then(|guard| *guard)
    }

    fn set_flow(&self, flow: Flow) {
        if let Ok(mut guard) = self.flow.lock() {
            *guard = Some(flow);
        }
    }

    /// Begin or resume an authentication flow.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails outside the defined
    /// failure statuses.
    pub async fn authenticate(&self, values: Values) -> Result<Transaction, Error> {
        self.run(TransactionOptions::for_flow(Flow::Authenticate), values)
            .await
    }

    /// Begin or resume a registration flow.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails outside the defined
    /// failure statuses.
    pub async fn register(&self, values: Values) -> Result<Transaction, Error> {
        self.run(TransactionOptions::for_flow(Flow::Register), values)
            .await
    }

    /// Begin or resume a password-recovery flow.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails outside the defined
    /// failure statuses.
    pub async fn recover_password(&self, values: Values) -> Result<Transaction, Error> {
        self.run(TransactionOptions::for_flow(Flow::RecoverPassword), values)
            .await
    }

    /// Begin or resume an account-unlock flow. At the start of a transaction
    /// the server's enabled-features list is checked first, so an org
    /// without self-service unlock fails fast.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails outside the defined
    /// failure statuses.
    pub async fn unlock_account(&self, values: Values) -> Result<Transaction, Error> {
        let options = TransactionOptions::for_flow(Flow::UnlockAccount);
        if !transaction::has_interaction_handle(&self.store, &self.options, &options) {
            let started = self.start_transaction(options.clone()).await?;
            if !started.enabled_features.contains(&Feature::AccountUnlock) {
                return Ok(Transaction::failure(Error::UnlockNotSupported));
            }
        }
        self.run(options, values).await
    }

    /// Continue the in-progress transaction with more values, without
    /// changing the selected flow.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails outside the defined
    /// failure statuses.
    pub async fn proceed(&self, values: Values) -> Result<Transaction, Error> {
        self.run(TransactionOptions::default(), values).await
    }

    /// Abandon the in-progress transaction. Clears persisted state; an
    /// in-flight network call is not interrupted.
    ///
    /// # Errors
    /// Returns an error if the storage medium fails.
    pub fn cancel(&self) -> Result<Transaction, Error> {
        self.store.clear()?;
        Ok(Transaction::canceled())
    }

    /// Begin a transaction and report what the server offers, without
    /// submitting any remediation.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails.
    pub async fn start_transaction(
        &self,
        mut options: TransactionOptions,
    ) -> Result<StartedTransaction, Error> {
        let flow = options.flow.unwrap_or_default();
        self.set_flow(flow);
        let spec = FlowSpecification::for_flow(flow);
        options.with_credentials.get_or_insert(spec.with_credentials);

        let (meta, handle) = self.resolve_meta(&options, flow).await?;
        let response = self.client.introspect(&handle).await?;
        Ok(StartedTransaction {
            enabled_features: enabled_features(&response),
            meta,
            response,
        })
    }

    /// One full pipeline invocation; the entry points above are thin
    /// wrappers that pin the flow.
    ///
    /// # Errors
    /// Returns an error if transport or storage fails outside the defined
    /// failure statuses.
    pub async fn run(
        &self,
        mut options: TransactionOptions,
        values: Values,
    ) -> Result<Transaction, Error> {
        let flow = options
            .flow
            .or_else(|| self.current_flow())
            .unwrap_or_default();
        self.set_flow(flow);
        options.flow = Some(flow);

        let spec = FlowSpecification::for_flow(flow);
        options.with_credentials.get_or_insert(spec.with_credentials);

        let (mut meta, handle) = self.resolve_meta(&options, flow).await?;
        let response = self.current_response(&handle).await?;

        let mut monitor = spec.monitor(meta.remediations.clone());
        let outcome = remediate(&self.client, response, &values, &spec, &mut monitor).await?;
        meta.remediations = monitor.history().to_vec();

        if let Some(code) = outcome.response.interaction_code.clone() {
            if !monitor.is_finished() {
                self.store.clear()?;
                return Ok(Transaction::failure(Error::FlowUnfinished));
            }
            let params = TokenParams {
                interaction_code: code,
                client_id: meta.client_id.clone(),
                redirect_uri: meta.redirect_uri.clone(),
                code_verifier: meta.code_verifier.clone(),
                scopes: meta.scopes.clone(),
                ignore_signature: meta.ignore_signature,
            };
            let exchanged = self.client.exchange_code(&params, &meta.urls).await;
            self.store.clear()?;
            return match exchanged {
                Ok(tokens) => Ok(Transaction::success(tokens)),
                Err(error) => {
                    warn!(%error, "interaction code exchange failed");
                    Ok(Transaction::failure(error))
                }
            };
        }

        if outcome.terminal {
            self.store.clear()?;
            return Ok(Transaction::terminal(outcome.messages));
        }

        transaction::save(&self.store, &meta)?;
        self.store
            .save_response(&serde_json::to_value(&outcome.response)?)?;
        Ok(Transaction::pending(outcome.next_step, outcome.messages))
    }

    /// Saved-and-valid meta with an interaction handle, interacting first
    /// when the handle is missing or no valid transaction exists.
    async fn resolve_meta(
        &self,
        options: &TransactionOptions,
        flow: Flow,
    ) -> Result<(TransactionMeta, String), Error> {
        match transaction::saved(&self.store, &self.options, options)? {
            Some(meta) => match meta.interaction_handle.clone() {
                Some(handle) => Ok((meta, handle)),
                None => self.interact_and_save(meta).await,
            },
            None => {
                // warns when mismatched meta is present, then creates fresh
                let meta = transaction::get(&self.store, &self.options, options, flow)?;
                self.store.clear()?;
                self.interact_and_save(meta).await
            }
        }
    }

    async fn interact_and_save(
        &self,
        mut meta: TransactionMeta,
    ) -> Result<(TransactionMeta, String), Error> {
        let result = self.client.interact(&meta).await?;
        if let Some(state) = result.state {
            meta.state = state;
        }
        meta.interaction_handle = Some(result.interaction_handle.clone());
        transaction::save(&self.store, &meta)?;
        Ok((meta, result.interaction_handle))
    }

    /// The saved response when one is persisted, otherwise a fresh
    /// introspect.
    async fn current_response(&self, handle: &str) -> Result<RemediationResponse, Error> {
        if let Some(raw) = self.store.load_response()? {
            return Ok(serde_json::from_value(raw)?);
        }
        self.client.introspect(handle).await
    }
}

/// Features advertised by a response's candidate set.
fn enabled_features(response: &RemediationResponse) -> Vec<Feature> {
    let mut features = Vec::new();
    if response.contains(step::UNLOCK_ACCOUNT) {
        features.push(Feature::AccountUnlock);
    }
    if response.contains(step::SELECT_ENROLL_PROFILE) || response.contains(step::ENROLL_PROFILE) {
        features.push(Feature::Registration);
    }
    if response.contains(step::CURRENT_AUTHENTICATOR_RECOVER)
        || response.contains(step::CURRENT_AUTHENTICATOR_ENROLLMENT_RECOVER)
    {
        features.push(Feature::PasswordRecovery);
    }
    features
}
