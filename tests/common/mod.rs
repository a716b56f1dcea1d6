#![allow(dead_code)]

//! Shared mock collaborators for engine tests: a scripted protocol client
//! that walks a fixed chain of responses, and the client options every test
//! uses. The mock is cheaply clonable so tests can keep a handle for
//! assertions after handing it to the engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use varco::oauth::OauthUrls;
use varco::{
    ClientOptions, Error, InteractResult, ProtocolClient, RemediationResponse, TokenExchanger,
    TokenParams, Tokens, TransactionMeta,
};

pub const INTERACTION_HANDLE: &str = "mock-interaction-handle";

pub enum ExchangeBehavior {
    Succeed,
    Fail(String),
}

struct MockInner {
    position: Mutex<usize>,
    responses: Vec<RemediationResponse>,
    exchange: ExchangeBehavior,
    interact_calls: AtomicUsize,
    introspect_calls: AtomicUsize,
    proceed_calls: Mutex<Vec<(String, Value)>>,
    exchange_calls: Mutex<Vec<TokenParams>>,
}

/// Scripted transport: `introspect` returns the current position in the
/// response chain, `proceed` advances it.
#[derive(Clone)]
pub struct MockClient {
    inner: Arc<MockInner>,
}

impl MockClient {
    pub fn new(responses: Vec<RemediationResponse>) -> Self {
        Self::with_exchange(responses, ExchangeBehavior::Succeed)
    }

    pub fn with_exchange(
        responses: Vec<RemediationResponse>,
        exchange: ExchangeBehavior,
    ) -> Self {
        Self {
            inner: Arc::new(MockInner {
                position: Mutex::new(0),
                responses,
                exchange,
                interact_calls: AtomicUsize::new(0),
                introspect_calls: AtomicUsize::new(0),
                proceed_calls: Mutex::new(Vec::new()),
                exchange_calls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn interact_calls(&self) -> usize {
        self.inner.interact_calls.load(Ordering::SeqCst)
    }

    pub fn introspect_calls(&self) -> usize {
        self.inner.introspect_calls.load(Ordering::SeqCst)
    }

    pub fn proceed_payloads(&self) -> Vec<(String, Value)> {
        self.inner.proceed_calls.lock().expect("proceed calls").clone()
    }

    pub fn exchange_params(&self) -> Vec<TokenParams> {
        self.inner
            .exchange_calls
            .lock()
            .expect("exchange calls")
            .clone()
    }

    fn current(&self) -> Result<RemediationResponse, Error> {
        let position = *self.inner.position.lock().expect("position");
        self.inner
            .responses
            .get(position)
            .cloned()
            .ok_or_else(|| Error::Transport("mock response chain exhausted".to_string()))
    }
}

#[async_trait]
impl ProtocolClient for MockClient {
    async fn interact(&self, _meta: &TransactionMeta) -> Result<InteractResult, Error> {
        self.inner.interact_calls.fetch_add(1, Ordering::SeqCst);
        Ok(InteractResult {
            interaction_handle: INTERACTION_HANDLE.to_string(),
            state: None,
        })
    }

    async fn introspect(
        &self,
        _interaction_handle: &str,
    ) -> Result<RemediationResponse, Error> {
        self.inner.introspect_calls.fetch_add(1, Ordering::SeqCst);
        self.current()
    }

    async fn proceed(
        &self,
        _response: &RemediationResponse,
        name: &str,
        payload: Value,
    ) -> Result<RemediationResponse, Error> {
        self.inner
            .proceed_calls
            .lock()
            .expect("proceed calls")
            .push((name.to_string(), payload));
        let mut position = self.inner.position.lock().expect("position");
        *position += 1;
        self.inner
            .responses
            .get(*position)
            .cloned()
            .ok_or_else(|| Error::Transport("mock response chain exhausted".to_string()))
    }
}

#[async_trait]
impl TokenExchanger for MockClient {
    async fn exchange_code(
        &self,
        params: &TokenParams,
        _urls: &OauthUrls,
    ) -> Result<Tokens, Error> {
        self.inner
            .exchange_calls
            .lock()
            .expect("exchange calls")
            .push(params.clone());
        match &self.inner.exchange {
            ExchangeBehavior::Succeed => Ok(Tokens {
                access_token: Some("mock-access-token".to_string()),
                id_token: Some("mock-id-token".to_string()),
                ..Tokens::default()
            }),
            ExchangeBehavior::Fail(message) => Err(Error::TokenExchange(message.clone())),
        }
    }
}

pub fn client_options() -> ClientOptions {
    ClientOptions::new(
        "https://auth.example.com",
        "client-123",
        "https://app.example.com/callback",
    )
}

/// Build a response tree from its wire JSON form.
pub fn response(value: Value) -> RemediationResponse {
    serde_json::from_value(value).expect("response json")
}
