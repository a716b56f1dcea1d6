//! Pipeline behavior around persisted transactions: resuming versus
//! interacting, terminal cleanup, token exchange, and flow changes.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::{ExchangeBehavior, INTERACTION_HANDLE, MockClient, client_options, response};
use varco::oauth::OauthUrls;
use varco::{
    Error, Flow, FlowEngine, MemoryStore, RemediationResponse, TransactionMeta,
    TransactionStatus, TransactionStore, Values,
};

fn saved_meta(handle: Option<&str>) -> TransactionMeta {
    TransactionMeta {
        flow: Flow::Default,
        issuer: "https://auth.example.com".to_string(),
        client_id: "client-123".to_string(),
        redirect_uri: "https://app.example.com/callback".to_string(),
        response_type: "code".to_string(),
        scopes: vec!["openid".to_string()],
        state: "meta-state".to_string(),
        nonce: "meta-nonce".to_string(),
        urls: OauthUrls {
            authorize_url: "https://auth.example.com/v1/authorize".to_string(),
            token_url: "https://auth.example.com/v1/token".to_string(),
        },
        ignore_signature: true,
        code_verifier: "meta-code".to_string(),
        code_challenge: "meta-challenge".to_string(),
        code_challenge_method: "S256".to_string(),
        with_credentials: true,
        interaction_handle: handle.map(String::from),
        ..TransactionMeta::default()
    }
}

fn identify_response() -> RemediationResponse {
    response(json!({
        "neededToProceed": [
            { "name": "identify", "value": [ { "name": "identifier", "label": "Username" } ] }
        ]
    }))
}

fn terminal_response() -> RemediationResponse {
    response(json!({
        "neededToProceed": [],
        "messages": [
            { "message": "This transaction has ended.", "class": "INFO" }
        ]
    }))
}

fn interaction_code_response() -> RemediationResponse {
    response(json!({
        "neededToProceed": [],
        "interactionCode": "mock-interaction-code"
    }))
}

#[tokio::test]
async fn saved_meta_with_handle_skips_interact() {
    let client = MockClient::new(vec![identify_response()]);
    let store = Arc::new(MemoryStore::new());
    store
        .save(&saved_meta(Some(INTERACTION_HANDLE)))
        .expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.proceed(Values::new()).await.expect("proceed");
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(
        transaction.next_step.expect("next step").name,
        "identify"
    );
    assert_eq!(client.interact_calls(), 0);
    assert_eq!(client.introspect_calls(), 1);
}

#[tokio::test]
async fn saved_meta_without_handle_interacts_and_persists_handle() {
    let client = MockClient::new(vec![identify_response()]);
    let store = Arc::new(MemoryStore::new());
    store.save(&saved_meta(None)).expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.proceed(Values::new()).await.expect("proceed");
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(client.interact_calls(), 1);

    let meta = store.load().expect("load").expect("meta");
    assert_eq!(meta.interaction_handle.as_deref(), Some(INTERACTION_HANDLE));
    // the rest of the saved transaction is preserved
    assert_eq!(meta.state, "meta-state");
    assert_eq!(meta.code_verifier, "meta-code");
}

#[tokio::test]
async fn no_saved_meta_starts_fresh() {
    let client = MockClient::new(vec![identify_response()]);
    let store = Arc::new(MemoryStore::new());
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.authenticate(Values::new()).await.expect("run");
    assert_eq!(transaction.status, TransactionStatus::Pending);
    assert_eq!(client.interact_calls(), 1);

    let meta = store.load().expect("load").expect("meta");
    assert_eq!(meta.flow, Flow::Authenticate);
    assert_eq!(meta.client_id, "client-123");
    assert_eq!(meta.interaction_handle.as_deref(), Some(INTERACTION_HANDLE));
}

#[tokio::test]
async fn terminal_response_clears_storage() {
    let client = MockClient::new(vec![terminal_response()]);
    let store = Arc::new(MemoryStore::new());
    store
        .save(&saved_meta(Some(INTERACTION_HANDLE)))
        .expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.proceed(Values::new()).await.expect("proceed");
    assert_eq!(transaction.status, TransactionStatus::Terminal);
    assert_eq!(transaction.messages.len(), 1);
    assert!(!store.exists());
}

#[tokio::test]
async fn interaction_code_exchanges_with_meta_parameters() {
    let client = MockClient::new(vec![interaction_code_response()]);
    let store = Arc::new(MemoryStore::new());
    store
        .save(&saved_meta(Some(INTERACTION_HANDLE)))
        .expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.proceed(Values::new()).await.expect("proceed");
    assert_eq!(transaction.status, TransactionStatus::Success);
    let tokens = transaction.tokens.expect("tokens");
    assert_eq!(tokens.access_token.as_deref(), Some("mock-access-token"));

    let params = client.exchange_params();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].interaction_code, "mock-interaction-code");
    assert_eq!(params[0].client_id, "client-123");
    assert_eq!(params[0].redirect_uri, "https://app.example.com/callback");
    assert_eq!(params[0].code_verifier, "meta-code");
    assert_eq!(params[0].scopes, vec!["openid".to_string()]);
    assert!(params[0].ignore_signature);

    assert!(!store.exists());
}

#[tokio::test]
async fn exchange_failure_clears_storage_and_carries_the_error() {
    let client = MockClient::with_exchange(
        vec![interaction_code_response()],
        ExchangeBehavior::Fail("threw an error".to_string()),
    );
    let store = Arc::new(MemoryStore::new());
    store
        .save(&saved_meta(Some(INTERACTION_HANDLE)))
        .expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.proceed(Values::new()).await.expect("proceed");
    assert_eq!(transaction.status, TransactionStatus::Failure);
    match transaction.error {
        Some(Error::TokenExchange(message)) => assert_eq!(message, "threw an error"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!store.exists());
}

#[tokio::test]
async fn empty_proceed_only_resaves_the_same_response() {
    let client = MockClient::new(vec![identify_response()]);
    let store = Arc::new(MemoryStore::new());
    store
        .save(&saved_meta(Some(INTERACTION_HANDLE)))
        .expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let first = engine.proceed(Values::new()).await.expect("first");
    assert_eq!(first.status, TransactionStatus::Pending);
    let saved_first = store.load_response().expect("response").expect("saved");
    let meta_first = store.load().expect("load").expect("meta");

    let second = engine.proceed(Values::new()).await.expect("second");
    assert_eq!(second.status, TransactionStatus::Pending);
    let saved_second = store.load_response().expect("response").expect("saved");
    let meta_second = store.load().expect("load").expect("meta");

    assert_eq!(saved_first, saved_second);
    assert_eq!(meta_first, meta_second);
    // the saved response serves resumption; no second introspect happened
    assert_eq!(client.introspect_calls(), 1);
}

#[tokio::test]
async fn selecting_a_different_flow_abandons_the_saved_transaction() {
    let client = MockClient::new(vec![
        response(json!({
            "neededToProceed": [ { "name": "unlock-account" } ]
        })),
        response(json!({
            "neededToProceed": [
                {
                    "name": "select-authenticator-unlock-account",
                    "value": [
                        { "name": "identifier", "label": "Username" },
                        { "name": "authenticator", "type": "string" }
                    ]
                }
            ]
        })),
    ]);
    let store = Arc::new(MemoryStore::new());
    let mut authenticate_meta = saved_meta(Some("old-handle"));
    authenticate_meta.flow = Flow::Authenticate;
    store.save(&authenticate_meta).expect("seed meta");
    let engine = FlowEngine::new(client.clone(), store.clone(), client_options());

    let transaction = engine.unlock_account(Values::new()).await.expect("unlock");
    assert_eq!(transaction.status, TransactionStatus::Pending);

    // the mismatched transaction was discarded and a new one started
    assert_eq!(client.interact_calls(), 1);
    let meta = store.load().expect("load").expect("meta");
    assert_eq!(meta.flow, Flow::UnlockAccount);
    assert_eq!(meta.interaction_handle.as_deref(), Some(INTERACTION_HANDLE));
}
