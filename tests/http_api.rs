//! API routes driven end to end over the in-memory store and a
//! scripted model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use banter::agent::{Agent, AgentConfig, TurnRunner};
use banter::llm::{CompletionRequest, ModelClient, ModelError, ModelResponse};
use banter::server::{self, AppState, StaticTokenAuth};
use banter::store::{ChatStore, MemoryStore};
use banter::tool::{ToolExecutor, ToolRegistry};

struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelResponse, String>>>,
}

impl ScriptedModel {
    fn replies(texts: &[&str]) -> Self {
        Self {
            script: Mutex::new(
                texts
                    .iter()
                    .map(|t| {
                        Ok(ModelResponse::PlainReply {
                            text: t.to_string(),
                        })
                    })
                    .collect(),
            ),
        }
    }

    fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err("provider down".to_string())])),
        }
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, _request: CompletionRequest) -> Result<ModelResponse, ModelError> {
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ModelError::Api(message)),
            None => Err(ModelError::Api("script exhausted".to_string())),
        }
    }
}

fn app_with(model: ScriptedModel) -> (axum::Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let agent = Agent::new(
        Arc::new(model),
        ToolExecutor::new(Arc::new(ToolRegistry::new())),
        AgentConfig::default(),
    );
    let state = AppState {
        runner: TurnRunner::new(agent),
        store: store.clone() as Arc<dyn ChatStore>,
        auth: Arc::new(StaticTokenAuth::from_spec("t0ken:alice")),
    };
    (server::configure(state), store)
}

fn post_chat(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_requires_auth() {
    let (app, _store) = app_with(ScriptedModel::replies(&["hi"]));
    let response = app
        .oneshot(post_chat(
            json!({"messages": [{"role": "user", "content": "hi"}]}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_rejects_empty_and_non_user_tails() {
    let (app, _store) = app_with(ScriptedModel::replies(&["hi"]));

    let response = app
        .clone()
        .oneshot(post_chat(json!({"messages": []}), Some("t0ken")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_chat(
            json!({"messages": [{"role": "assistant", "content": "hello"}]}),
            Some("t0ken"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_turn_persists_both_sides_and_titles_the_chat() {
    let (app, store) = app_with(ScriptedModel::replies(&["Nice to meet you."]));

    let response = app
        .oneshot(post_chat(
            json!({"messages": [{"role": "user", "content": "Hello there, assistant"}]}),
            Some("t0ken"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Nice to meet you.");
    let chat_id: uuid::Uuid = body["chatId"].as_str().unwrap().parse().unwrap();

    let chats = store.list_chats("alice").await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].title, "Hello there, assistant");

    let messages = store.list_messages(chat_id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Hello there, assistant");
    assert_eq!(messages[1].content, "Nice to meet you.");
}

#[tokio::test]
async fn follow_up_reuses_the_same_chat() {
    let (app, store) = app_with(ScriptedModel::replies(&["First.", "Second."]));

    let first = body_json(
        app.clone()
            .oneshot(post_chat(
                json!({"messages": [{"role": "user", "content": "one"}]}),
                Some("t0ken"),
            ))
            .await
            .unwrap(),
    )
    .await;
    let chat_id = first["chatId"].as_str().unwrap().to_string();

    let second = app
        .oneshot(post_chat(
            json!({
                "chatId": chat_id,
                "messages": [
                    {"role": "user", "content": "one"},
                    {"role": "assistant", "content": "First."},
                    {"role": "user", "content": "two"}
                ]
            }),
            Some("t0ken"),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["chatId"], chat_id.as_str());

    let messages = store
        .list_messages(chat_id.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3].content, "Second.");
}

#[tokio::test]
async fn model_failure_maps_to_500_with_no_partial_reply() {
    let (app, store) = app_with(ScriptedModel::failing());

    let response = app
        .oneshot(post_chat(
            json!({"messages": [{"role": "user", "content": "hi"}]}),
            Some("t0ken"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to generate AI response");

    // The user message stays persisted for retry; no assistant reply.
    let chats = store.list_chats("alice").await.unwrap();
    let messages = store.list_messages(chats[0].id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hi");
}

#[tokio::test]
async fn chat_listing_routes_are_auth_gated_and_ordered() {
    let (app, _store) = app_with(ScriptedModel::replies(&["ok"]));

    assert_eq!(
        app.clone()
            .oneshot(get("/api/chats", None))
            .await
            .unwrap()
            .status(),
        StatusCode::UNAUTHORIZED
    );

    app.clone()
        .oneshot(post_chat(
            json!({"messages": [{"role": "user", "content": "hello"}]}),
            Some("t0ken"),
        ))
        .await
        .unwrap();

    let chats = body_json(
        app.clone()
            .oneshot(get("/api/chats", Some("t0ken")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(chats.as_array().unwrap().len(), 1);
    let chat_id = chats[0]["id"].as_str().unwrap().to_string();
    assert_eq!(chats[0]["title"], "hello");

    let messages = body_json(
        app.oneshot(get(
            &format!("/api/chats/{chat_id}/messages"),
            Some("t0ken"),
        ))
        .await
        .unwrap(),
    )
    .await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
}
