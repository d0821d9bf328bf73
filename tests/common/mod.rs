#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use futures::{stream, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use rag_slack::api::{create_router, AppState};
use rag_slack::domain::ports::{
    ChatPlatform, CompletionService, EmbeddingService, FragmentStream, JobDispatcher, VectorStore,
};
use rag_slack::domain::{BackgroundJob, DomainError, EmbeddingModel, MessageRef};
use rag_slack::infrastructure::{
    AppConfig, Components, HashedEmbedding, InMemoryVectorStore, InlineDispatcher,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Post {
        channel: String,
        text: String,
        thread: Option<String>,
    },
    Update {
        ts: String,
        text: String,
    },
    OpenView {
        trigger_id: String,
        callback_id: String,
    },
    DirectMessage {
        user: String,
        text: String,
    },
}

#[derive(Default)]
pub struct RecordingChat {
    calls: Mutex<Vec<ChatCall>>,
    fail_views: bool,
}

impl RecordingChat {
    /// Every `views.open` call fails as if the trigger had expired.
    pub fn failing_views() -> Self {
        Self {
            fail_views: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ChatCall) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    /// Polls until `done` holds for the recorded calls or two seconds pass.
    pub async fn wait_until(&self, done: impl Fn(&[ChatCall]) -> bool) -> Vec<ChatCall> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let calls = self.calls();
            if done(&calls) || tokio::time::Instant::now() >= deadline {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl ChatPlatform for RecordingChat {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<MessageRef, DomainError> {
        let n = self.record(ChatCall::Post {
            channel: channel.to_string(),
            text: text.to_string(),
            thread: thread_ts.map(str::to_string),
        });
        Ok(MessageRef {
            channel: channel.to_string(),
            ts: format!("ts-{n}"),
        })
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), DomainError> {
        self.record(ChatCall::Update {
            ts: message.ts.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn open_view(&self, trigger_id: &str, view: serde_json::Value) -> Result<(), DomainError> {
        if self.fail_views {
            return Err(DomainError::external("views.open: expired_trigger_id"));
        }
        self.record(ChatCall::OpenView {
            trigger_id: trigger_id.to_string(),
            callback_id: view["callback_id"].as_str().unwrap_or_default().to_string(),
        });
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DomainError> {
        self.record(ChatCall::DirectMessage {
            user: user_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

pub struct ScriptedCompletion {
    fragments: Vec<String>,
    hang: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            hang: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model that never answers.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(&[])
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionService for ScriptedCompletion {
    fn stream(&self, prompt: &str) -> FragmentStream {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.hang {
            return stream::pending().boxed();
        }
        stream::iter(self.fragments.clone().into_iter().map(Ok)).boxed()
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    jobs: Mutex<Vec<BackgroundJob>>,
}

impl RecordingDispatcher {
    pub fn jobs(&self) -> Vec<BackgroundJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobDispatcher for RecordingDispatcher {
    async fn dispatch(&self, job: BackgroundJob) -> Result<(), DomainError> {
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

pub struct Harness {
    pub state: AppState,
    pub components: Components,
    pub chat: Arc<RecordingChat>,
    pub completion: Arc<ScriptedCompletion>,
}

pub fn hashed_embedders() -> Vec<(EmbeddingModel, Arc<dyn EmbeddingService>)> {
    EmbeddingModel::ALL
        .into_iter()
        .map(|model| {
            let embedder: Arc<dyn EmbeddingService> =
                Arc::new(HashedEmbedding::new(model.config().dimension));
            (model, embedder)
        })
        .collect()
}

pub struct HarnessBuilder {
    store: Arc<dyn VectorStore>,
    chat: Arc<RecordingChat>,
    completion: Arc<ScriptedCompletion>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryVectorStore::new()),
            chat: Arc::new(RecordingChat::default()),
            completion: Arc::new(ScriptedCompletion::new(&[])),
        }
    }

    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = store;
        self
    }

    pub fn chat(mut self, chat: RecordingChat) -> Self {
        self.chat = Arc::new(chat);
        self
    }

    pub fn completion(mut self, completion: ScriptedCompletion) -> Self {
        self.completion = Arc::new(completion);
        self
    }

    fn components(&self) -> Components {
        Components::assemble(
            &AppConfig::default(),
            self.store.clone(),
            hashed_embedders(),
            self.completion.clone(),
            self.chat.clone(),
        )
    }

    pub fn with_dispatcher(self, dispatcher: Arc<dyn JobDispatcher>) -> Harness {
        let components = self.components();
        Harness {
            state: AppState::new(components.clone(), dispatcher, AppConfig::default()),
            components,
            chat: self.chat,
            completion: self.completion,
        }
    }

    /// Background jobs run for real on the test runtime.
    pub fn inline(self) -> Harness {
        let components = self.components();
        let dispatcher = Arc::new(InlineDispatcher::new(components.runner.clone()));
        Harness {
            state: AppState::new(components.clone(), dispatcher, AppConfig::default()),
            components,
            chat: self.chat,
            completion: self.completion,
        }
    }
}

impl Harness {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        create_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

/// `path?k=v&...` with every value form-encoded.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    format!("{path}?{}", serde_urlencoded::to_string(params).unwrap())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
