use async_stream::stream;
use eventsource_stream::{Event, Eventsource};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{
    ports::{CompletionService, FragmentStream},
    DomainError,
};
use crate::infrastructure::config::LlmConfig;

/// Streaming chat completions against an OpenAI-compatible API.
pub struct OpenAiCompletion {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

impl OpenAiCompletion {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }

    pub fn from_config(
        config: &LlmConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .read_timeout(Duration::from_secs(config.read_timeout_seconds))
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            http,
            ..Self::new(&config.base_url, api_key, &config.model)
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: Option<ChunkDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl ApiError {
    fn into_domain(self) -> DomainError {
        match self.kind {
            Some(kind) => DomainError::completion(format!("{kind}: {}", self.message)),
            None => DomainError::completion(self.message),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StreamStep {
    Fragment(String),
    Finish,
    Skip,
}

/// Interprets one server-sent event.
///
/// A chunk with a `finish_reason` ends the stream and its content is dropped;
/// chunks without text are skipped. Error frames and error payloads fail the
/// stream.
fn interpret(event: &Event) -> Result<StreamStep, DomainError> {
    if event.event == "error" {
        return Err(DomainError::completion(format!(
            "stream error event: {}",
            event.data
        )));
    }

    let data = event.data.trim();
    if data == "[DONE]" {
        return Ok(StreamStep::Finish);
    }
    if data.is_empty() {
        return Ok(StreamStep::Skip);
    }

    let chunk: ChatChunk = serde_json::from_str(data)
        .map_err(|e| DomainError::completion(format!("malformed stream chunk: {e}")))?;

    if let Some(error) = chunk.error {
        return Err(error.into_domain());
    }

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(StreamStep::Skip);
    };
    if choice.finish_reason.is_some() {
        return Ok(StreamStep::Finish);
    }

    match choice.delta.and_then(|d| d.content) {
        Some(content) if !content.is_empty() => Ok(StreamStep::Fragment(content)),
        _ => Ok(StreamStep::Skip),
    }
}

impl CompletionService for OpenAiCompletion {
    fn stream(&self, prompt: &str) -> FragmentStream {
        let request = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: &self.system_prompt,
                    },
                    ChatMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                stream: true,
            });

        let fragments = stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(DomainError::completion(e.to_string()));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                yield Err(DomainError::completion(format!("HTTP {status}: {body}")));
                return;
            }

            let mut events = Box::pin(response.bytes_stream().eventsource());
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(DomainError::completion(e.to_string()));
                        return;
                    }
                };

                match interpret(&event) {
                    Ok(StreamStep::Fragment(text)) => yield Ok(text),
                    Ok(StreamStep::Finish) => return,
                    Ok(StreamStep::Skip) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        };

        Box::pin(fragments)
    }
}
