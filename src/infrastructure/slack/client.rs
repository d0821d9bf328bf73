use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ports::ChatPlatform, DomainError, MessageRef};

/// Minimal Slack Web API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UpdateMessage<'a> {
    channel: &'a str,
    ts: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenView<'a> {
    trigger_id: &'a str,
    view: serde_json::Value,
}

/// Slack answers HTTP 200 for most failures and reports them in `ok`/`error`.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
}

impl SlackClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn call<T: Serialize>(&self, method: &str, body: &T) -> Result<ApiResponse, DomainError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), method);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::external(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::external(format!("{method}: HTTP {status}")));
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| DomainError::external(format!("{method}: {e}")))?;

        if !api.ok {
            let reason = api.error.as_deref().unwrap_or("unknown_error");
            return Err(DomainError::external(format!("{method}: {reason}")));
        }
        Ok(api)
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<MessageRef, DomainError> {
        let api = self
            .call(
                "chat.postMessage",
                &PostMessage {
                    channel,
                    text,
                    thread_ts,
                },
            )
            .await?;

        let ts = api
            .ts
            .ok_or_else(|| DomainError::external("chat.postMessage: response has no ts"))?;
        Ok(MessageRef {
            channel: api.channel.unwrap_or_else(|| channel.to_string()),
            ts,
        })
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), DomainError> {
        self.call(
            "chat.update",
            &UpdateMessage {
                channel: &message.channel,
                ts: &message.ts,
                text,
            },
        )
        .await
        .map(|_| ())
    }

    async fn open_view(&self, trigger_id: &str, view: serde_json::Value) -> Result<(), DomainError> {
        self.call("views.open", &OpenView { trigger_id, view })
            .await
            .map(|_| ())
    }

    async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DomainError> {
        // Posting to a user id delivers to the bot's DM with that user.
        self.post_message(user_id, text, None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_message_in_thread() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-test"))
            .and(body_json(json!({ "channel": "C1", "text": "hi", "thread_ts": "111.222" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true, "channel": "C1", "ts": "333.444" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = SlackClient::new(server.uri(), "xoxb-test");
        let message = client.post_message("C1", "hi", Some("111.222")).await.unwrap();

        assert_eq!(
            message,
            MessageRef {
                channel: "C1".into(),
                ts: "333.444".into()
            }
        );
    }

    #[tokio::test]
    async fn test_direct_message_resolves_dm_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_json(json!({ "channel": "U9", "text": "saved" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": true, "channel": "D9", "ts": "1.0" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = SlackClient::new(server.uri(), "t");
        client.send_direct_message("U9", "saved").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.update"))
            .and(body_json(json!({ "channel": "C1", "ts": "1.2", "text": "done" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SlackClient::new(server.uri(), "t");
        let message = MessageRef {
            channel: "C1".into(),
            ts: "1.2".into(),
        };
        client.update_message(&message, "done").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/views.open"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "expired_trigger_id" })),
            )
            .mount(&server)
            .await;

        let client = SlackClient::new(server.uri(), "t");
        let err = client.open_view("trig", json!({})).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::ExternalService(ref msg) if msg == "views.open: expired_trigger_id"
        ));
    }

    #[tokio::test]
    async fn test_http_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = SlackClient::new(server.uri(), "t");
        let err = client.post_message("C1", "x", None).await.unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
    }
}
