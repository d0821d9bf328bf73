use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::application::{template::render, Modal};
use crate::domain::BackgroundJob;

/// Fields of a slash-command POST that we read; Slack sends more.
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub trigger_id: String,
}

#[derive(Debug, Deserialize)]
pub struct InteractionForm {
    #[serde(default)]
    pub payload: String,
}

#[derive(Debug, Serialize)]
pub struct SlackReply {
    pub response_type: &'static str,
    pub text: String,
}

impl SlackReply {
    pub fn ephemeral(text: impl Into<String>) -> Json<Self> {
        Json(Self {
            response_type: "ephemeral",
            text: text.into(),
        })
    }
}

/// Acknowledges right away; retrieval and generation happen in a detached job.
pub async fn command_handler(
    State(state): State<AppState>,
    Form(command): Form<SlashCommand>,
) -> Json<SlackReply> {
    let texts = &state.config.prompts.slack;

    if command.text.trim().is_empty() {
        return SlackReply::ephemeral(&texts.greeting);
    }

    let job = BackgroundJob::chat_command(&command.channel_id, &command.text);
    match state.dispatcher.dispatch(job).await {
        Ok(()) => {
            tracing::info!(channel_id = %command.channel_id, user_id = %command.user_id, "Question accepted");
            SlackReply::ephemeral(&texts.processing)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to dispatch chat command");
            SlackReply::ephemeral(&texts.dispatch_failed)
        }
    }
}

pub async fn open_append_modal(
    State(state): State<AppState>,
    Form(command): Form<SlashCommand>,
) -> Response {
    let view = Modal::APPEND_TEXT.view(&state.config.prompts.ingestion);

    match state.chat.open_view(&command.trigger_id, view).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to open append modal");
            let text = render(
                &state.config.prompts.slack.modal_failed,
                &[("error", &e.to_string())],
            );
            SlackReply::ephemeral(text).into_response()
        }
    }
}

/// Returns 200 before looking at the payload; validation happens in the job.
pub async fn interaction_handler(
    State(state): State<AppState>,
    Form(form): Form<InteractionForm>,
) -> StatusCode {
    if let Err(e) = state
        .dispatcher
        .dispatch(BackgroundJob::append_text(form.payload))
        .await
    {
        tracing::error!(error = %e, "Failed to dispatch interaction payload");
    }
    StatusCode::OK
}
