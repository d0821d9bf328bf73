use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::api::routes::error_status;
use crate::api::state::AppState;
use crate::domain::{EmbeddingModel, QueryHit};

#[derive(Debug, Deserialize)]
pub struct AskParams {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub model_name: EmbeddingModel,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub result: Vec<QueryHit>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn query_handler(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Json<QueryResponse>, StatusCode> {
    let result = state
        .rag
        .query(
            params.model_name,
            &params.question,
            state.config.config.rag.answer_limit,
        )
        .await
        .map_err(error_status)?;

    Ok(Json(QueryResponse { result }))
}

pub async fn ask_handler(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Response, StatusCode> {
    let fragments = state
        .answer
        .answer(&params.question, params.model_name)
        .await
        .map_err(error_status)?
        .inspect_err(|e| tracing::error!(error = %e, "Completion stream failed"));

    Ok((
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(fragments),
    )
        .into_response())
}

pub async fn upsert_handler(
    State(state): State<AppState>,
    Json(texts): Json<Vec<String>>,
) -> Result<Json<MessageResponse>, StatusCode> {
    state.rag.index_all(&texts).await.map_err(error_status)?;

    Ok(Json(MessageResponse {
        message: "Collection upserted successfully".into(),
    }))
}
