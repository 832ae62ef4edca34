use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*},
    error::AppError,
};

/// 提问端点
///
/// 上游失败不是 HTTP 错误：失败被编排层折叠成错误标记的助手消息，
/// 本端点照常返回 200，调用方据 `is_error` 呈现。
pub async fn ask_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Question for session: {}", id);

    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state.chat_service.ask(&id, &request.question).await?;
    state.metrics.record_question(
        outcome.upstream_elapsed_ms,
        outcome.assistant_message.is_error,
    );

    Ok(Json(AskQuestionResponse {
        user_message: MessageResponse::from(&outcome.user_message),
        assistant_message: MessageResponse::from(&outcome.assistant_message),
    }))
}

pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Fetching transcript for session: {}", id);

    let session = state
        .session_service
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", id)))?;

    let messages: Vec<MessageResponse> =
        session.messages.iter().map(MessageResponse::from).collect();
    let total = messages.len();

    Ok(Json(TranscriptResponse {
        session_id: session.id,
        messages,
        total,
    }))
}
