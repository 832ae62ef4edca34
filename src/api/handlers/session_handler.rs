use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::chat_dto::MessageResponse, dto::session_dto::*},
    error::AppError,
};

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating new session");

    let session = state.session_service.create().await?;
    state.metrics.record_session_created();

    let response = CreateSessionResponse {
        id: session.id,
        created_at: session.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Listing sessions");

    let sessions = state.session_service.list().await?;
    let session_responses: Vec<SessionResponse> =
        sessions.iter().map(SessionResponse::from).collect();
    let total = session_responses.len();

    Ok(Json(SessionListResponse {
        sessions: session_responses,
        total,
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting session: {}", id);

    let session = state
        .session_service
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", id)))?;

    Ok(Json(SessionResponse::from(&session)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Deleting session: {}", id);

    let deleted = state.session_service.delete(&id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Session not found: {}", id)));
    }

    Ok(Json(DeleteSessionResponse {
        id,
        message: "Session deleted successfully".to_string(),
    }))
}

pub async fn attach_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AttachImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Attaching calendar image to session: {}", id);

    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let declared_mime = request.mime_type.unwrap_or_default();
    let session = state
        .session_service
        .attach_image(&id, &request.data, &declared_mime)
        .await?;

    let image = session.image.as_ref().ok_or_else(|| {
        AppError::Internal("Image missing right after attach".to_string())
    })?;
    let greeting = session.messages.first().ok_or_else(|| {
        AppError::Internal("Greeting missing right after attach".to_string())
    })?;

    let response = AttachImageResponse {
        id: session.id.clone(),
        mime_type: image.mime_type.clone(),
        byte_size: image.byte_size,
        greeting: MessageResponse::from(greeting),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Resetting session: {}", id);

    let session = state.session_service.reset(&id).await?;

    Ok(Json(ResetSessionResponse {
        id: session.id.clone(),
        message_count: session.message_count(),
        has_image: session.has_image(),
        loading: format!("{:?}", session.loading),
    }))
}
