//! Chat Routes
//!
//! 定义提问和转写相关的 API 路由。

use crate::api::handlers::chat_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建聊天路由器
pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/sessions/:session_id/messages", post(ask_question))
        .route("/sessions/:session_id/messages", get(get_transcript))
}
