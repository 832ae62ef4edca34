//! 聊天 DTO
//!
//! 定义提问和转写相关的请求和响应数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::entities::ExtractedEntities;
use crate::models::message::{ChatMessage, MessageRole};

/// 提问请求
///
/// 长度上限由服务层按配置校验，这里只拦空字符串。
#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
pub struct AskQuestionRequest {
    /// 问题文本
    #[validate(length(min = 1, message = "question must not be empty"))]
    pub question: String,
}

impl Default for AskQuestionRequest {
    fn default() -> Self {
        Self {
            question: String::new(),
        }
    }
}

/// 实体集合响应
#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
    /// 日期
    pub dates: Vec<String>,
    /// 学期
    pub semesters: Vec<String>,
    /// 课程
    pub courses: Vec<String>,
    /// 事件
    pub events: Vec<String>,
}

impl From<&ExtractedEntities> for EntitiesResponse {
    fn from(entities: &ExtractedEntities) -> Self {
        Self {
            dates: entities.dates.clone(),
            semesters: entities.semesters.clone(),
            courses: entities.courses.clone(),
            events: entities.events.clone(),
        }
    }
}

/// 消息响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// 消息 ID
    pub id: String,
    /// 角色
    pub role: String,
    /// 文本
    pub text: String,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 实体集合（仅助手消息）
    pub entities: Option<EntitiesResponse>,
    /// 错误标记
    pub is_error: bool,
}

impl From<&ChatMessage> for MessageResponse {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            id: msg.id.clone(),
            role: match msg.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "assistant".to_string(),
            },
            text: msg.text.clone(),
            timestamp: msg.timestamp,
            entities: msg.entities.as_ref().map(EntitiesResponse::from),
            is_error: msg.is_error,
        }
    }
}

/// 提问响应
#[derive(Debug, Serialize)]
pub struct AskQuestionResponse {
    /// 追加的用户消息
    pub user_message: MessageResponse,
    /// 追加的助手消息（失败时带错误标记）
    pub assistant_message: MessageResponse,
}

/// 转写响应
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    /// 会话 ID
    pub session_id: String,
    /// 消息列表（原始顺序）
    pub messages: Vec<MessageResponse>,
    /// 总数
    pub total: usize,
}
