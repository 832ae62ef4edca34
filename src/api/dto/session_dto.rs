//! 会话 DTO
//!
//! 定义会话相关的请求和响应数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::chat_dto::MessageResponse;
use crate::models::session::Session;

/// 上传日历图片请求
#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
pub struct AttachImageRequest {
    /// Base64 编码的图片内容（允许 data URL 前缀）
    #[validate(length(min = 1, message = "image data is required"))]
    pub data: String,
    /// 客户端声明的 MIME 类型
    pub mime_type: Option<String>,
}

impl Default for AttachImageRequest {
    fn default() -> Self {
        Self {
            data: String::new(),
            mime_type: None,
        }
    }
}

/// 图片信息响应
#[derive(Debug, Serialize)]
pub struct ImageInfoResponse {
    /// 嗅探出的 MIME 类型
    pub mime_type: String,
    /// 解码后的字节数
    pub byte_size: usize,
}

/// 会话统计响应
#[derive(Debug, Serialize)]
pub struct SessionStatsResponse {
    /// 提问总数
    pub total_questions: u64,
    /// 上游失败次数
    pub upstream_failures: u64,
}

/// 会话响应
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// 会话 ID
    pub id: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后活跃时间
    pub last_active_at: DateTime<Utc>,
    /// 是否已设置图片
    pub has_image: bool,
    /// 图片信息
    pub image: Option<ImageInfoResponse>,
    /// 加载状态
    pub loading: String,
    /// 消息数量
    pub message_count: usize,
    /// 统计信息
    pub stats: SessionStatsResponse,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            created_at: session.created_at,
            last_active_at: session.last_active_at,
            has_image: session.has_image(),
            image: session.image.as_ref().map(|img| ImageInfoResponse {
                mime_type: img.mime_type.clone(),
                byte_size: img.byte_size,
            }),
            loading: format!("{:?}", session.loading),
            message_count: session.message_count(),
            stats: SessionStatsResponse {
                total_questions: session.stats.total_questions,
                upstream_failures: session.stats.upstream_failures,
            },
        }
    }
}

/// 会话列表响应
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    /// 会话列表
    pub sessions: Vec<SessionResponse>,
    /// 总数
    pub total: usize,
}

/// 创建会话响应
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    /// 会话 ID
    pub id: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 上传图片响应
#[derive(Debug, Serialize)]
pub struct AttachImageResponse {
    /// 会话 ID
    pub id: String,
    /// 嗅探出的 MIME 类型
    pub mime_type: String,
    /// 解码后的字节数
    pub byte_size: usize,
    /// 自动追加的问候消息
    pub greeting: MessageResponse,
}

/// 重置会话响应
#[derive(Debug, Serialize)]
pub struct ResetSessionResponse {
    /// 会话 ID
    pub id: String,
    /// 重置后的消息数量（恒为 0）
    pub message_count: usize,
    /// 重置后是否有图片（恒为 false）
    pub has_image: bool,
    /// 重置后的加载状态
    pub loading: String,
}

/// 删除会话响应
#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    /// 会话 ID
    pub id: String,
    /// 消息
    pub message: String,
}
