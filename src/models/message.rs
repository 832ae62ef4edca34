use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entities::ExtractedEntities;

/// 消息角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// 用户消息
    User,
    /// 助手消息
    Assistant,
}

impl MessageRole {
    /// 上下文串中使用的角色前缀
    pub fn display_name(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// 聊天消息实体
///
/// 会话转写中的一条消息，创建后不可变，只能追加到消息序列。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 消息唯一标识
    pub id: String,

    /// 消息角色
    pub role: MessageRole,

    /// 消息文本
    pub text: String,

    /// 创建时间
    pub timestamp: DateTime<Utc>,

    /// 抽取的实体集合（仅助手消息）
    pub entities: Option<ExtractedEntities>,

    /// 错误标记（上游调用失败时的助手消息）
    pub is_error: bool,
}

impl ChatMessage {
    /// 创建用户消息
    pub fn user(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            text: text.to_string(),
            timestamp: Utc::now(),
            entities: None,
            is_error: false,
        }
    }

    /// 创建助手消息
    pub fn assistant(text: &str, entities: ExtractedEntities) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            text: text.to_string(),
            timestamp: Utc::now(),
            entities: Some(entities),
            is_error: false,
        }
    }

    /// 创建错误标记的助手消息
    pub fn error(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            text: text.to_string(),
            timestamp: Utc::now(),
            entities: None,
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = ChatMessage::user("When is the Sem 4 MSE?");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.text, "When is the Sem 4 MSE?");
        assert!(msg.entities.is_none());
        assert!(!msg.is_error);
    }

    #[test]
    fn test_assistant_message_carries_entities() {
        let entities = ExtractedEntities {
            dates: vec!["May 10".to_string()],
            ..Default::default()
        };
        let msg = ChatMessage::assistant("May 10", entities.clone());
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.entities, Some(entities));
    }

    #[test]
    fn test_error_message() {
        let msg = ChatMessage::error("Please try again.");
        assert!(msg.is_error);
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.entities.is_none());
    }

    #[test]
    fn test_role_display_name() {
        assert_eq!(MessageRole::User.display_name(), "User");
        assert_eq!(MessageRole::Assistant.display_name(), "Assistant");
    }
}
