use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::entities::ExtractedEntities;
use crate::models::message::ChatMessage;

/// 加载状态
///
/// 观测上只在 Idle 和 Responding 之间切换，Analyzing 为原始类型
/// 保留的占位值，busy 判定统一为「非 Idle」。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoadingState {
    /// 空闲，可接受新提问
    Idle,
    /// 正在分析图片
    Analyzing,
    /// 正在等待上游回答
    Responding,
}

impl Default for LoadingState {
    fn default() -> Self {
        LoadingState::Idle
    }
}

/// 日历图片
///
/// 每个会话至多一张，上传后不再变更，重置时整体清除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarImage {
    /// Base64 编码的图片内容
    pub data: String,
    /// MIME 类型（如 image/png）
    pub mime_type: String,
    /// 解码后的字节数
    pub byte_size: usize,
}

impl CalendarImage {
    /// 创建新图片
    pub fn new(data: &str, mime_type: &str, byte_size: usize) -> Self {
        Self {
            data: data.to_string(),
            mime_type: mime_type.to_string(),
            byte_size,
        }
    }
}

/// 会话统计信息
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionStats {
    /// 提问总数
    pub total_questions: u64,
    /// 上游失败次数
    pub upstream_failures: u64,
}

/// 会话实体
///
/// 承载一张日历图片与其对话转写，所有状态迁移都表达为
/// 与 HTTP 层无关的纯方法，消息序列只增不减。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// 会话唯一标识
    pub id: String,

    /// 会话创建时间
    pub created_at: DateTime<Utc>,

    /// 最后活跃时间
    pub last_active_at: DateTime<Utc>,

    /// 日历图片
    pub image: Option<CalendarImage>,

    /// 消息序列（追加式）
    pub messages: Vec<ChatMessage>,

    /// 加载状态
    pub loading: LoadingState,

    /// 统计信息
    pub stats: SessionStats,
}

impl Session {
    /// 创建新会话
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            last_active_at: now,
            image: None,
            messages: Vec::new(),
            loading: LoadingState::Idle,
            stats: SessionStats::default(),
        }
    }

    /// 更新最后活跃时间
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// 是否已设置图片
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// 是否忙碌（有在途请求）
    pub fn is_busy(&self) -> bool {
        self.loading != LoadingState::Idle
    }

    /// 设置日历图片并追加问候消息
    ///
    /// 替换之前的转写，问候消息携带四个空实体集合。
    pub fn attach_image(&mut self, image: CalendarImage, greeting: &str) {
        self.image = Some(image);
        self.messages = vec![ChatMessage::assistant(greeting, ExtractedEntities::empty())];
        self.loading = LoadingState::Idle;
        self.touch();
    }

    /// 开始一次提问：追加用户消息并进入 Responding
    ///
    /// 调用方负责先检查 `is_busy` 和 `has_image`。
    pub fn begin_question(&mut self, text: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::user(text));
        self.loading = LoadingState::Responding;
        self.stats.total_questions += 1;
        self.touch();
        self.messages.last().unwrap()
    }

    /// 结束提问：追加助手回答并回到 Idle
    pub fn complete_question(&mut self, answer: &str, entities: ExtractedEntities) -> &ChatMessage {
        self.messages.push(ChatMessage::assistant(answer, entities));
        self.loading = LoadingState::Idle;
        self.touch();
        self.messages.last().unwrap()
    }

    /// 提问失败：追加错误标记消息并回到 Idle
    pub fn fail_question(&mut self, apology: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::error(apology));
        self.loading = LoadingState::Idle;
        self.stats.upstream_failures += 1;
        self.touch();
        self.messages.last().unwrap()
    }

    /// 原子重置：清除图片、转写和加载状态
    pub fn reset(&mut self) {
        self.image = None;
        self.messages.clear();
        self.loading = LoadingState::Idle;
        self.touch();
    }

    /// 消息数量
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
