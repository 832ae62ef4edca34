//! 聊天服务（请求编排）
//!
//! 一次提问对应至多一次上游调用：锁内完成忙碌守卫和用户消息追加，
//! 锁外等待上游，再回到锁内落盘回答。会话忙碌时不发起任何出站请求。

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

use crate::config::config::ChatConfig;
use crate::error::{AppError, Result};
use crate::llm::{CalendarModel, prompt};
use crate::models::message::ChatMessage;
use crate::storage::SessionStore;

/// 一次提问的结果：追加的用户消息与助手消息
///
/// 上游失败时 `assistant_message` 是错误标记消息，不是 HTTP 错误。
#[derive(Debug, Clone)]
pub struct AskOutcome {
    /// 追加的用户消息
    pub user_message: ChatMessage,
    /// 追加的助手消息（可能带错误标记）
    pub assistant_message: ChatMessage,
    /// 上游调用耗时（毫秒），仅覆盖出站请求本身
    pub upstream_elapsed_ms: u64,
}

/// 聊天服务 trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// 就当前日历图片提出一个问题
    async fn ask(&self, session_id: &str, question: &str) -> Result<AskOutcome>;
}

/// 聊天服务实现
pub struct ChatServiceImpl {
    store: Arc<dyn SessionStore>,
    model: Arc<dyn CalendarModel>,
    config: ChatConfig,
}

impl ChatServiceImpl {
    /// 创建新的服务实例
    pub fn new(
        store: Arc<dyn SessionStore>,
        model: Arc<dyn CalendarModel>,
        config: ChatConfig,
    ) -> Self {
        Self {
            store,
            model,
            config,
        }
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn ask(&self, session_id: &str, question: &str) -> Result<AskOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }
        if question.chars().count() > self.config.max_question_length {
            return Err(AppError::Validation(format!(
                "Question exceeds maximum length of {} characters",
                self.config.max_question_length
            )));
        }

        // 阶段一（锁内）：守卫检查、追加用户消息、进入 Responding。
        // 守卫失败时会话状态不变。
        let session = self.store.update_with(
            session_id,
            Box::new(|session| {
                if !session.has_image() {
                    return Err(AppError::Validation(
                        "No calendar image attached to this session".to_string(),
                    ));
                }
                if session.is_busy() {
                    return Err(AppError::Busy);
                }
                session.begin_question(question);
                Ok(())
            }),
        )?;

        let user_message = session
            .messages
            .last()
            .cloned()
            .ok_or_else(|| AppError::Internal("Transcript empty after appending question".to_string()))?;
        // 与原始行为一致：上下文包含刚追加的用户消息，问题另行单独给出
        let context = prompt::conversation_context(&session.messages);
        let image = session
            .image
            .ok_or_else(|| AppError::Internal("Image vanished between guard and snapshot".to_string()))?;

        // 阶段二（锁外）：唯一的出站调用，运行到成功或失败，不取消不重试。
        // 耗时只覆盖这一次出站请求。
        let started = Instant::now();
        let upstream = self
            .model
            .answer_about_image(&image, &context, question)
            .await;
        let upstream_elapsed_ms = started.elapsed().as_millis() as u64;

        // 阶段三（锁内）：落盘回答或错误标记消息，回到 Idle
        let session = self.store.update_with(
            session_id,
            Box::new(move |session| {
                match upstream {
                    Ok(answer) => {
                        session.complete_question(&answer.answer, answer.entities);
                    }
                    Err(AppError::Config(ref reason)) => {
                        error!(session_id, %reason, "Upstream credential missing");
                        session.fail_question(&self.config.apology);
                    }
                    Err(ref e) => {
                        warn!(session_id, error = %e, "Upstream call failed");
                        session.fail_question(&self.config.apology);
                    }
                }
                Ok(())
            }),
        )?;

        let assistant_message = session
            .messages
            .last()
            .cloned()
            .ok_or_else(|| AppError::Internal("Transcript empty after appending answer".to_string()))?;

        Ok(AskOutcome {
            user_message,
            assistant_message,
            upstream_elapsed_ms,
        })
    }
}

/// 创建聊天服务
pub fn create_chat_service(
    store: Arc<dyn SessionStore>,
    model: Arc<dyn CalendarModel>,
    config: ChatConfig,
) -> Box<dyn ChatService> {
    Box::new(ChatServiceImpl::new(store, model, config))
}
