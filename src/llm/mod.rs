//! 上游模型模块
//!
//! 把「看图回答问题」建模为可替换的能力接口，具体的 Gemini
//! 客户端只是其中一个实现，测试时可整体替换。

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::config::GeminiConfig;
use crate::error::Result;
use crate::models::entities::ExtractedEntities;
use crate::models::session::CalendarImage;

pub use gemini::GeminiClient;

/// 上游模型的结构化回答
///
/// 同时是结构化输出 JSON 的反序列化目标：`answer` 必填，
/// `entities` 缺失时落回四个空集合。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarAnswer {
    /// 自然语言回答
    pub answer: String,
    /// 从最新问题中抽取的实体
    #[serde(default)]
    pub entities: ExtractedEntities,
}

/// 日历问答能力接口
///
/// 一次调用对应一次出站请求：给定图片、对话上下文和新问题，
/// 返回结构化回答或错误。不重试，无部分结果。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarModel: Send + Sync {
    /// 基于日历图片回答一个问题
    async fn answer_about_image(
        &self,
        image: &CalendarImage,
        context: &str,
        question: &str,
    ) -> Result<CalendarAnswer>;
}

/// 创建上游模型客户端
pub fn create_calendar_model(config: &GeminiConfig) -> Result<Arc<dyn CalendarModel>> {
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
