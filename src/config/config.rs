use serde::{Deserialize, Serialize};

/// 默认的上图问候语，与实体芯片约定保持一致
pub const DEFAULT_GREETING: &str = "I have analyzed the calendar. I can help you find dates, \
exam schedules for specific semesters (e.g., Sem 2, 4, 6, 8), and holiday lists. \
What would you like to know?";

/// 上游失败时的固定致歉文案
pub const DEFAULT_APOLOGY: &str =
    "I'm sorry, I encountered an error while analyzing the calendar. Please try again.";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 请求超时（秒）
    pub request_timeout: u64,
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

/// 上游 Gemini 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeminiConfig {
    /// API 密钥（缺失时首个上游调用会返回配置错误）
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// API 基地址
    pub base_url: String,
    /// 上游请求超时（秒）
    pub timeout: u64,
    /// 采样温度
    pub temperature: Option<f32>,
}

/// 聊天会话配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatConfig {
    /// 问题文本长度上限（字符）
    pub max_question_length: usize,
    /// 图片解码后字节数上限
    pub max_image_bytes: usize,
    /// 上图后的问候语
    pub greeting: String,
    /// 上游失败时的致歉文案
    pub apology: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 上游模型配置
    pub gemini: GeminiConfig,
    /// 聊天会话配置
    pub chat: ChatConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
                request_timeout: 30,
                max_request_size: 10 * 1024 * 1024,
            },
            gemini: GeminiConfig {
                api_key: String::new(),
                model: "gemini-2.5-flash".into(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
                timeout: 60,
                temperature: None,
            },
            chat: ChatConfig {
                max_question_length: 2000,
                max_image_bytes: 8 * 1024 * 1024,
                greeting: DEFAULT_GREETING.into(),
                apology: DEFAULT_APOLOGY.into(),
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
            },
            app_name: "acadical".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config
    }
}
