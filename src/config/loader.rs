use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索路径：
    /// 1. 开发环境默认值
    /// 2. ./config.toml
    /// 3. 环境变量（ACADICAL_ 前缀，`__` 分隔层级）
    /// 4. GEMINI_API_KEY（凭证的专用回退）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        let figment = Figment::from(Serialized::defaults(AppConfig::development()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ACADICAL_").split("__"));

        let mut config: AppConfig = figment.extract()?;

        // 凭证按原始部署习惯单独从 GEMINI_API_KEY 读取
        if config.gemini.api_key.is_empty() {
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                config.gemini.api_key = key;
            }
        }

        Ok(config)
    }

    /// 验证配置
    ///
    /// 缺少 API 密钥不是启动错误：按约定在首次上游调用时才报配置错误。
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.gemini.model.is_empty() {
            return Err(ConfigValidationError::MissingModel);
        }

        if config.gemini.base_url.is_empty() {
            return Err(ConfigValidationError::MissingBaseUrl);
        }

        if config.chat.max_image_bytes == 0 {
            return Err(ConfigValidationError::InvalidImageLimit);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("上游模型名称未配置")]
    MissingModel,

    #[error("上游 API 基地址未配置")]
    MissingBaseUrl,

    #[error("图片大小上限无效，必须大于 0")]
    InvalidImageLimit,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}
