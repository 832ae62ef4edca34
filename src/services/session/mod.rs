//! 会话服务
//!
//! 提供会话的生命周期管理：创建、查询、上图、重置、删除。
//! 图片校验在任何状态变更之前完成，非图片负载不会触碰会话。

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::sync::Arc;
use tracing::info;

use crate::config::config::ChatConfig;
use crate::error::{AppError, Result};
use crate::models::session::{CalendarImage, Session};
use crate::storage::SessionStore;

/// 会话服务 trait
#[async_trait]
pub trait SessionService: Send + Sync {
    /// 创建会话
    async fn create(&self) -> Result<Session>;

    /// 根据 ID 获取会话
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// 列出会话
    async fn list(&self) -> Result<Vec<Session>>;

    /// 删除会话
    async fn delete(&self, id: &str) -> Result<bool>;

    /// 校验并设置日历图片，成功后追加问候消息
    async fn attach_image(&self, id: &str, data: &str, declared_mime: &str) -> Result<Session>;

    /// 原子重置：清除图片、转写和加载状态
    async fn reset(&self, id: &str) -> Result<Session>;

    /// 会话总数
    async fn count(&self) -> Result<u64>;
}

/// 会话服务实现
pub struct SessionServiceImpl {
    store: Arc<dyn SessionStore>,
    config: ChatConfig,
}

impl SessionServiceImpl {
    /// 创建新的服务实例
    pub fn new(store: Arc<dyn SessionStore>, config: ChatConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl SessionService for SessionServiceImpl {
    async fn create(&self) -> Result<Session> {
        let session = self.store.insert(Session::new());
        info!(session_id = %session.id, "Session created");
        Ok(session)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.store.get(id))
    }

    async fn list(&self) -> Result<Vec<Session>> {
        Ok(self.store.list())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.store.remove(id))
    }

    async fn attach_image(&self, id: &str, data: &str, declared_mime: &str) -> Result<Session> {
        let image = validate_image_payload(data, declared_mime, self.config.max_image_bytes)?;

        let greeting = self.config.greeting.clone();
        self.store.update_with(
            id,
            Box::new(move |session| {
                if session.has_image() {
                    return Err(AppError::Validation(
                        "Session already has a calendar image; reset the session first"
                            .to_string(),
                    ));
                }
                if session.is_busy() {
                    return Err(AppError::Busy);
                }
                session.attach_image(image, &greeting);
                Ok(())
            }),
        )
    }

    async fn reset(&self, id: &str) -> Result<Session> {
        self.store.update_with(
            id,
            Box::new(|session| {
                session.reset();
                Ok(())
            }),
        )
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.store.count() as u64)
    }
}

/// 校验图片负载
///
/// Base64 必须可解码，解码字节必须带有已知图片格式的签名，
/// 大小不超过上限。返回携带嗅探出的 MIME 类型的图片。
pub fn validate_image_payload(
    data: &str,
    declared_mime: &str,
    max_bytes: usize,
) -> Result<CalendarImage> {
    if !declared_mime.is_empty() && !declared_mime.starts_with("image/") {
        return Err(AppError::Validation(format!(
            "Unsupported content type: {}",
            declared_mime
        )));
    }

    // 容忍 data URL 前缀，按裸 base64 存储
    let raw = match data.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };

    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|_| AppError::Validation("Image payload is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Image payload is empty".to_string()));
    }

    if bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "Image too large: {} bytes (limit {})",
            bytes.len(),
            max_bytes
        )));
    }

    let mime = detect_image_mime(&bytes).ok_or_else(|| {
        AppError::Validation("File does not look like a supported image".to_string())
    })?;

    Ok(CalendarImage::new(raw.trim(), mime, bytes.len()))
}

/// 按魔数嗅探图片格式
fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// 创建会话服务
pub fn create_session_service(
    store: Arc<dyn SessionStore>,
    config: ChatConfig,
) -> Box<dyn SessionService> {
    Box::new(SessionServiceImpl::new(store, config))
}
