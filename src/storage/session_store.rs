//! 会话存储
//!
//! 仓储 trait 与内存实现的拆分。`update_with` 在锁内执行闭包并
//! 返回更新后的副本，是忙碌守卫和原子重置的唯一互斥边界。

use dashmap::DashMap;

use crate::error::{AppError, Result};
use crate::models::session::Session;

/// 锁内更新闭包
pub type UpdateFn<'a> = Box<dyn FnOnce(&mut Session) -> Result<()> + 'a>;

/// 会话存储 trait
pub trait SessionStore: Send + Sync {
    /// 写入新会话，返回写入的副本
    fn insert(&self, session: Session) -> Session;

    /// 按 ID 读取会话副本
    fn get(&self, id: &str) -> Option<Session>;

    /// 在锁内更新会话，返回更新后的副本
    ///
    /// 闭包返回 Err 时不产生副本，调用方需保证守卫检查在
    /// 任何变更之前完成。
    fn update_with(&self, id: &str, f: UpdateFn<'_>) -> Result<Session>;

    /// 删除会话
    fn remove(&self, id: &str) -> bool;

    /// 列出所有会话副本
    fn list(&self) -> Vec<Session>;

    /// 会话总数
    fn count(&self) -> usize;

    /// 已设置图片的会话数
    fn active_count(&self) -> usize;
}

/// 基于 DashMap 的内存会话存储
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) -> Session {
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    fn update_with(&self, id: &str, f: UpdateFn<'_>) -> Result<Session> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", id)))?;
        f(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn list(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> =
            self.sessions.iter().map(|e| e.value().clone()).collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    fn count(&self) -> usize {
        self.sessions.len()
    }

    fn active_count(&self) -> usize {
        self.sessions.iter().filter(|e| e.has_image()).count()
    }
}

/// 创建内存会话存储
pub fn create_session_store() -> std::sync::Arc<dyn SessionStore> {
    std::sync::Arc::new(InMemorySessionStore::new())
}
