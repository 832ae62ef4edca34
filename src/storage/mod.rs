//! 存储模块
//!
//! 会话为纯内存数据，进程重启即清空（按约定不做持久化）。

pub mod session_store;

pub use session_store::{InMemorySessionStore, SessionStore, create_session_store};
