//! 服务模块

pub mod chat;
pub mod session;

pub use chat::{AskOutcome, ChatService, create_chat_service};
pub use session::{SessionService, create_session_service};
