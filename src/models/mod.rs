//! 核心数据模型模块
//!
//! 定义 AcadiCal 的核心数据结构：Session, ChatMessage, ExtractedEntities 等。

pub mod entities;
pub mod message;
pub mod session;

pub use entities::*;
pub use message::*;
pub use session::*;
