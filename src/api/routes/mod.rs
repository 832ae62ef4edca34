//! Routes 模块

pub mod chat_routes;
pub mod session_routes;
