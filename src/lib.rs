//! AcadiCal - 学术日历问答服务
//!
//! 用户上传一张学术日历图片，用自然语言提问（考试日期、学期安排、
//! 假期），服务把图片理解完全委托给上游多模态模型，自身只做会话
//! 状态管理、请求编排和呈现。

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
