//! zfind - 页内查找引擎
//!
//! 模块结构：
//! - dom: 文档抽象（Document / Layout）与内存实现 ArenaDocument
//! - find: 可中断、分时间片执行的查找与高亮引擎
//! - config: 查找配置
//! - service: 基于 tokio 的异步驱动
//! - error: 宿主侧错误类型

pub mod config;
pub mod dom;
pub mod error;
pub mod find;
pub mod service;

pub use config::FindConfig;
pub use dom::{ArenaDocument, Document, Layout};
pub use error::{FindError, Result};
pub use find::{FindInPage, FindOutcome, SearchState, Selection};
pub use service::{FindMessage, FindService, FindTask};
