//! # Simple Inject
//!
//! 构建流水线中的资源引用注入器：收集脚本和样式表引用，
//! 在输入结束后把 HTML 文档中的占位标记替换为引用标签
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 文件记录 `FileRecord`、单次运行的会话 `Session`
//! - `models/loaders` - 宿主使用的磁盘读写，核心不依赖它
//!
//! ### ② 业务能力层（Services）
//! - `collector` - 对单条记录分类，累积引用
//! - `injector` - 并发改写所有缓冲文档
//! - `rewriter` - 标记替换能力（`Rewrite` trait）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 单次运行的状态机
//! - `orchestrator/app` - 宿主应用
//!
//! ## 标记
//!
//! - `<!-- inject:js -->` 替换为 `<script src="PATH"></script>`
//! - `<!-- inject:css -->` 替换为 `<link rel="stylesheet" type="text/css" href="PATH" />`
//!
//! `PATH` 是资源相对于基准目录的路径，始终使用 `/` 分隔

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::{Config, InjectOptions};
pub use error::{InjectError, InjectResult, RewriteError, PLUGIN_NAME};
pub use models::{FileKind, FileRecord, InjectionMarkup, Session};
pub use orchestrator::{App, InjectPipeline, RunState, RunStats};
pub use services::{MarkerRewriter, Rewrite, CSS_MARKER, JS_MARKER};
