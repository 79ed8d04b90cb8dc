//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `pipeline` - 注入流水线
//! - 持有单次运行的会话状态
//! - 维护 Idle → Collecting → Draining → Completed / Failed 状态机
//! - 收集阶段逐条调用收集器，放行记录立即下发
//! - 输入结束后只运行一次注入器
//!
//! ### `app` - 宿主应用
//! - 从源目录加载文件记录
//! - 驱动流水线并把输出写到输出目录
//! - 输出统计信息
//!
//! ## 层次关系
//!
//! ```text
//! app (文件读写 + 驱动)
//!     ↓
//! pipeline (处理 Stream<FileRecord>)
//!     ↓
//! services (能力层：collector / injector / rewriter)
//!     ↓
//! models + utils (会话、记录、路径、替换)
//! ```

pub mod app;
pub mod pipeline;

// 重新导出主要类型
pub use app::App;
pub use pipeline::{InjectPipeline, RunState, RunStats};
