use std::path::PathBuf;

use thiserror::Error;

use crate::orchestrator::pipeline::RunState;

/// 插件标识，所有汇总错误都以它作为前缀
pub const PLUGIN_NAME: &str = "simple-inject";

/// 单个文档改写错误
#[derive(Debug, Error)]
pub enum RewriteError {
    /// 改写器返回失败
    #[error("文档 {path} 改写失败: {reason}")]
    Failed { path: String, reason: String },

    /// 改写超时
    #[error("文档 {path} 改写超时 ({timeout_ms} ms)")]
    Timeout { path: String, timeout_ms: u64 },

    /// 改写任务 panic 或被取消
    #[error("文档 {path} 改写任务异常终止: {source}")]
    Aborted {
        path: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl RewriteError {
    /// 创建改写失败错误
    pub fn failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RewriteError::Failed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// 注入流水线错误
#[derive(Debug, Error)]
pub enum InjectError {
    /// 排空阶段的汇总错误，只会上报第一个失败
    #[error("[simple-inject] 注入引用标签失败: {0}")]
    Inject(#[source] RewriteError),

    /// 当前状态不允许该操作
    #[error("[simple-inject] 流水线处于 {state} 状态，无法{action}")]
    InvalidState {
        state: RunState,
        action: &'static str,
    },

    /// 无法确定基准目录
    #[error("[simple-inject] 无法解析基准目录 {}: {source}", .path.display())]
    BaseDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 下游已关闭，记录无法继续传递
    #[error("[simple-inject] 下游通道已关闭")]
    DownstreamClosed,
}

impl From<RewriteError> for InjectError {
    fn from(err: RewriteError) -> Self {
        InjectError::Inject(err)
    }
}

/// 注入流水线结果类型
pub type InjectResult<T> = Result<T, InjectError>;
