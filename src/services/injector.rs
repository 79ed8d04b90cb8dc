//! 注入器 - 业务能力层
//!
//! ## 职责
//!
//! 输入结束后，对所有缓冲文档并发执行标记替换：
//!
//! 1. 每个文档一个任务，任务之间只共享只读的引用标签
//! 2. 使用 Semaphore 限制同时改写的文档数量
//! 3. 按完成顺序收集结果（不保证与输入顺序一致）
//! 4. 第一个失败立即返回，其余任务全部取消

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tracing::{debug, error};

use crate::config::InjectOptions;
use crate::error::RewriteError;
use crate::models::file_record::FileRecord;
use crate::models::session::InjectionMarkup;
use crate::services::rewriter::Rewrite;

/// 排空阶段的并发与超时限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteLimits {
    /// 同时改写的文档数量上限（至少为 1）
    pub max_concurrent: usize,
    /// 单个文档的改写超时
    ///
    /// 超时只让本次运行失败；改写在阻塞线程上执行，无法中断，
    /// 卡住的改写会一直占用该线程，运行时关闭时仍需等它返回
    pub timeout: Option<Duration>,
}

impl From<&InjectOptions> for RewriteLimits {
    fn from(options: &InjectOptions) -> Self {
        Self {
            max_concurrent: options.max_concurrent_rewrites.max(1),
            timeout: options.rewrite_timeout_ms.map(Duration::from_millis),
        }
    }
}

impl Default for RewriteLimits {
    fn default() -> Self {
        Self::from(&InjectOptions::default())
    }
}

/// 提前返回时取消所有尚未完成的任务
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// 并发改写所有缓冲文档
///
/// # 参数
/// - `documents`: 缓冲的文档
/// - `markup`: 最终的引用标签
/// - `rewriter`: 改写器
/// - `limits`: 并发与超时限制
///
/// # 返回
/// 全部成功时按完成顺序返回改写后的文档；任一失败返回该错误
pub async fn inject_all<R: Rewrite>(
    documents: Vec<FileRecord>,
    markup: Arc<InjectionMarkup>,
    rewriter: Arc<R>,
    limits: RewriteLimits,
) -> Result<Vec<FileRecord>, RewriteError> {
    let total = documents.len();
    let semaphore = Arc::new(Semaphore::new(limits.max_concurrent.max(1)));
    let mut pending = FuturesUnordered::new();
    let mut handles = Vec::with_capacity(total);

    for (idx, document) in documents.into_iter().enumerate() {
        let doc_index = idx + 1;
        let path = document.path.display().to_string();
        let handle = tokio::spawn(rewrite_document(
            document,
            markup.clone(),
            rewriter.clone(),
            semaphore.clone(),
            limits.timeout,
        ));
        handles.push(handle.abort_handle());
        pending.push(async move { (doc_index, path, handle.await) });
    }

    let _guard = AbortOnDrop(handles);
    let mut rewritten = Vec::with_capacity(total);

    while let Some((doc_index, path, joined)) = pending.next().await {
        match joined {
            Ok(Ok(document)) => {
                debug!("[文档 {}] ✓ 注入完成: {}", doc_index, path);
                rewritten.push(document);
            }
            Ok(Err(e)) => {
                error!("[文档 {}] ❌ 注入失败: {}", doc_index, e);
                return Err(e);
            }
            Err(source) => {
                error!("[文档 {}] ❌ 任务执行失败: {}", doc_index, source);
                return Err(RewriteError::Aborted { path, source });
            }
        }
    }

    Ok(rewritten)
}

/// 改写单个文档
async fn rewrite_document<R: Rewrite>(
    document: FileRecord,
    markup: Arc<InjectionMarkup>,
    rewriter: Arc<R>,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
) -> Result<FileRecord, RewriteError> {
    let path = document.path.display().to_string();
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| RewriteError::failed(&path, e.to_string()))?;

    let work = tokio::task::spawn_blocking(move || {
        let rewritten = rewriter.rewrite(&document, &markup);
        (document, rewritten)
    });

    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .map_err(|_| RewriteError::Timeout {
                path: path.clone(),
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })?,
        None => work.await,
    };

    let (mut document, rewritten) = joined.map_err(|source| RewriteError::Aborted {
        path: path.clone(),
        source,
    })?;

    document.contents = Some(rewritten?);
    Ok(document)
}
