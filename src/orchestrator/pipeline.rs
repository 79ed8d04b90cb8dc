//! 注入流水线 - 编排层
//!
//! ## 职责
//!
//! 管理一次运行的完整生命周期：
//!
//! ```text
//! Idle ──(第一条记录)──▶ Collecting ──(输入结束)──▶ Draining ──▶ Completed
//!   │                                                   └──────▶ Failed
//!   └──────────────(空输入)──────────────────────────────▶ Draining
//! ```
//!
//! - `Collecting`：逐条调用收集器，放行的记录立即传给下游
//! - `Draining`：只运行一次注入器，成功后输出全部文档
//! - 进入 `Draining` 之后不再接收记录

use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::InjectOptions;
use crate::error::{InjectError, InjectResult, PLUGIN_NAME};
use crate::models::file_record::FileRecord;
use crate::models::session::Session;
use crate::services::collector::{classify, Action};
use crate::services::injector::{inject_all, RewriteLimits};
use crate::services::rewriter::{MarkerRewriter, Rewrite};

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Collecting,
    Draining,
    Completed,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "Idle",
            RunState::Collecting => "Collecting",
            RunState::Draining => "Draining",
            RunState::Completed => "Completed",
            RunState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// 运行统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// 收到的记录数
    pub received: usize,
    /// 直接放行的记录数
    pub passed_through: usize,
    /// 收集到的脚本引用数
    pub scripts: usize,
    /// 收集到的样式表引用数
    pub styles: usize,
    /// 注入后输出的文档数
    pub injected: usize,
}

/// 注入流水线
///
/// 一个实例对应一次运行，会话状态只属于这个实例
pub struct InjectPipeline<R: Rewrite = MarkerRewriter> {
    session: Option<Session>,
    state: RunState,
    rewriter: Arc<R>,
    limits: RewriteLimits,
    stats: RunStats,
}

impl InjectPipeline<MarkerRewriter> {
    /// 使用默认改写器创建流水线，基准目录默认取当前工作目录
    pub fn new(options: &InjectOptions) -> InjectResult<Self> {
        Self::with_rewriter(options, MarkerRewriter)
    }
}

impl<R: Rewrite> InjectPipeline<R> {
    /// 使用自定义改写器创建流水线
    pub fn with_rewriter(options: &InjectOptions, rewriter: R) -> InjectResult<Self> {
        let session = Session::new(options)?;
        Ok(Self::from_session(session, options, rewriter))
    }

    /// 使用已创建的会话
    pub fn from_session(session: Session, options: &InjectOptions, rewriter: R) -> Self {
        debug!("基准目录: {}", session.base_dir.display());
        Self {
            session: Some(session),
            state: RunState::Idle,
            rewriter: Arc::new(rewriter),
            limits: RewriteLimits::from(options),
            stats: RunStats::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// 接收一条记录
    ///
    /// # 返回
    /// 需要立即传给下游的记录；文档被缓冲时返回 `None`
    pub fn push(&mut self, record: FileRecord) -> InjectResult<Option<FileRecord>> {
        let session = match (self.state, self.session.as_mut()) {
            (RunState::Idle | RunState::Collecting, Some(session)) => session,
            _ => {
                return Err(InjectError::InvalidState {
                    state: self.state,
                    action: "接收新记录",
                })
            }
        };

        self.state = RunState::Collecting;
        self.stats.received += 1;

        let scripts_before = session.script_refs.len();
        let styles_before = session.style_refs.len();

        let action = classify(record, session);

        if session.script_refs.len() > scripts_before {
            self.stats.scripts += 1;
        }
        if session.style_refs.len() > styles_before {
            self.stats.styles += 1;
        }

        match action {
            Action::PassThrough(record) => {
                self.stats.passed_through += 1;
                Ok(Some(record))
            }
            Action::Buffered => Ok(None),
        }
    }

    /// 输入结束，注入所有缓冲文档
    ///
    /// 只能调用一次；失败时状态变为 `Failed`，不返回任何文档
    pub async fn finish(&mut self) -> InjectResult<Vec<FileRecord>> {
        let session = match (self.state, self.session.take()) {
            (RunState::Idle | RunState::Collecting, Some(session)) => session,
            (state, session) => {
                self.session = session;
                return Err(InjectError::InvalidState {
                    state,
                    action: "再次排空",
                });
            }
        };

        self.state = RunState::Draining;
        let (documents, markup) = session.into_parts();
        info!("📦 输入结束，开始注入 {} 个文档", documents.len());

        match inject_all(documents, markup, self.rewriter.clone(), self.limits).await {
            Ok(rewritten) => {
                self.stats.injected = rewritten.len();
                self.state = RunState::Completed;
                Ok(rewritten)
            }
            Err(e) => {
                self.state = RunState::Failed;
                error!("[{}] ❌ 注入失败，运行终止: {}", PLUGIN_NAME, e);
                Err(InjectError::Inject(e))
            }
        }
    }

    /// 驱动整个输入流
    ///
    /// 放行的记录边收边发，文档在输入结束后统一输出
    pub async fn run<S>(
        mut self,
        input: S,
        output: mpsc::Sender<FileRecord>,
    ) -> InjectResult<RunStats>
    where
        S: Stream<Item = FileRecord>,
    {
        futures::pin_mut!(input);

        while let Some(record) = input.next().await {
            if let Some(forward) = self.push(record)? {
                output
                    .send(forward)
                    .await
                    .map_err(|_| InjectError::DownstreamClosed)?;
            }
        }

        for document in self.finish().await? {
            output
                .send(document)
                .await
                .map_err(|_| InjectError::DownstreamClosed)?;
        }

        log_run_complete(&self.stats);
        Ok(self.stats)
    }

    /// 处理一批记录，返回所有输出（放行的记录在前，注入的文档在后）
    pub async fn run_batch<I>(mut self, records: I) -> InjectResult<Vec<FileRecord>>
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let mut emitted = Vec::new();
        for record in records {
            emitted.extend(self.push(record)?);
        }
        emitted.extend(self.finish().await?);

        log_run_complete(&self.stats);
        Ok(emitted)
    }
}

fn log_run_complete(stats: &RunStats) {
    info!(
        "✓ 注入完成: 记录 {}, 放行 {}, 脚本 {}, 样式表 {}, 文档 {}",
        stats.received, stats.passed_through, stats.scripts, stats.styles, stats.injected
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewriteError;
    use crate::models::file_record::FileKind;
    use crate::models::session::InjectionMarkup;

    fn pipeline() -> InjectPipeline {
        let options = InjectOptions::default();
        let session = Session::with_working_dir(&options, "/work");
        InjectPipeline::from_session(session, &options, MarkerRewriter)
    }

    struct AlwaysFails;

    impl Rewrite for AlwaysFails {
        fn rewrite(
            &self,
            document: &FileRecord,
            _: &InjectionMarkup,
        ) -> Result<Vec<u8>, RewriteError> {
            Err(RewriteError::failed(document.path.display().to_string(), "坏掉了"))
        }
    }

    #[tokio::test]
    async fn test_state_transitions_on_success() {
        let mut pipeline = pipeline();
        assert_eq!(pipeline.state(), RunState::Idle);

        let forwarded = pipeline.push(FileRecord::new("/work/a.js", "x")).unwrap();
        assert!(forwarded.is_some());
        assert_eq!(pipeline.state(), RunState::Collecting);

        let buffered = pipeline
            .push(FileRecord::new("/work/index.html", "<!-- inject:js -->"))
            .unwrap();
        assert!(buffered.is_none());

        let docs = pipeline.finish().await.unwrap();
        assert_eq!(pipeline.state(), RunState::Completed);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].contents_lossy(), r#"<script src="a.js"></script>"#);

        let stats = pipeline.stats();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.passed_through, 1);
        assert_eq!(stats.scripts, 1);
        assert_eq!(stats.injected, 1);
    }

    #[tokio::test]
    async fn test_empty_input_completes() {
        let mut pipeline = pipeline();
        let docs = pipeline.finish().await.unwrap();
        assert!(docs.is_empty());
        assert_eq!(pipeline.state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_no_records_after_draining() {
        let mut pipeline = pipeline();
        pipeline.finish().await.unwrap();

        let err = pipeline
            .push(FileRecord::new("/work/late.js", "x"))
            .unwrap_err();
        assert!(matches!(
            err,
            InjectError::InvalidState {
                state: RunState::Completed,
                ..
            }
        ));
        assert!(pipeline.finish().await.is_err());
        assert_eq!(pipeline.state(), RunState::Completed);
    }

    #[tokio::test]
    async fn test_failure_moves_to_failed() {
        let options = InjectOptions::default();
        let session = Session::with_working_dir(&options, "/work");
        let mut pipeline = InjectPipeline::from_session(session, &options, AlwaysFails);

        pipeline
            .push(FileRecord::new("/work/index.html", "<!-- inject:js -->"))
            .unwrap();
        let err = pipeline.finish().await.unwrap_err();
        assert!(err.to_string().starts_with("[simple-inject]"));
        assert!(err.to_string().contains("坏掉了"));
        assert_eq!(pipeline.state(), RunState::Failed);

        assert!(pipeline.push(FileRecord::new("/work/b.js", "x")).is_err());
    }

    #[tokio::test]
    async fn test_run_streams_pass_through_before_documents() {
        let records = vec![
            FileRecord::new("/work/index.html", "<!-- inject:css -->"),
            FileRecord::new("/work/site.css", "body{}"),
            FileRecord::new("/work/logo.png", vec![1u8, 2, 3]),
        ];
        let (tx, mut rx) = mpsc::channel(8);

        let stats = pipeline()
            .run(futures::stream::iter(records), tx)
            .await
            .unwrap();

        let mut out = Vec::new();
        while let Some(record) = rx.recv().await {
            out.push(record);
        }

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].display_name(), "site.css");
        assert_eq!(out[1].display_name(), "logo.png");
        assert_eq!(out[2].display_name(), "index.html");
        assert_eq!(
            out[2].contents_lossy(),
            r#"<link rel="stylesheet" type="text/css" href="site.css" />"#
        );
        assert_eq!(stats.styles, 1);
        assert_eq!(stats.injected, 1);
    }

    #[tokio::test]
    async fn test_run_failure_emits_no_documents() {
        let options = InjectOptions::default();
        let session = Session::with_working_dir(&options, "/work");
        let pipeline = InjectPipeline::from_session(session, &options, AlwaysFails);

        let records = vec![
            FileRecord::new("/work/index.html", "<!-- inject:js -->"),
            FileRecord::new("/work/app.js", "x"),
            FileRecord::new("/work/about.html", "<!-- inject:js -->"),
        ];
        let (tx, mut rx) = mpsc::channel(8);

        let err = pipeline
            .run(futures::stream::iter(records), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, InjectError::Inject(RewriteError::Failed { .. })));
        assert!(err.to_string().starts_with("[simple-inject]"));

        let mut out = Vec::new();
        while let Some(record) = rx.recv().await {
            out.push(record);
        }
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_name(), "app.js");
        assert!(out.iter().all(|r| r.kind() != FileKind::Html));
    }

    #[tokio::test]
    async fn test_run_reports_closed_downstream() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let err = pipeline()
            .run(futures::stream::iter(vec![FileRecord::new("/work/a.js", "x")]), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, InjectError::DownstreamClosed));
    }
}
