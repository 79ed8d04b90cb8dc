//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 充当流水线宿主：
//!
//! 1. **加载**：把源目录中的文件读入内存（`Vec<FileRecord>`）
//! 2. **驱动**：以流的方式把记录交给 `InjectPipeline`
//! 3. **写出**：后台任务把下游收到的每条记录写到输出目录
//! 4. **统计**：输出最终统计信息
//!
//! 注入核心不做任何磁盘 I/O，读写都在这里完成

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{Config, InjectOptions};
use crate::models::file_record::{FileKind, FileRecord};
use crate::models::loaders::{load_records, write_record};
use crate::orchestrator::pipeline::InjectPipeline;
use crate::utils::path::resolve;
use crate::utils::logging::{log_startup, print_final_stats, truncate_text};

/// 下游通道容量
const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// 应用主结构
pub struct App {
    config: Config,
    options: InjectOptions,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let options = config.inject_options().await?;

        log_startup(
            &config.source_dir,
            &config.output_dir,
            options.max_concurrent_rewrites,
        );

        Ok(Self { config, options })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let source_dir = Path::new(&self.config.source_dir);

        info!("\n📁 正在扫描待处理的文件...");
        let records = load_records(source_dir).await?;

        if records.is_empty() {
            warn!("⚠️ 没有找到待处理的文件，程序结束");
            return Ok(());
        }

        let source_root = tokio::fs::canonicalize(source_dir)
            .await
            .with_context(|| format!("无法解析源目录: {}", source_dir.display()))?;
        let output_root = PathBuf::from(&self.config.output_dir);

        let options = self.canonical_options().await?;
        let pipeline = InjectPipeline::new(&options)?;
        let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);

        let writer = tokio::spawn(write_outputs(
            rx,
            source_root,
            output_root,
            self.config.verbose_logging,
        ));

        let outcome = pipeline.run(futures::stream::iter(records), tx).await;
        let written = writer.await.context("写出任务执行失败")??;
        let stats = outcome.context("注入流水线运行失败")?;

        print_final_stats(written, stats.injected, &self.config.output_dir);

        Ok(())
    }

    /// 解析基准目录中的符号链接
    ///
    /// 记录路径在加载时已经规范化，基准目录必须用同样的方式处理，
    /// 否则生成的引用会先跳出基准目录再绕回来
    async fn canonical_options(&self) -> Result<InjectOptions> {
        let working_dir = std::env::current_dir().context("无法获取当前工作目录")?;
        let base_dir = match &self.options.base_dir {
            Some(dir) => resolve(&working_dir, dir),
            None => working_dir,
        };

        let mut options = self.options.clone();
        match tokio::fs::canonicalize(&base_dir).await {
            Ok(canonical) => options.base_dir = Some(canonical),
            Err(e) => {
                warn!("⚠️ 无法规范化基准目录 {}: {}", base_dir.display(), e);
                options.base_dir = Some(base_dir);
            }
        }
        Ok(options)
    }
}

/// 把下游收到的记录逐条写到输出目录
async fn write_outputs(
    mut rx: mpsc::Receiver<FileRecord>,
    source_root: PathBuf,
    output_root: PathBuf,
    verbose: bool,
) -> Result<usize> {
    let mut written = 0;

    while let Some(record) = rx.recv().await {
        let target = write_record(&source_root, &output_root, &record).await?;
        written += 1;
        debug!("写出: {}", target.display());

        if verbose && record.kind() == FileKind::Html {
            info!(
                "📝 {}: {}",
                record.display_name(),
                truncate_text(&record.contents_lossy(), 120)
            );
        }
    }

    Ok(written)
}
