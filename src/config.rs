use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// 默认的最大并发改写数
pub const DEFAULT_MAX_CONCURRENT_REWRITES: usize = 64;

/// 注入选项（一次流水线运行的配置）
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InjectOptions {
    /// 计算引用路径的基准目录，默认为运行开始时的工作目录
    #[serde(alias = "cwd")]
    pub base_dir: Option<PathBuf>,
    /// 排空阶段同时改写的文档数量上限
    pub max_concurrent_rewrites: usize,
    /// 单个文档改写超时（毫秒），`None` 表示不限制
    pub rewrite_timeout_ms: Option<u64>,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            max_concurrent_rewrites: DEFAULT_MAX_CONCURRENT_REWRITES,
            rewrite_timeout_ms: None,
        }
    }
}

impl InjectOptions {
    /// 指定基准目录
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: InjectOptions = toml::from_str(content).context("无法解析注入配置")?;
        Ok(options)
    }

    /// 从 TOML 文件加载
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("配置文件无效: {}", path.display()))
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 待处理文件所在目录
    pub source_dir: String,
    /// 输出目录
    pub output_dir: String,
    /// 基准目录（覆盖配置文件中的 base_dir）
    pub base_dir: Option<String>,
    /// 注入配置文件路径
    pub options_file: Option<String>,
    /// 最大并发改写数（覆盖配置文件）
    pub max_concurrent_rewrites: Option<usize>,
    /// 单个文档改写超时（覆盖配置文件）
    pub rewrite_timeout_ms: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            output_dir: "dist".to_string(),
            base_dir: None,
            options_file: None,
            max_concurrent_rewrites: None,
            rewrite_timeout_ms: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            source_dir: std::env::var("INJECT_SOURCE_DIR").unwrap_or(default.source_dir),
            output_dir: std::env::var("INJECT_OUTPUT_DIR").unwrap_or(default.output_dir),
            base_dir: std::env::var("INJECT_CWD").ok().or(default.base_dir),
            options_file: std::env::var("INJECT_CONFIG").ok().or(default.options_file),
            max_concurrent_rewrites: std::env::var("MAX_CONCURRENT_REWRITES").ok().and_then(|v| v.parse().ok()).or(default.max_concurrent_rewrites),
            rewrite_timeout_ms: std::env::var("REWRITE_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).or(default.rewrite_timeout_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 合并配置文件与环境变量，得到本次运行的注入选项
    pub async fn inject_options(&self) -> Result<InjectOptions> {
        let mut options = match &self.options_file {
            Some(path) => InjectOptions::load(Path::new(path)).await?,
            None => InjectOptions::default(),
        };

        if let Some(dir) = &self.base_dir {
            options.base_dir = Some(PathBuf::from(dir));
        }
        if let Some(limit) = self.max_concurrent_rewrites {
            options.max_concurrent_rewrites = limit;
        }
        if let Some(timeout) = self.rewrite_timeout_ms {
            options.rewrite_timeout_ms = Some(timeout);
        }

        Ok(options)
    }
}
