//! 单次运行的会话状态
//!
//! 每次流水线运行创建一个新的 Session，运行结束后丢弃，不跨运行复用

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::InjectOptions;
use crate::error::{InjectError, InjectResult};
use crate::models::file_record::FileRecord;
use crate::utils::path::{normalize, resolve};

/// 注入时使用的最终引用标签
///
/// 排空阶段由所有改写任务共享，只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionMarkup {
    /// 拼接好的 `<script>` 标签
    pub scripts: String,
    /// 拼接好的 `<link>` 标签
    pub styles: String,
}

/// 会话状态
#[derive(Debug)]
pub struct Session {
    /// 计算相对路径的基准目录（绝对路径）
    pub base_dir: PathBuf,
    /// 运行开始时的工作目录，用于解析相对的记录路径
    pub working_dir: PathBuf,
    /// 等待注入的文档，按到达顺序
    pub buffered: Vec<FileRecord>,
    /// 累积的脚本引用
    pub script_refs: String,
    /// 累积的样式表引用
    pub style_refs: String,
}

impl Session {
    /// 以当前进程工作目录为默认基准创建会话
    pub fn new(options: &InjectOptions) -> InjectResult<Self> {
        let working_dir = std::env::current_dir().map_err(|e| InjectError::BaseDir {
            path: options.base_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            source: e,
        })?;
        Ok(Self::with_working_dir(options, working_dir))
    }

    /// 使用指定的工作目录创建会话
    ///
    /// `options.base_dir` 为相对路径时相对于 `working_dir` 解析
    pub fn with_working_dir(options: &InjectOptions, working_dir: impl AsRef<Path>) -> Self {
        let working_dir = normalize(working_dir.as_ref());
        let base_dir = match &options.base_dir {
            Some(dir) => resolve(&working_dir, dir),
            None => working_dir.clone(),
        };

        Self {
            base_dir,
            working_dir,
            buffered: Vec::new(),
            script_refs: String::new(),
            style_refs: String::new(),
        }
    }

    /// 取出缓冲的文档和最终标签，会话随之结束
    pub fn into_parts(self) -> (Vec<FileRecord>, Arc<InjectionMarkup>) {
        let markup = InjectionMarkup {
            scripts: self.script_refs,
            styles: self.style_refs,
        };
        (self.buffered, Arc::new(markup))
    }
}
