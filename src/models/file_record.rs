//! 文件记录
//!
//! 流水线中流动的单个资源：路径 + 已加载到内存的内容

use std::path::{Path, PathBuf};

/// 资源类型，由扩展名推导（区分大小写）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.html` 文档，需要注入
    Html,
    /// `.js` 脚本
    Js,
    /// `.css` 样式表
    Css,
    /// 其他文件，直接放行
    Other,
}

impl FileKind {
    /// 根据路径的扩展名判断类型
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("html") => FileKind::Html,
            Some("js") => FileKind::Js,
            Some("css") => FileKind::Css,
            _ => FileKind::Other,
        }
    }
}

/// 文件记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// 文件路径（通常为绝对路径）
    pub path: PathBuf,
    /// 文件内容，`None` 表示空记录（没有内容）
    pub contents: Option<Vec<u8>>,
}

impl FileRecord {
    /// 创建带内容的记录
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Some(contents.into()),
        }
    }

    /// 创建没有内容的空记录
    pub fn null(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: None,
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_path(&self.path)
    }

    /// 没有内容或内容长度为 0
    pub fn is_empty(&self) -> bool {
        self.contents.as_ref().map_or(true, |c| c.is_empty())
    }

    /// 内容按 UTF-8 读取（有损），空记录返回空串
    pub fn contents_lossy(&self) -> String {
        self.contents
            .as_deref()
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .unwrap_or_default()
    }

    /// 用于日志显示的文件名
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}
