//! 收集器 - 业务能力层
//!
//! 只负责"对单条记录分类并更新会话"，不关心流水线状态

use tracing::debug;

use crate::models::file_record::{FileKind, FileRecord};
use crate::models::session::Session;
use crate::utils::path::{relative_posix, resolve};

/// 分类结果
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// 立即原样传给下游
    PassThrough(FileRecord),
    /// 已放入会话缓冲区，排空阶段再输出
    Buffered,
}

/// 生成脚本引用标签
pub fn script_tag(relative_path: &str) -> String {
    format!(r#"<script src="{}"></script>"#, relative_path)
}

/// 生成样式表引用标签
pub fn style_tag(relative_path: &str) -> String {
    format!(
        r#"<link rel="stylesheet" type="text/css" href="{}" />"#,
        relative_path
    )
}

/// 对单条记录分类
///
/// - 空记录（无内容或长度为 0）一律放行，即使是 `.html`
/// - `.html` 放入缓冲区
/// - `.js` / `.css` 追加引用标签后放行
/// - 其他文件直接放行
///
/// 引用按到达顺序追加，不去重
pub fn classify(record: FileRecord, session: &mut Session) -> Action {
    if record.is_empty() {
        debug!("空记录，直接放行: {}", record.path.display());
        return Action::PassThrough(record);
    }

    match record.kind() {
        FileKind::Html => {
            debug!("缓冲文档: {}", record.path.display());
            session.buffered.push(record);
            Action::Buffered
        }
        FileKind::Js => {
            let relative = relative_to_base(&record, session);
            debug!("收集脚本引用: {}", relative);
            session.script_refs.push_str(&script_tag(&relative));
            Action::PassThrough(record)
        }
        FileKind::Css => {
            let relative = relative_to_base(&record, session);
            debug!("收集样式表引用: {}", relative);
            session.style_refs.push_str(&style_tag(&relative));
            Action::PassThrough(record)
        }
        FileKind::Other => Action::PassThrough(record),
    }
}

/// 记录路径相对于基准目录的 POSIX 路径
fn relative_to_base(record: &FileRecord, session: &Session) -> String {
    let absolute = resolve(&session.working_dir, &record.path);
    relative_posix(&session.base_dir, &absolute)
}
