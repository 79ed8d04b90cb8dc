use crate::models::file_record::FileRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// 递归加载目录下的所有文件，同一目录内按文件名排序
///
/// 返回的记录路径为绝对路径；空文件得到长度为 0 的记录
pub async fn load_records(folder_path: &Path) -> Result<Vec<FileRecord>> {
    if !folder_path.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path.display());
    }

    let root = fs::canonicalize(folder_path)
        .await
        .with_context(|| format!("无法解析文件夹路径: {}", folder_path.display()))?;

    let files = tokio::task::spawn_blocking(move || collect_files(&root))
        .await
        .context("目录扫描任务执行失败")??;

    let mut records = Vec::with_capacity(files.len());
    for path in files {
        let contents = fs::read(&path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;
        tracing::debug!("正在加载: {} ({} 字节)", path.display(), contents.len());
        records.push(FileRecord::new(path, contents));
    }

    tracing::info!("成功加载 {} 个文件", records.len());
    Ok(records)
}

/// 遍历目录树，只收集普通文件
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("无法读取文件夹: {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// 将一条输出记录写入输出目录
///
/// 路径相对于 `source_root` 保持不变；不在源目录下的记录只保留文件名
pub async fn write_record(
    source_root: &Path,
    output_root: &Path,
    record: &FileRecord,
) -> Result<PathBuf> {
    let relative = record
        .path
        .strip_prefix(source_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(record.path.file_name().unwrap_or_default()));
    let target = output_root.join(relative);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("无法创建目录: {}", parent.display()))?;
    }

    fs::write(&target, record.contents.as_deref().unwrap_or_default())
        .await
        .with_context(|| format!("无法写入文件: {}", target.display()))?;

    Ok(target)
}
