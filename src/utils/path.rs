//! 路径工具
//!
//! 生成的引用会嵌入到 HTML 中，所以相对路径一律使用 `/` 分隔

use std::path::{Component, Path, PathBuf};

/// 按词法规整路径，去掉 `.` 并折叠 `..`（不访问文件系统）
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // 根目录之上没有父目录
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// 以 `base` 为起点解析 `path`；`path` 为绝对路径时直接使用
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    normalize(&base.join(path))
}

/// 计算 `to` 相对于 `from` 的路径，结果使用 POSIX 风格分隔符
///
/// # 参数
/// - `from`: 基准目录（绝对路径）
/// - `to`: 目标文件（绝对路径）
///
/// # 返回
/// 两者相同返回空串；根不同（例如 Windows 上的不同盘符）时返回目标的完整路径
pub fn relative_posix(from: &Path, to: &Path) -> String {
    let from = normalize(from);
    let to = normalize(to);

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && (from.has_root() || to.has_root()) {
        return to.to_string_lossy().replace('\\', "/");
    }

    let ups = from_parts[common..].iter().map(|_| "..".to_string());
    let downs = to_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());

    ups.chain(downs).collect::<Vec<_>>().join("/")
}
