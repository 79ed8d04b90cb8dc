//! 单次替换工具
//!
//! 只替换第一次出现的标记，标记不存在时原样返回

use std::borrow::Cow;

/// 查找 `needle` 在 `haystack` 中第一次出现的位置
pub fn find_first(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// 将第一次出现的 `marker` 替换为 `replacement`
///
/// # 参数
/// - `contents`: 文档内容
/// - `marker`: 要替换的标记
/// - `replacement`: 替换内容
///
/// # 返回
/// 标记不存在时返回 `Cow::Borrowed`，否则返回替换后的新内容
pub fn replace_first<'a>(contents: &'a [u8], marker: &[u8], replacement: &[u8]) -> Cow<'a, [u8]> {
    match find_first(contents, marker) {
        Some(start) => {
            let end = start + marker.len();
            let mut out =
                Vec::with_capacity(contents.len() - marker.len() + replacement.len());
            out.extend_from_slice(&contents[..start]);
            out.extend_from_slice(replacement);
            out.extend_from_slice(&contents[end..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(contents),
    }
}
