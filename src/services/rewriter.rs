//! 文档改写器
//!
//! 把标记替换为最终引用标签。抽象成 trait，方便替换改写方式

use crate::error::RewriteError;
use crate::models::file_record::FileRecord;
use crate::models::session::InjectionMarkup;
use crate::utils::replace::replace_first;

/// 脚本标记
pub const JS_MARKER: &str = "<!-- inject:js -->";
/// 样式表标记
pub const CSS_MARKER: &str = "<!-- inject:css -->";

/// 改写能力
///
/// 每个文档在独立任务中调用，实现不能依赖其他文档
pub trait Rewrite: Send + Sync + 'static {
    /// 返回改写后的完整内容
    fn rewrite(
        &self,
        document: &FileRecord,
        markup: &InjectionMarkup,
    ) -> Result<Vec<u8>, RewriteError>;
}

/// 默认改写器：各标记只替换第一次出现
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerRewriter;

impl Rewrite for MarkerRewriter {
    fn rewrite(
        &self,
        document: &FileRecord,
        markup: &InjectionMarkup,
    ) -> Result<Vec<u8>, RewriteError> {
        let contents = document.contents.as_deref().unwrap_or_default();
        let with_js = replace_first(contents, JS_MARKER.as_bytes(), markup.scripts.as_bytes());
        let with_css = replace_first(&with_js, CSS_MARKER.as_bytes(), markup.styles.as_bytes());
        Ok(with_css.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<head><!-- inject:css --></head><body><!-- inject:js --></body>";

    fn markup() -> InjectionMarkup {
        InjectionMarkup {
            scripts: r#"<script src="a.js"></script>"#.to_string(),
            styles: r#"<link rel="stylesheet" type="text/css" href="a.css" />"#.to_string(),
        }
    }

    #[test]
    fn test_rewrite_replaces_both_markers() {
        let doc = FileRecord::new("/work/index.html", PAGE);
        let out = MarkerRewriter.rewrite(&doc, &markup()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<head><link rel="stylesheet" type="text/css" href="a.css" /></head><body><script src="a.js"></script></body>"#
        );
    }

    #[test]
    fn test_rewrite_with_empty_markup_removes_markers() {
        let doc = FileRecord::new("/work/index.html", PAGE);
        let out = MarkerRewriter
            .rewrite(&doc, &InjectionMarkup::default())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<head></head><body></body>");
    }

    #[test]
    fn test_rewrite_only_first_marker_of_each_kind() {
        let doc = FileRecord::new(
            "/work/index.html",
            "<!-- inject:js --><!-- inject:js --><!-- inject:css --><!-- inject:css -->",
        );
        let out = String::from_utf8(MarkerRewriter.rewrite(&doc, &markup()).unwrap()).unwrap();
        assert_eq!(out.matches(JS_MARKER).count(), 1);
        assert_eq!(out.matches(CSS_MARKER).count(), 1);
        assert!(out.starts_with(r#"<script src="a.js"></script><!-- inject:js -->"#));
    }

    #[test]
    fn test_rewrite_without_markers_is_identity() {
        let doc = FileRecord::new("/work/index.html", "<html><body></body></html>");
        let out = MarkerRewriter.rewrite(&doc, &markup()).unwrap();
        assert_eq!(out, b"<html><body></body></html>".to_vec());
    }
}
