//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则 `VERBOSE_LOGGING=true` 时为 debug，默认 info。
/// 重复调用不会报错（测试中会多次调用）
pub fn init() {
    let verbose = std::env::var("VERBOSE_LOGGING")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    init_with_verbose(verbose);
}

/// 按指定的详细程度初始化日志
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `source_dir`: 源目录
/// - `output_dir`: 输出目录
/// - `max_concurrent`: 最大并发改写数
pub fn log_startup(source_dir: &str, output_dir: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 资源引用注入");
    info!("📁 源目录: {}", source_dir);
    info!("📁 输出目录: {}", output_dir);
    info!("📊 最大并发改写数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `written`: 写出的文件数量
/// - `documents`: 注入的文档数量
/// - `output_dir`: 输出目录
pub fn print_final_stats(written: usize, documents: usize, output_dir: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 写出文件: {}", written);
    info!("📝 注入文档: {}", documents);
    info!("{}", "=".repeat(60));
    info!("\n输出已保存至: {}", output_dir);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
