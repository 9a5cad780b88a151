//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `course_id`: 课程 ID
/// - `assignment_id`: 作业 ID
/// - `max_concurrent`: 最大并发数
pub fn log_startup(course_id: &str, assignment_id: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🎓 自动批改启动");
    info!("📚 课程: {} | 作业: {}", course_id, assignment_id);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录提交加载信息
pub fn log_submissions_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份提交", total);
    info!("📋 最多同时处理 {} 份", max_concurrent);
}

/// 记录单个学生开始处理
pub fn log_student_start(index: usize, total: usize, name: &str, email: &str) {
    info!("\n{}", "─".repeat(60));
    info!("[{}/{}] ➤ {} ({})", index, total, name, email);
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary_lines`: 报表摘要（每行一条）
/// - `output_dir`: 输出目录
pub fn print_final_stats(summary_lines: &[String], output_dir: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for line in summary_lines {
        info!("{}", line);
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_dir);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("avaliação", 4), "aval...");
    }
}
