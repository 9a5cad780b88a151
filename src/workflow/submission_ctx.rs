//! 提交处理上下文
//!
//! 封装"我正在处理第几份提交、是哪个学生的"这一信息

use std::fmt::Display;
use std::sync::{Arc, OnceLock};

/// 提交处理上下文
///
/// 克隆出来的上下文共享同一个学生姓名槽位，
/// 所以批处理层在超时或任务崩溃后也能拿到已解析的姓名。
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 提交 ID
    pub submission_id: String,

    /// 学生用户 ID（资料获取失败时用作错误记录的键）
    pub user_id: String,

    /// 在本批次中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 本批次提交总数
    pub total: usize,

    student_name: Arc<OnceLock<String>>,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(submission_id: String, user_id: String, index: usize, total: usize) -> Self {
        Self {
            submission_id,
            user_id,
            index,
            total,
            student_name: Arc::new(OnceLock::new()),
        }
    }

    /// 记录已解析的学生姓名（只有第一次生效）
    pub fn set_student_name(&self, name: &str) {
        let _ = self.student_name.set(name.to_string());
    }

    /// 错误记录的键：已解析时是学生姓名，否则是用户 ID
    pub fn ledger_key(&self) -> &str {
        self.student_name
            .get()
            .map(String::as_str)
            .unwrap_or(self.user_id.as_str())
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{} 提交#{} 学生#{}]",
            self.index, self.total, self.submission_id, self.user_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_key_falls_back_to_user_id() {
        let ctx = SubmissionCtx::new("s1".into(), "u1".into(), 1, 1);
        assert_eq!(ctx.ledger_key(), "u1");
    }

    #[test]
    fn test_clones_share_resolved_name() {
        let ctx = SubmissionCtx::new("s1".into(), "u1".into(), 1, 1);
        let task_ctx = ctx.clone();
        task_ctx.set_student_name("Ana");
        task_ctx.set_student_name("Outra");
        assert_eq!(ctx.ledger_key(), "Ana");
    }
}
