//! 错误记录服务 - 业务能力层
//!
//! 只负责"写 errors.md"能力，不关心流程

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 文件首次创建时写入的标题
pub const LEDGER_HEADER: &str = "# Log de Erros\n\n";

/// 提交中没有可评分的附件
pub const NO_ATTACHMENT_MESSAGE: &str = "Nenhum arquivo encontrado";

/// 无法解析学生资料
pub const USER_NOT_FOUND_MESSAGE: &str = "Usuário não encontrado";

/// 错误记录服务
///
/// 职责：
/// - 将单个学生的失败原因追加到 errors.md
/// - 并发的 worker 共用一个实例，每条记录完整写入，不会交错
/// - 统计本次运行写入的条数
pub struct ErrorLedger {
    path: PathBuf,
    /// 本次运行写入的条数
    entries: Mutex<usize>,
}

impl ErrorLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条记录
    ///
    /// # 参数
    /// - `student`: 学生姓名（资料获取失败时为用户 ID）
    /// - `message`: 错误描述
    pub async fn record(&self, student: &str, message: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AppError::io(&self.path, e))?;

        let is_new = file
            .metadata()
            .await
            .map(|m| m.len() == 0)
            .map_err(|e| AppError::io(&self.path, e))?;

        let mut text = String::new();
        if is_new {
            text.push_str(LEDGER_HEADER);
        }
        text.push_str(&format!("\n## Aluno: {}\n{}\n", student, message));

        file.write_all(text.as_bytes())
            .await
            .map_err(|e| AppError::io(&self.path, e))?;
        file.flush().await.map_err(|e| AppError::io(&self.path, e))?;

        *entries += 1;
        debug!("已记录错误: {} (本次第 {} 条)", student, *entries);
        Ok(())
    }

    /// 本次运行写入的条数
    pub async fn entries(&self) -> usize {
        *self.entries.lock().await
    }
}
