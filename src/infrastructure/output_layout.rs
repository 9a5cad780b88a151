//! 输出目录布局
//!
//! 一次运行的所有产物都在 `{output_root}/{course_id}/{assignment_id}/` 下

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::utils::sanitize_string;

pub const LEDGER_FILE: &str = "errors.md";
pub const CRITERIA_FILE: &str = "criteria.md";
pub const REPORT_FILE: &str = "report.xlsx";
pub const DOWNLOADS_DIR: &str = "downloads";

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 创建输出目录和下载缓存目录
    pub async fn ensure(&self) -> AppResult<()> {
        let downloads = self.downloads_dir();
        tokio::fs::create_dir_all(&downloads)
            .await
            .map_err(|e| AppError::io(&downloads, e))
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join(DOWNLOADS_DIR)
    }

    /// 学生反馈文件：`{id}_{清理后的姓名}_feedback.md`
    pub fn feedback_path(&self, user_id: &str, full_name: &str) -> PathBuf {
        self.root
            .join(format!("{}_{}_feedback.md", user_id, sanitize_string(full_name)))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn criteria_path(&self) -> PathBuf {
        self.root.join(CRITERIA_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }
}
