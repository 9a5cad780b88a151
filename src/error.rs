use std::time::Duration;

use crate::config::ConfigError;
use crate::ports::PortError;

/// 应用程序错误类型
///
/// 单条提交内的错误（用户、附件、下载、解码、评分、写回、退回、邮件）只影响当前提交；
/// 列出提交、获取作业、评分标准这三类错误会中止整个批次。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 无法解析学生资料
    #[error("无法获取用户资料 ({user_id}): {source}")]
    UserResolution {
        user_id: String,
        #[source]
        source: PortError,
    },

    /// 提交中没有附件
    #[error("提交中没有附件")]
    MissingAttachment,

    /// 下载文件失败
    #[error("下载文件失败 ({file_id}): {source}")]
    Download {
        file_id: String,
        #[source]
        source: PortError,
    },

    /// 文件内容解码失败
    #[error("无法解析文件内容 ({title}): {reason}")]
    ContentDecode { title: String, reason: String },

    /// 评分服务调用失败
    #[error("生成反馈失败: {0}")]
    Evaluation(#[source] PortError),

    /// 评分标准生成失败
    #[error("生成评分标准失败: {0}")]
    RubricGeneration(#[source] PortError),

    /// 成绩写回失败
    #[error("写回成绩失败 (提交: {submission_id}): {source}")]
    GradeWrite {
        submission_id: String,
        #[source]
        source: PortError,
    },

    /// 退回提交失败
    #[error("退回提交失败 (提交: {submission_id}): {source}")]
    ReturnSubmission {
        submission_id: String,
        #[source]
        source: PortError,
    },

    /// 邮件发送失败
    #[error("发送邮件失败 ({address}): {source}")]
    EmailDelivery {
        address: String,
        #[source]
        source: PortError,
    },

    /// 获取提交列表失败
    #[error("获取提交列表失败: {0}")]
    ListSubmissions(#[source] PortError),

    /// 获取课程或作业失败
    #[error("获取作业信息失败: {0}")]
    AssignmentLookup(#[source] PortError),

    /// 指定的评分标准文件无法读取
    #[error("无法读取评分标准文件 ({path}): {source}")]
    CriteriaFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 文件操作错误
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 报表导出失败
    #[error("导出报表失败: {0}")]
    Report(String),

    /// 处理超时
    #[error("处理超时 ({0:?})")]
    Timeout(Duration),

    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

impl AppError {
    /// 是否应中止整个批次
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            AppError::ListSubmissions(_)
                | AppError::AssignmentLookup(_)
                | AppError::RubricGeneration(_)
                | AppError::CriteriaFile { .. }
                | AppError::Config(_)
        )
    }

    /// 创建文件操作错误
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Report(err.to_string())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_fatal_classification() {
        assert!(AppError::ListSubmissions(PortError::Unauthorized).is_batch_fatal());
        assert!(AppError::RubricGeneration(PortError::Unexpected("x".into())).is_batch_fatal());
        assert!(!AppError::MissingAttachment.is_batch_fatal());
        assert!(!AppError::Evaluation(PortError::Unexpected("x".into())).is_batch_fatal());
        assert!(!AppError::GradeWrite {
            submission_id: "s1".into(),
            source: PortError::Unauthorized,
        }
        .is_batch_fatal());
    }

    #[test]
    fn test_display_keeps_source_detail() {
        let err = AppError::Download {
            file_id: "F1".into(),
            source: PortError::NotFound("F1".into()),
        };
        let text = err.to_string();
        assert!(text.contains("F1"));
        assert!(text.contains("Item not found"));
    }

    #[test]
    fn test_timeout_keeps_sub_second_precision() {
        let err = AppError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "处理超时 (200ms)");
    }
}
