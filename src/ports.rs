//! 外部协作方接口
//!
//! 课堂服务、文件存储、LLM 评分、评分标准生成、邮件发送都通过这里的 trait 注入，
//! 核心流程不依赖任何具体实现，测试时可以直接替换为内存实现。

use async_trait::async_trait;

use crate::models::{Course, CourseWork, FeedbackResult, Submission, UserProfile};

/// 协作方调用的通用错误
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

pub type PortResult<T> = Result<T, PortError>;

/// 课堂服务（课程、作业、提交、用户）
#[async_trait]
pub trait LearningService: Send + Sync {
    async fn get_course(&self, course_id: &str) -> PortResult<Course>;

    async fn get_course_work(&self, course_id: &str, course_work_id: &str) -> PortResult<CourseWork>;

    async fn list_submissions(&self, course_id: &str, course_work_id: &str) -> PortResult<Vec<Submission>>;

    /// 写入草稿成绩；`assigned_grade` 为 `Some` 时同时写入最终成绩
    async fn patch_grade(
        &self,
        course_id: &str,
        course_work_id: &str,
        submission_id: &str,
        draft_grade: f64,
        assigned_grade: Option<f64>,
    ) -> PortResult<()>;

    async fn return_submission(
        &self,
        course_id: &str,
        course_work_id: &str,
        submission_id: &str,
    ) -> PortResult<()>;

    async fn get_user_profile(&self, user_id: &str) -> PortResult<UserProfile>;
}

/// 文件存储服务
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn download(&self, file_id: &str) -> PortResult<Vec<u8>>;
}

/// 根据提交内容和评分标准生成反馈与成绩
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, context: &str, criteria: &str, student_name: &str) -> PortResult<FeedbackResult>;
}

/// 根据作业描述生成评分标准
#[async_trait]
pub trait RubricGenerator: Send + Sync {
    async fn generate(&self, context: &str) -> PortResult<String>;
}

/// 反馈通知（邮件）
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        address: &str,
        feedback: &FeedbackResult,
        course: &Course,
        course_work: &CourseWork,
    ) -> PortResult<()>;
}
