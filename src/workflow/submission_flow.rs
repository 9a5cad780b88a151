//! 提交处理流程 - 流程层
//!
//! 核心职责：定义"一份提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 获取学生资料
//! 2. 提取附件文本
//! 3. LLM 评分 → 保存反馈文件
//! 4. 写回成绩（仅限本开发者创建的作业）→ 退回
//! 5. 发送邮件
//! 6. errors.md（兜底）

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::AppError;
use crate::infrastructure::OutputLayout;
use crate::models::{Course, CourseWork, FeedbackResult, Submission, UserProfile};
use crate::ports::{Evaluator, LearningService, Notifier};
use crate::report::StudentRow;
use crate::services::error_ledger::{NO_ATTACHMENT_MESSAGE, USER_NOT_FOUND_MESSAGE};
use crate::services::{AttachmentExtractor, ErrorLedger};
use crate::utils::logging::log_student_start;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 提交的最终状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 已评分，成绩已写回
    Graded,
    /// 已评分，但成绩没有写回
    GradedNoWriteback(String),
    /// 跳过（没有可评分的内容）
    Skipped(String),
    /// 处理失败
    Errored(String),
}

/// 提交处理结果
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub outcome: SubmissionOutcome,
    /// 拿到成绩时才有
    pub row: Option<StudentRow>,
}

impl ProcessResult {
    fn graded(outcome: SubmissionOutcome, row: StudentRow) -> Self {
        Self {
            outcome,
            row: Some(row),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            outcome: SubmissionOutcome::Skipped(reason.into()),
            row: None,
        }
    }

    pub fn errored(reason: impl Into<String>) -> Self {
        Self {
            outcome: SubmissionOutcome::Errored(reason.into()),
            row: None,
        }
    }
}

/// 流程开关
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowOptions {
    /// 写回时同时写入最终成绩并退回提交
    pub return_grades: bool,
}

/// 提交处理流程
///
/// - 编排单份提交的完整处理流程
/// - 决定何时评分、何时写回、何时兜底
/// - 所有错误都在这里落地，不会向批处理层抛出
pub struct SubmissionFlow {
    learning: Arc<dyn LearningService>,
    evaluator: Arc<dyn Evaluator>,
    notifier: Option<Arc<dyn Notifier>>,
    extractor: Arc<AttachmentExtractor>,
    ledger: Arc<ErrorLedger>,
    layout: OutputLayout,
    course: Course,
    course_work: CourseWork,
    criteria: String,
    options: FlowOptions,
}

impl SubmissionFlow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        learning: Arc<dyn LearningService>,
        evaluator: Arc<dyn Evaluator>,
        notifier: Option<Arc<dyn Notifier>>,
        extractor: Arc<AttachmentExtractor>,
        ledger: Arc<ErrorLedger>,
        layout: OutputLayout,
        course: Course,
        course_work: CourseWork,
        criteria: String,
        options: FlowOptions,
    ) -> Self {
        Self {
            learning,
            evaluator,
            notifier,
            extractor,
            ledger,
            layout,
            course,
            course_work,
            criteria,
            options,
        }
    }

    pub fn ledger(&self) -> &ErrorLedger {
        &self.ledger
    }

    pub async fn run(&self, submission: &Submission, ctx: &SubmissionCtx) -> ProcessResult {
        // ========== 步骤 1: 获取学生资料 ==========
        let student = match self.learning.get_user_profile(&submission.user_id).await {
            Ok(profile) => profile,
            Err(source) => {
                let err = AppError::UserResolution {
                    user_id: submission.user_id.clone(),
                    source,
                };
                warn!("{} ⚠️ {}", ctx, err);
                self.record(&submission.user_id, USER_NOT_FOUND_MESSAGE).await;
                return ProcessResult::errored(err.to_string());
            }
        };

        ctx.set_student_name(&student.full_name);
        log_student_start(ctx.index, ctx.total, &student.full_name, &student.email);

        // ========== 步骤 2: 提取附件 ==========
        let Some(attachments) = submission.attachments() else {
            warn!("{} ⚠️ {}", ctx, AppError::MissingAttachment);
            self.record(&student.full_name, NO_ATTACHMENT_MESSAGE).await;
            return ProcessResult::skipped(AppError::MissingAttachment.to_string());
        };

        let context = match self.extractor.extract_all(attachments).await {
            Ok(context) => context,
            Err(e) => {
                error!("{} ❌ {}", ctx, e);
                self.record(&student.full_name, &format!("Erro: {}", e)).await;
                return ProcessResult::errored(e.to_string());
            }
        };

        // ========== 步骤 3: 评分 ==========
        info!("🤖 生成反馈...");
        let result = match self
            .evaluator
            .evaluate(&context, &self.criteria, &student.full_name)
            .await
        {
            Ok(result) => result,
            Err(source) => {
                let err = AppError::Evaluation(source);
                error!("{} ❌ {}", ctx, err);
                self.record(&student.full_name, &evaluation_error_text(&err))
                    .await;
                return ProcessResult::errored(err.to_string());
            }
        };
        info!("反馈已生成: {}，成绩 {}", student.full_name, result.grade);

        self.save_feedback(&student, &result.feedback).await;

        // ========== 步骤 4: 写回成绩 ==========
        let outcome = match self.write_back(submission, &result).await {
            None => SubmissionOutcome::Graded,
            Some(reason) => SubmissionOutcome::GradedNoWriteback(reason),
        };

        // ========== 步骤 5: 发送邮件 ==========
        self.notify(&student, &result).await;

        ProcessResult::graded(outcome, StudentRow::new(&student, submission, result.grade))
    }

    /// 写入错误记录；记录本身失败时只写日志
    pub async fn record(&self, student: &str, message: &str) {
        if let Err(e) = self.ledger.record(student, message).await {
            error!("无法写入错误记录 ({}): {}", student, e);
        }
    }

    async fn save_feedback(&self, student: &UserProfile, feedback: &str) {
        let path = self.layout.feedback_path(&student.id, &student.full_name);
        match tokio::fs::write(&path, feedback).await {
            Ok(()) => info!("💾 反馈已保存: {}", path.display()),
            Err(e) => error!("{}", AppError::io(&path, e)),
        }
    }

    /// 写回成绩；返回 `Some(原因)` 表示成绩没有写回
    async fn write_back(&self, submission: &Submission, result: &FeedbackResult) -> Option<String> {
        if !submission.associated_with_developer {
            warn!("⚠️ 作业不是由当前项目创建，无法写回成绩");
            return Some("作业不是由当前项目创建".to_string());
        }

        info!("✏️ 写回成绩 {}", result.grade);
        let assigned = self.options.return_grades.then_some(result.grade);
        if let Err(source) = self
            .learning
            .patch_grade(
                &submission.course_id,
                &submission.course_work_id,
                &submission.id,
                result.grade,
                assigned,
            )
            .await
        {
            let err = AppError::GradeWrite {
                submission_id: submission.id.clone(),
                source,
            };
            error!("❌ {}", err);
            return Some(err.to_string());
        }

        if self.options.return_grades {
            match self
                .learning
                .return_submission(
                    &submission.course_id,
                    &submission.course_work_id,
                    &submission.id,
                )
                .await
            {
                Ok(()) => info!("↩️ 提交已退回"),
                Err(source) => error!(
                    "❌ {}",
                    AppError::ReturnSubmission {
                        submission_id: submission.id.clone(),
                        source,
                    }
                ),
            }
        }

        None
    }

    async fn notify(&self, student: &UserProfile, result: &FeedbackResult) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if student.email.is_empty() {
            warn!("⚠️ {} 没有邮箱地址，跳过邮件", student.full_name);
            return;
        }

        if let Err(source) = notifier
            .send(&student.email, result, &self.course, &self.course_work)
            .await
        {
            let err = AppError::EmailDelivery {
                address: student.email.clone(),
                source,
            };
            error!("❌ {}", err);
            self.record(&student.full_name, &format!("Erro: {}", err))
                .await;
        }
    }
}

fn evaluation_error_text(err: &AppError) -> String {
    format!(
        "# Erro na Avaliação\n\nNão foi possível gerar o feedback automaticamente.\nErro: {}",
        err
    )
}
