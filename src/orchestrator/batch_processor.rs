//! 批量提交处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **加载提交**：列出作业下的全部提交，失败时中止批次
//! 2. **并发控制**：使用 Semaphore 限制同时处理的提交数量
//! 3. **超时控制**：单份提交超时只影响自己
//! 4. **全局统计**：汇总成绩行和错误条数
//!
//! 单份提交的细节全部委托给 `SubmissionFlow`。

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::error::{AppError, AppResult};
use crate::ports::LearningService;
use crate::report::PipelineStats;
use crate::utils::logging::log_submissions_loaded;
use crate::workflow::{
    PipelineObserver, ProcessResult, SubmissionCtx, SubmissionFlow, SubmissionOutcome,
};

/// 批量评分流水线
pub struct GradingPipeline {
    learning: Arc<dyn LearningService>,
    flow: Arc<SubmissionFlow>,
    observer: Arc<dyn PipelineObserver>,
    max_concurrent: usize,
    submission_timeout: Duration,
}

impl GradingPipeline {
    pub fn new(
        learning: Arc<dyn LearningService>,
        flow: Arc<SubmissionFlow>,
        observer: Arc<dyn PipelineObserver>,
        max_concurrent: usize,
        submission_timeout: Duration,
    ) -> Self {
        Self {
            learning,
            flow,
            observer,
            max_concurrent: max_concurrent.max(1),
            submission_timeout,
        }
    }

    /// 处理作业下的全部提交
    ///
    /// 只有列出提交失败会返回错误；单份提交的失败都记录在 errors.md 中。
    pub async fn run(&self, course_id: &str, course_work_id: &str) -> AppResult<PipelineStats> {
        let submissions = self
            .learning
            .list_submissions(course_id, course_work_id)
            .await
            .map_err(AppError::ListSubmissions)?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到任何提交，程序结束");
            return Ok(PipelineStats::default());
        }

        let total = submissions.len();
        log_submissions_loaded(total, self.max_concurrent);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut contexts = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);

        for (idx, submission) in submissions.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(format!("并发控制失败: {}", e)))?;

            let ctx = SubmissionCtx::new(
                submission.id.clone(),
                submission.user_id.clone(),
                idx + 1,
                total,
            );
            let flow = Arc::clone(&self.flow);
            let observer = Arc::clone(&self.observer);
            let timeout = self.submission_timeout;
            let task_ctx = ctx.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                observer.on_submission_started(&task_ctx);

                let result =
                    match tokio::time::timeout(timeout, flow.run(&submission, &task_ctx)).await {
                        Ok(result) => result,
                        Err(_) => {
                            let err = AppError::Timeout(timeout);
                            error!("{} ❌ {}", task_ctx, err);
                            flow.record(task_ctx.ledger_key(), &format!("Erro: {}", err))
                                .await;
                            ProcessResult::errored(err.to_string())
                        }
                    };

                observer.on_submission_finished(&task_ctx, &result.outcome);
                result
            });

            contexts.push(ctx);
            handles.push(handle);
        }

        let mut stats = PipelineStats::new(total);
        for (ctx, joined) in contexts.iter().zip(join_all(handles).await) {
            match joined {
                Ok(result) => stats.rows.extend(result.row),
                Err(e) => {
                    error!("{} 任务执行失败: {}", ctx, e);
                    self.flow
                        .record(ctx.ledger_key(), &format!("Erro: tarefa interrompida: {}", e))
                        .await;
                    self.observer.on_submission_finished(
                        ctx,
                        &SubmissionOutcome::Errored(e.to_string()),
                    );
                }
            }
        }

        stats.errors = self.flow.ledger().entries().await;
        Ok(stats)
    }
}
