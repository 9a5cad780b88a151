//! 进度观察者
//!
//! 批处理在每份提交开始和结束时通知观察者；默认实现只写日志。

use tracing::{info, warn};

use crate::workflow::{SubmissionCtx, SubmissionOutcome};

pub trait PipelineObserver: Send + Sync {
    fn on_submission_started(&self, _ctx: &SubmissionCtx) {}

    fn on_submission_finished(&self, _ctx: &SubmissionCtx, _outcome: &SubmissionOutcome) {}
}

/// 把进度写到 tracing 日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_submission_started(&self, ctx: &SubmissionCtx) {
        info!("{} ▶ 开始处理", ctx);
    }

    fn on_submission_finished(&self, ctx: &SubmissionCtx, outcome: &SubmissionOutcome) {
        match outcome {
            SubmissionOutcome::Graded => info!("{} ✓ 完成", ctx),
            SubmissionOutcome::GradedNoWriteback(reason) => {
                info!("{} ✓ 完成（成绩未写回: {}）", ctx, reason)
            }
            SubmissionOutcome::Skipped(reason) => warn!("{} ⏭ 跳过: {}", ctx, reason),
            SubmissionOutcome::Errored(reason) => warn!("{} ✗ 失败: {}", ctx, reason),
        }
    }
}
