//! 应用入口 - 编排层
//!
//! 负责组装外部协作方、准备评分标准、运行批处理并输出报表。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::{ClassroomClient, DriveClient};
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{DownloadCache, OutputLayout};
use crate::models::load_teacher_profile;
use crate::orchestrator::GradingPipeline;
use crate::ports::{Evaluator, LearningService, Notifier, RubricGenerator, StorageService};
use crate::report::{PipelineStats, ReportBuilder, ReportSummary};
use crate::services::{
    load_criteria_file, AttachmentExtractor, CriteriaProvider, EmailService, ErrorLedger,
    LlmService,
};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{FlowOptions, PipelineObserver, SubmissionFlow, TracingObserver};

/// 外部协作方
pub struct Collaborators {
    pub learning: Arc<dyn LearningService>,
    pub storage: Arc<dyn StorageService>,
    pub evaluator: Arc<dyn Evaluator>,
    pub rubric_generator: Arc<dyn RubricGenerator>,
    /// 未开启邮件时为空
    pub notifier: Option<Arc<dyn Notifier>>,
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunReport {
    pub stats: PipelineStats,
    /// 没有任何成绩时为空
    pub summary: Option<ReportSummary>,
    pub output_dir: PathBuf,
}

/// 应用主结构
pub struct App {
    config: Config,
    services: Collaborators,
    observer: Arc<dyn PipelineObserver>,
}

impl App {
    /// 用真实的 Google / LLM / SMTP 实现初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let learning = ClassroomClient::new(&config).context("无法创建 Classroom 客户端")?;
        let storage = DriveClient::new(&config).context("无法创建 Drive 客户端")?;
        let llm = Arc::new(LlmService::new(&config));

        let notifier: Option<Arc<dyn Notifier>> = if config.send_email {
            let profile = load_teacher_profile(&config.teacher_profile_path).await?;
            let email = EmailService::new(profile, config.send_email_copy)
                .context("无法创建邮件服务")?;
            Some(Arc::new(email))
        } else {
            None
        };

        let services = Collaborators {
            learning: Arc::new(learning),
            storage: Arc::new(storage),
            evaluator: llm.clone(),
            rubric_generator: llm,
            notifier,
        };

        Ok(Self::with_collaborators(config, services))
    }

    pub fn with_collaborators(config: Config, services: Collaborators) -> Self {
        Self {
            config,
            services,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        let layout = OutputLayout::new(config.output_dir());
        layout.ensure().await?;

        log_startup(
            &config.course_id,
            &config.assignment_id,
            config.max_concurrent_submissions,
        );

        // 获取课程和作业
        let course = self
            .services
            .learning
            .get_course(&config.course_id)
            .await
            .map_err(AppError::AssignmentLookup)?;
        let course_work = self
            .services
            .learning
            .get_course_work(&config.course_id, &config.assignment_id)
            .await
            .map_err(AppError::AssignmentLookup)?;
        info!("📚 课程: {} | 📝 作业: {}", course.name, course_work.title);

        let cache = Arc::new(DownloadCache::new(layout.downloads_dir()));
        let extractor = Arc::new(AttachmentExtractor::new(
            Arc::clone(&self.services.storage),
            cache,
        ));

        // 评分标准
        let criteria = match &config.criteria_path {
            Some(path) => load_criteria_file(path).await?,
            None => {
                CriteriaProvider::new(
                    Arc::clone(&self.services.rubric_generator),
                    Arc::clone(&extractor),
                    layout.criteria_path(),
                )
                .provide(&course_work)
                .await?
            }
        };

        let ledger = Arc::new(ErrorLedger::new(layout.ledger_path()));
        let flow = Arc::new(SubmissionFlow::new(
            Arc::clone(&self.services.learning),
            Arc::clone(&self.services.evaluator),
            self.services.notifier.clone(),
            extractor,
            ledger,
            layout.clone(),
            course,
            course_work.clone(),
            criteria,
            FlowOptions {
                return_grades: config.return_grades,
            },
        ));

        let pipeline = GradingPipeline::new(
            Arc::clone(&self.services.learning),
            flow,
            Arc::clone(&self.observer),
            config.max_concurrent_submissions,
            config.submission_timeout,
        );
        let stats = pipeline
            .run(&config.course_id, &config.assignment_id)
            .await?;

        // 报表
        let builder = ReportBuilder::new(&stats, course_work.grade_scale());
        let summary = builder.summary();
        match &summary {
            Some(summary) => {
                builder.write_spreadsheet(&layout.report_path())?;
                print_final_stats(
                    &summary.render_lines(),
                    &layout.root().display().to_string(),
                );
            }
            None => warn!("⚠️ 没有学生获得成绩，不生成报表"),
        }

        Ok(RunReport {
            stats,
            summary,
            output_dir: layout.root().to_path_buf(),
        })
    }
}
