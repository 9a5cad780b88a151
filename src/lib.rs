//! # Classroom Autograder
//!
//! 批量批改课堂作业：下载学生提交的附件，交给 LLM 按评分标准打分，
//! 写回成绩、发送反馈邮件，最后输出汇总和成绩表。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 下载缓存、输出目录布局
//! - `clients/` - Classroom / Drive HTTP 客户端
//! - `ports` - 外部协作方的 trait
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个附件 / 单个学生
//! - `AttachmentExtractor` - 附件 → 文本
//! - `CriteriaProvider` - 生成并缓存评分标准
//! - `LlmService` - LLM 评分和评分标准生成
//! - `ErrorLedger` - 写 errors.md
//! - `EmailService` - 发送反馈邮件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份提交"的完整处理流程
//! - `SubmissionCtx` - 上下文封装（提交 ID + 学生 ID + 序号）
//! - `SubmissionFlow` - 流程编排（资料 → 提取 → 评分 → 写回 → 邮件 → 兜底）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 组装协作方，运行一个作业
//! - `orchestrator/batch_processor` - 并发处理全部提交
//!
//! ### ⑤ 报表（Report）
//! - `report/` - 成绩统计、控制台汇总、xlsx 导出

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod ports;
pub mod report;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use orchestrator::{App, Collaborators, GradingPipeline, RunReport};
pub use report::{PipelineStats, ReportBuilder};
pub use workflow::{ProcessResult, SubmissionCtx, SubmissionFlow, SubmissionOutcome};
