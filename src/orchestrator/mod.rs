//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 组装外部协作方（Classroom、Drive、LLM、邮件）
//! - 获取课程和作业，准备评分标准
//! - 运行批处理，输出汇总和成绩表
//!
//! ### `batch_processor` - 批量提交处理器
//! - 列出作业下的全部提交（Vec<Submission>）
//! - 控制并发数量（Semaphore）和单份提交的超时
//! - 汇总成绩行和错误条数
//!
//! ## 层次关系
//!
//! ```text
//! app (一个作业)
//!     ↓
//! batch_processor (处理 Vec<Submission>)
//!     ↓
//! workflow::SubmissionFlow (处理单份 Submission)
//!     ↓
//! services (能力层：extract / criteria / llm / ledger / email)
//!     ↓
//! clients + infrastructure (Google API、下载缓存、输出目录)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;
pub mod batch_processor;

// 重新导出主要类型
pub use app::{App, Collaborators, RunReport};
pub use batch_processor::GradingPipeline;
