//! 报表层
//!
//! - `stats` - 运行过程中累积的成绩行和错误条数
//! - `summary` - 控制台汇总（平均分、最高最低、分布）
//! - `spreadsheet` - 成绩表导出

pub mod spreadsheet;
pub mod stats;
pub mod summary;

pub use stats::{PipelineStats, StudentRow};
pub use summary::{HistogramBucket, ReportBuilder, ReportSummary};
