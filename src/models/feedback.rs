use serde::{Deserialize, Serialize};

/// 评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    /// markdown 格式的反馈
    pub feedback: String,
    /// 非负；不会检查是否超过满分
    pub grade: f64,
}
