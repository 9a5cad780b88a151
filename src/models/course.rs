use serde::Deserialize;

use super::attachment::Attachment;

/// 课程
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseWorkState {
    Published,
    Draft,
    Deleted,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseWorkType {
    Assignment,
    ShortAnswerQuestion,
    MultipleChoiceQuestion,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DueDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// 作业
///
/// 一次运行内只读
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWork {
    pub course_id: String,
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 为空或 0 时表示不计分
    #[serde(default)]
    pub max_points: Option<f64>,
    #[serde(default)]
    pub materials: Vec<Attachment>,
    #[serde(default)]
    pub state: CourseWorkState,
    #[serde(default)]
    pub work_type: CourseWorkType,
    #[serde(default)]
    pub due_date: Option<DueDate>,
}

impl CourseWork {
    /// 有效的满分（大于 0 才算）
    pub fn grade_scale(&self) -> Option<f64> {
        self.max_points.filter(|p| *p > 0.0)
    }
}
