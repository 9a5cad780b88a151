use chrono::{DateTime, Utc};

use crate::models::{Submission, SubmissionState, UserProfile};

/// 一名学生的成绩行
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    pub name: String,
    pub email: String,
    pub grade: f64,
    pub state: SubmissionState,
    pub submitted_at: Option<DateTime<Utc>>,
    pub late: bool,
}

impl StudentRow {
    pub fn new(student: &UserProfile, submission: &Submission, grade: f64) -> Self {
        Self {
            name: student.full_name.clone(),
            email: student.email.clone(),
            grade,
            state: submission.state,
            submitted_at: submission.submitted_at(),
            late: submission.late,
        }
    }
}

/// 一次运行的统计
///
/// 只有拿到成绩的学生才有成绩行；`errors` 等于本次写入错误记录的条数。
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// 提交总数
    pub total: usize,
    pub rows: Vec<StudentRow>,
    pub errors: usize,
}

impl PipelineStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn graded(&self) -> usize {
        self.rows.len()
    }

    pub fn grades(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.grade)
    }
}
