use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::attachment::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    /// 学生从未打开
    New,
    Created,
    /// 已提交给老师
    TurnedIn,
    /// 已退回给学生
    Returned,
    /// 学生撤回了提交
    ReclaimedByStudent,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::New => "NEW",
            SubmissionState::Created => "CREATED",
            SubmissionState::TurnedIn => "TURNED_IN",
            SubmissionState::Returned => "RETURNED",
            SubmissionState::ReclaimedByStudent => "RECLAIMED_BY_STUDENT",
            SubmissionState::Unspecified => "SUBMISSION_STATE_UNSPECIFIED",
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提交内容，只会有一种
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawContent")]
pub enum SubmissionContent {
    Attachments(Vec<Attachment>),
    ShortAnswer(String),
    MultipleChoice(String),
    #[default]
    None,
}

#[derive(Deserialize)]
struct RawAttachments {
    #[serde(default)]
    attachments: Option<Vec<Attachment>>,
}

#[derive(Deserialize)]
struct RawAnswer {
    #[serde(default)]
    answer: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    #[serde(default)]
    assignment_submission: Option<RawAttachments>,
    #[serde(default)]
    short_answer_submission: Option<RawAnswer>,
    #[serde(default)]
    multiple_choice_submission: Option<RawAnswer>,
}

impl From<RawContent> for SubmissionContent {
    fn from(raw: RawContent) -> Self {
        if let Some(assignment) = raw.assignment_submission {
            return SubmissionContent::Attachments(assignment.attachments.unwrap_or_default());
        }
        if let Some(short) = raw.short_answer_submission {
            return SubmissionContent::ShortAnswer(short.answer);
        }
        if let Some(choice) = raw.multiple_choice_submission {
            return SubmissionContent::MultipleChoice(choice.answer);
        }
        SubmissionContent::None
    }
}

/// 学生提交
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub course_id: String,
    pub course_work_id: String,
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: SubmissionState,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    pub draft_grade: Option<f64>,
    #[serde(default)]
    pub assigned_grade: Option<f64>,
    #[serde(default)]
    pub alternate_link: Option<String>,
    /// 当前凭据是否有权给这条提交打分（作业由同一个开发者项目创建时才为 true）
    #[serde(default)]
    pub associated_with_developer: bool,
    #[serde(flatten)]
    pub content: SubmissionContent,
}

impl Submission {
    /// 非空的附件列表
    pub fn attachments(&self) -> Option<&[Attachment]> {
        match &self.content {
            SubmissionContent::Attachments(list) if !list.is_empty() => Some(list),
            _ => None,
        }
    }

    /// 提交日期：优先取最后更新时间
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.update_time.or(self.creation_time)
    }
}
