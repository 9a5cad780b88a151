//! 集成测试共用的内存实现
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use classroom_autograder::config::Config;
use classroom_autograder::models::{Course, CourseWork, FeedbackResult, Submission, UserProfile};
use classroom_autograder::ports::{
    Evaluator, LearningService, Notifier, PortError, PortResult, RubricGenerator, StorageService,
};
use classroom_autograder::workflow::{PipelineObserver, SubmissionCtx, SubmissionOutcome};
use classroom_autograder::Collaborators;

// ========== 测试数据 ==========

pub fn course() -> Course {
    Course {
        id: "c1".to_string(),
        name: "Algoritmos".to_string(),
    }
}

pub fn course_work(max_points: Option<f64>, materials: serde_json::Value) -> CourseWork {
    serde_json::from_value(json!({
        "courseId": "c1",
        "id": "a1",
        "title": "Lista 1",
        "description": "Implemente a função soma",
        "maxPoints": max_points,
        "materials": materials,
    }))
    .unwrap()
}

/// `file` 为 `None` 时是没有附件的提交
pub fn submission(id: &str, user_id: &str, file: Option<(&str, &str)>, owned: bool) -> Submission {
    let attachments: Vec<serde_json::Value> = file
        .into_iter()
        .map(|(file_id, title)| json!({"driveFile": {"id": file_id, "title": title}}))
        .collect();
    serde_json::from_value(json!({
        "courseId": "c1",
        "courseWorkId": "a1",
        "id": id,
        "userId": user_id,
        "state": "TURNED_IN",
        "late": false,
        "updateTime": "2025-03-02T12:30:00Z",
        "associatedWithDeveloper": owned,
        "assignmentSubmission": {"attachments": attachments},
    }))
    .unwrap()
}

pub fn profile(id: &str, name: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        full_name: name.to_string(),
        email: format!("{}@aluno.edu", id),
    }
}

pub fn test_config(output_root: &Path) -> Config {
    Config {
        course_id: "c1".to_string(),
        assignment_id: "a1".to_string(),
        output_root: output_root.to_path_buf(),
        submission_timeout: Duration::from_secs(30),
        ..Config::default()
    }
}

// ========== 课堂服务 ==========

#[derive(Debug, Clone, PartialEq)]
pub struct PatchCall {
    pub submission_id: String,
    pub draft_grade: f64,
    pub assigned_grade: Option<f64>,
}

pub struct FakeLearning {
    pub course: Course,
    pub course_work: CourseWork,
    pub submissions: Vec<Submission>,
    pub profiles: HashMap<String, UserProfile>,
    pub fail_listing: bool,
    pub fail_patch_for: HashSet<String>,
    pub patches: Mutex<Vec<PatchCall>>,
    pub returns: Mutex<Vec<String>>,
}

impl FakeLearning {
    pub fn new(course_work: CourseWork, submissions: Vec<Submission>, profiles: Vec<UserProfile>) -> Self {
        Self {
            course: course(),
            course_work,
            submissions,
            profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
            fail_listing: false,
            fail_patch_for: HashSet::new(),
            patches: Mutex::new(Vec::new()),
            returns: Mutex::new(Vec::new()),
        }
    }

    pub fn patches(&self) -> Vec<PatchCall> {
        self.patches.lock().unwrap().clone()
    }

    pub fn returns(&self) -> Vec<String> {
        self.returns.lock().unwrap().clone()
    }
}

#[async_trait]
impl LearningService for FakeLearning {
    async fn get_course(&self, _course_id: &str) -> PortResult<Course> {
        Ok(self.course.clone())
    }

    async fn get_course_work(&self, _course_id: &str, _course_work_id: &str) -> PortResult<CourseWork> {
        Ok(self.course_work.clone())
    }

    async fn list_submissions(&self, _course_id: &str, _course_work_id: &str) -> PortResult<Vec<Submission>> {
        if self.fail_listing {
            return Err(PortError::Unauthorized);
        }
        Ok(self.submissions.clone())
    }

    async fn patch_grade(
        &self,
        _course_id: &str,
        _course_work_id: &str,
        submission_id: &str,
        draft_grade: f64,
        assigned_grade: Option<f64>,
    ) -> PortResult<()> {
        if self.fail_patch_for.contains(submission_id) {
            return Err(PortError::Unexpected("patch recusado".to_string()));
        }
        self.patches.lock().unwrap().push(PatchCall {
            submission_id: submission_id.to_string(),
            draft_grade,
            assigned_grade,
        });
        Ok(())
    }

    async fn return_submission(
        &self,
        _course_id: &str,
        _course_work_id: &str,
        submission_id: &str,
    ) -> PortResult<()> {
        self.returns.lock().unwrap().push(submission_id.to_string());
        Ok(())
    }

    async fn get_user_profile(&self, user_id: &str) -> PortResult<UserProfile> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }
}

// ========== 文件存储 ==========

#[derive(Default)]
pub struct FakeStorage {
    pub files: HashMap<String, Vec<u8>>,
    pub delay: Option<Duration>,
    pub downloads: Mutex<HashMap<String, usize>>,
}

impl FakeStorage {
    pub fn with_files(files: &[(&str, &[u8])]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(id, bytes)| (id.to_string(), bytes.to_vec()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn download_count(&self, file_id: &str) -> usize {
        self.downloads.lock().unwrap().get(file_id).copied().unwrap_or(0)
    }

    pub fn total_downloads(&self) -> usize {
        self.downloads.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl StorageService for FakeStorage {
    async fn download(&self, file_id: &str) -> PortResult<Vec<u8>> {
        *self
            .downloads
            .lock()
            .unwrap()
            .entry(file_id.to_string())
            .or_insert(0) += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(file_id.to_string()))
    }
}

// ========== LLM ==========

/// 按学生姓名决定行为：失败、panic、变慢，其余返回固定成绩
pub struct FakeEvaluator {
    pub grade: f64,
    pub fail_for: HashSet<String>,
    pub panic_for: HashSet<String>,
    pub slow_for: HashSet<String>,
    pub contexts: Mutex<Vec<(String, String)>>,
}

impl FakeEvaluator {
    pub fn new(grade: f64) -> Self {
        Self {
            grade,
            fail_for: HashSet::new(),
            panic_for: HashSet::new(),
            slow_for: HashSet::new(),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn context_for(&self, student: &str) -> Option<String> {
        self.contexts
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == student)
            .map(|(_, ctx)| ctx.clone())
    }
}

#[async_trait]
impl Evaluator for FakeEvaluator {
    async fn evaluate(&self, context: &str, _criteria: &str, student_name: &str) -> PortResult<FeedbackResult> {
        self.contexts
            .lock()
            .unwrap()
            .push((student_name.to_string(), context.to_string()));

        if self.panic_for.contains(student_name) {
            panic!("avaliador quebrou para {}", student_name);
        }
        if self.slow_for.contains(student_name) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail_for.contains(student_name) {
            return Err(PortError::Unexpected("modelo indisponível".to_string()));
        }
        Ok(FeedbackResult {
            feedback: format!("## Feedback para {}\nBom trabalho.", student_name),
            grade: self.grade,
        })
    }
}

pub struct FakeRubric {
    pub text: String,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub last_context: Mutex<Option<String>>,
}

impl FakeRubric {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RubricGenerator for FakeRubric {
    async fn generate(&self, context: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context.to_string());
        if self.fail {
            return Err(PortError::Unexpected("sem critérios".to_string()));
        }
        Ok(self.text.clone())
    }
}

// ========== 邮件 ==========

#[derive(Default)]
pub struct FakeNotifier {
    pub fail_for: HashSet<String>,
    pub sent: Mutex<Vec<String>>,
}

impl FakeNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(
        &self,
        address: &str,
        _feedback: &FeedbackResult,
        _course: &Course,
        _course_work: &CourseWork,
    ) -> PortResult<()> {
        if self.fail_for.contains(address) {
            return Err(PortError::Unexpected("caixa cheia".to_string()));
        }
        self.sent.lock().unwrap().push(address.to_string());
        Ok(())
    }
}

// ========== 观察者 ==========

#[derive(Default)]
pub struct RecordingObserver {
    pub started: AtomicUsize,
    pub finished: Mutex<Vec<(String, SubmissionOutcome)>>,
}

impl RecordingObserver {
    pub fn outcome_of(&self, submission_id: &str) -> Option<SubmissionOutcome> {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == submission_id)
            .map(|(_, outcome)| outcome.clone())
    }

    pub fn finished_count(&self) -> usize {
        self.finished.lock().unwrap().len()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_submission_started(&self, _ctx: &SubmissionCtx) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_submission_finished(&self, ctx: &SubmissionCtx, outcome: &SubmissionOutcome) {
        self.finished
            .lock()
            .unwrap()
            .push((ctx.submission_id.clone(), outcome.clone()));
    }
}

// ========== 组装 ==========

pub struct Fakes {
    pub learning: Arc<FakeLearning>,
    pub storage: Arc<FakeStorage>,
    pub evaluator: Arc<FakeEvaluator>,
    pub rubric: Arc<FakeRubric>,
    pub notifier: Option<Arc<FakeNotifier>>,
}

impl Fakes {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            learning: self.learning.clone(),
            storage: self.storage.clone(),
            evaluator: self.evaluator.clone(),
            rubric_generator: self.rubric.clone(),
            notifier: self
                .notifier
                .clone()
                .map(|n| n as Arc<dyn Notifier>),
        }
    }
}

/// 读取错误记录中的条目（学生键, 内容）
pub fn ledger_entries(path: &Path) -> Vec<(String, String)> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Vec::new(),
    };
    text.split("\n## Aluno: ")
        .skip(1)
        .map(|block| {
            let (student, message) = block.split_once('\n').unwrap_or((block, ""));
            (student.to_string(), message.trim_end().to_string())
        })
        .collect()
}
