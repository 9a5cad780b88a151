//! Classroom API 客户端
//!
//! 封装课程、作业、提交、用户资料相关的 HTTP 调用

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::clients::map_status;
use crate::config::Config;
use crate::models::{Course, CourseWork, Submission, UserProfile};
use crate::ports::{LearningService, PortError, PortResult};

/// 每页最多取回的提交数
const PAGE_SIZE: &str = "100";

/// Classroom API 客户端
pub struct ClassroomClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionPage {
    #[serde(default)]
    student_submissions: Vec<Submission>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawName {
    #[serde(default)]
    full_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserProfile {
    id: String,
    #[serde(default)]
    name: Option<RawName>,
    #[serde(default)]
    email_address: Option<String>,
}

impl From<RawUserProfile> for UserProfile {
    fn from(raw: RawUserProfile) -> Self {
        let full_name = raw
            .name
            .map(|n| n.full_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| raw.id.clone());
        UserProfile {
            id: raw.id,
            full_name,
            email: raw.email_address.unwrap_or_default(),
        }
    }
}

impl ClassroomClient {
    /// 创建新的 Classroom 客户端
    pub fn new(config: &Config) -> PortResult<Self> {
        Self::with_base_url(
            &config.classroom_api_base_url,
            &config.google_access_token,
            config.http_timeout,
        )
    }

    pub fn with_base_url(base_url: &str, token: &str, timeout: Duration) -> PortResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("无法创建 HTTP 客户端: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    /// 发送请求；非 2xx 时映射为 `PortError`
    async fn send(&self, builder: RequestBuilder, what: &str) -> PortResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("请求失败 ({}): {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, what, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> PortResult<T> {
        debug!("GET {}", path);
        let response = self
            .send(self.request(Method::GET, path).query(query), path)
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("响应格式错误 ({}): {}", path, e)))
    }
}

#[async_trait]
impl LearningService for ClassroomClient {
    async fn get_course(&self, course_id: &str) -> PortResult<Course> {
        self.get_json(&format!("courses/{}", course_id), &[]).await
    }

    async fn get_course_work(&self, course_id: &str, course_work_id: &str) -> PortResult<CourseWork> {
        self.get_json(
            &format!("courses/{}/courseWork/{}", course_id, course_work_id),
            &[],
        )
        .await
    }

    async fn list_submissions(&self, course_id: &str, course_work_id: &str) -> PortResult<Vec<Submission>> {
        let path = format!(
            "courses/{}/courseWork/{}/studentSubmissions",
            course_id, course_work_id
        );

        let mut submissions = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("pageSize", PAGE_SIZE)];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: SubmissionPage = self.get_json(&path, &query).await?;
            debug!("本页 {} 份提交", page.student_submissions.len());
            submissions.extend(page.student_submissions);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(submissions)
    }

    async fn patch_grade(
        &self,
        course_id: &str,
        course_work_id: &str,
        submission_id: &str,
        draft_grade: f64,
        assigned_grade: Option<f64>,
    ) -> PortResult<()> {
        let path = format!(
            "courses/{}/courseWork/{}/studentSubmissions/{}",
            course_id, course_work_id, submission_id
        );
        let (mask, body) = match assigned_grade {
            Some(assigned) => (
                "draftGrade,assignedGrade",
                json!({ "draftGrade": draft_grade, "assignedGrade": assigned }),
            ),
            None => ("draftGrade", json!({ "draftGrade": draft_grade })),
        };

        debug!("PATCH {} ({})", path, mask);
        self.send(
            self.request(Method::PATCH, &path)
                .query(&[("updateMask", mask)])
                .json(&body),
            &path,
        )
        .await?;
        Ok(())
    }

    async fn return_submission(
        &self,
        course_id: &str,
        course_work_id: &str,
        submission_id: &str,
    ) -> PortResult<()> {
        let path = format!(
            "courses/{}/courseWork/{}/studentSubmissions/{}:return",
            course_id, course_work_id, submission_id
        );
        debug!("POST {}", path);
        self.send(self.request(Method::POST, &path).json(&json!({})), &path)
            .await?;
        Ok(())
    }

    async fn get_user_profile(&self, user_id: &str) -> PortResult<UserProfile> {
        let raw: RawUserProfile = self
            .get_json(&format!("userProfiles/{}", user_id), &[])
            .await?;
        Ok(raw.into())
    }
}
