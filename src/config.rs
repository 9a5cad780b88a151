use std::path::PathBuf;
use std::time::Duration;

/// 配置加载错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("缺少环境变量 {0}")]
    MissingVar(String),
    #[error("环境变量 {0} 的值无效: {1}")]
    InvalidValue(String, String),
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 课程 ID
    pub course_id: String,
    /// 作业 ID
    pub assignment_id: String,
    /// 输出根目录，实际输出到 `{output_root}/{course_id}/{assignment_id}`
    pub output_root: PathBuf,
    /// 指定的评分标准文件（为空时自动生成并缓存）
    pub criteria_path: Option<PathBuf>,
    /// 同时处理的提交数量
    pub max_concurrent_submissions: usize,
    /// 单个提交的处理时限
    pub submission_timeout: Duration,
    /// 是否发送反馈邮件
    pub send_email: bool,
    /// 是否抄送一份给自己
    pub send_email_copy: bool,
    /// 是否直接退回成绩给学生（否则只保存为草稿）
    pub return_grades: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- Google API 配置 ---
    pub google_access_token: String,
    pub classroom_api_base_url: String,
    pub drive_api_base_url: String,
    pub http_timeout: Duration,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 邮件配置 ---
    pub teacher_profile_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            course_id: String::new(),
            assignment_id: String::new(),
            output_root: PathBuf::from("output"),
            criteria_path: None,
            max_concurrent_submissions: 4,
            submission_timeout: Duration::from_secs(600),
            send_email: false,
            send_email_copy: false,
            return_grades: false,
            verbose_logging: false,
            google_access_token: String::new(),
            classroom_api_base_url: "https://classroom.googleapis.com/v1".to_string(),
            drive_api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            http_timeout: Duration::from_secs(120),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            teacher_profile_path: default_profile_path(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let required = |name: &str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
        };

        let max_concurrent_submissions = parse_var(
            &lookup,
            "MAX_CONCURRENT_SUBMISSIONS",
            default.max_concurrent_submissions,
        )?;
        if max_concurrent_submissions == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_CONCURRENT_SUBMISSIONS".to_string(),
                "必须大于 0".to_string(),
            ));
        }

        Ok(Self {
            course_id: required("COURSE_ID")?,
            assignment_id: required("ASSIGNMENT_ID")?,
            output_root: lookup("OUTPUT_ROOT").map(PathBuf::from).unwrap_or(default.output_root),
            criteria_path: lookup("CRITERIA_PATH").filter(|v| !v.is_empty()).map(PathBuf::from),
            max_concurrent_submissions,
            submission_timeout: Duration::from_secs(parse_var(
                &lookup,
                "SUBMISSION_TIMEOUT_SECS",
                default.submission_timeout.as_secs(),
            )?),
            send_email: parse_var(&lookup, "SEND_EMAIL", default.send_email)?,
            send_email_copy: parse_var(&lookup, "SEND_EMAIL_COPY", default.send_email_copy)?,
            return_grades: parse_var(&lookup, "RETURN_GRADES", default.return_grades)?,
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", default.verbose_logging)?,
            google_access_token: required("GOOGLE_ACCESS_TOKEN")?,
            classroom_api_base_url: lookup("CLASSROOM_API_BASE_URL").unwrap_or(default.classroom_api_base_url),
            drive_api_base_url: lookup("DRIVE_API_BASE_URL").unwrap_or(default.drive_api_base_url),
            http_timeout: Duration::from_secs(parse_var(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                default.http_timeout.as_secs(),
            )?),
            llm_api_key: required("LLM_API_KEY")?,
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            teacher_profile_path: lookup("TEACHER_PROFILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.teacher_profile_path),
        })
    }

    /// 本次作业的输出目录
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.course_id).join(&self.assignment_id)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        None => Ok(default),
    }
}

fn default_profile_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("classroom-autograder")
        .join("profile.toml")
}
