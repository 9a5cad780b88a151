//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM"能力，不关心流程：给提交打分、生成评分标准
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::FeedbackResult;
use crate::ports::{Evaluator, PortError, PortResult, RubricGenerator};

const EVALUATION_SYSTEM_PROMPT: &str = "Você é um professor experiente avaliando trabalhos de alunos. \
Avalie com imparcialidade, seguindo estritamente os critérios fornecidos, \
e escreva um feedback construtivo, claro e direto em português.";

const RUBRIC_SYSTEM_PROMPT: &str = "Você é um professor experiente preparando critérios de avaliação. \
Escreva critérios objetivos em markdown, em português, com a pontuação de cada item \
somando a nota máxima da atividade.";

/// LLM 服务
///
/// 职责：
/// - 根据提交内容和评分标准生成反馈与成绩
/// - 根据作业描述生成评分标准
/// - 只处理单个学生，不关心流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> PortResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(unexpected)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(unexpected)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(4096u32)
            .build()
            .map_err(unexpected)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            PortError::Unexpected(format!("LLM API 调用失败: {}", e))
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("LLM 返回内容为空".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Evaluator for LlmService {
    async fn evaluate(
        &self,
        context: &str,
        criteria: &str,
        student_name: &str,
    ) -> PortResult<FeedbackResult> {
        let user_message = build_evaluation_prompt(context, criteria, student_name);
        let response = self
            .send_to_llm(&user_message, Some(EVALUATION_SYSTEM_PROMPT))
            .await?;

        parse_feedback_reply(&response).map_err(|reason| {
            warn!("无法解析评分结果: {}", reason);
            PortError::Unexpected(reason)
        })
    }
}

#[async_trait]
impl RubricGenerator for LlmService {
    async fn generate(&self, context: &str) -> PortResult<String> {
        let user_message = format!(
            "Com base nas informações abaixo, elabore os critérios de avaliação desta atividade.\n\n{}",
            context
        );
        let criteria = self
            .send_to_llm(&user_message, Some(RUBRIC_SYSTEM_PROMPT))
            .await?;
        if criteria.is_empty() {
            return Err(PortError::Unexpected("LLM 返回的评分标准为空".to_string()));
        }
        Ok(criteria)
    }
}

fn unexpected(err: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(err.to_string())
}

fn build_evaluation_prompt(context: &str, criteria: &str, student_name: &str) -> String {
    format!(
        r#"Avalie o trabalho do aluno {student} de acordo com os critérios abaixo.

# Critérios de Avaliação
{criteria}

# Trabalho do Aluno
{context}

Responda somente com um objeto JSON no formato:
{{"feedback": "<feedback em markdown, com pontos positivos, pontos a melhorar e sugestões>", "grade": <nota numérica>}}"#,
        student = student_name,
        criteria = criteria,
        context = context,
    )
}

#[derive(Deserialize)]
struct RawFeedback {
    feedback: String,
    grade: JsonValue,
}

/// 解析评分回复
///
/// 允许 JSON 外面包着 markdown 代码块或多余文字；成绩可以是数字或数字字符串，
/// 必须是非负的有限数。
fn parse_feedback_reply(response: &str) -> Result<FeedbackResult, String> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => return Err(format!("回复中没有 JSON 对象: {}", response)),
    };

    let raw: RawFeedback =
        serde_json::from_str(json).map_err(|e| format!("JSON 格式错误: {}", e))?;

    let grade = match &raw.grade {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("成绩不是数字: {}", raw.grade))?;

    if !grade.is_finite() || grade < 0.0 {
        return Err(format!("成绩无效: {}", grade));
    }

    Ok(FeedbackResult {
        feedback: raw.feedback,
        grade,
    })
}
