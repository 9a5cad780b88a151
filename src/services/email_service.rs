//! 邮件服务 - 业务能力层
//!
//! 只负责"把反馈发给学生"能力，不关心流程

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, AsyncSmtpTransport},
    AsyncTransport, Tokio1Executor,
};
use tracing::{debug, info};

use crate::models::{Course, CourseWork, FeedbackResult, TeacherProfile};
use crate::ports::{Notifier, PortError, PortResult};

/// 隐式 TLS 端口，其它端口走 STARTTLS
const SMTPS_PORT: u16 = 465;

/// 邮件服务
///
/// 职责：
/// - 以老师的身份把反馈发给单个学生
/// - 开启抄送时密送一份给老师自己
pub struct EmailService {
    profile: TeacherProfile,
    send_copy: bool,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailService {
    pub fn new(profile: TeacherProfile, send_copy: bool) -> PortResult<Self> {
        let builder = if profile.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&profile.smtp_server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&profile.smtp_server)
        }
        .map_err(|e| PortError::Unexpected(format!("SMTP 配置无效: {}", e)))?;

        let transport = builder
            .port(profile.smtp_port)
            .credentials(Credentials::new(
                profile.email.clone(),
                profile.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            profile,
            send_copy,
            transport,
        })
    }

    /// 构建邮件（纯文本 + HTML 两个版本）
    fn build_message(
        &self,
        address: &str,
        feedback: &FeedbackResult,
        course: &Course,
        course_work: &CourseWork,
    ) -> PortResult<Message> {
        let from: Mailbox = format!("{} <{}>", self.profile.name, self.profile.email)
            .parse()
            .map_err(|e| PortError::Unexpected(format!("发件人地址无效: {}", e)))?;
        let to: Mailbox = address
            .parse()
            .map_err(|e| PortError::Unexpected(format!("收件人地址无效 ({}): {}", address, e)))?;

        let mut builder = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(format!("Feedback: {} - {}", course_work.title, course.name));
        if self.send_copy {
            builder = builder.bcc(from);
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(self.plain_body(feedback, course_work)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(self.html_body(feedback, course_work)),
                    ),
            )
            .map_err(|e| PortError::Unexpected(format!("构建邮件失败: {}", e)))
    }

    fn plain_body(&self, feedback: &FeedbackResult, course_work: &CourseWork) -> String {
        let mut body = format!(
            "Olá,\n\nSegue o feedback da atividade \"{}\".\n\nNota: {}\n\n{}\n\nAtenciosamente,\n{}",
            course_work.title, feedback.grade, feedback.feedback, self.profile.name
        );
        if let Some(link) = self.profile.whatsapp_link() {
            body.push_str(&format!("\nWhatsApp: {}", link));
        }
        body
    }

    fn html_body(&self, feedback: &FeedbackResult, course_work: &CourseWork) -> String {
        let contact = self
            .profile
            .whatsapp_link()
            .map(|link| format!(r#"<p><a href="{0}">{0}</a></p>"#, link))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2>{title}</h2>
    <p><strong>Nota:</strong> {grade}</p>
    <pre style="white-space: pre-wrap; font-family: inherit;">{feedback}</pre>
    <p>Atenciosamente,<br>{teacher}</p>
    {contact}
</body>
</html>"#,
            title = escape_html(&course_work.title),
            grade = feedback.grade,
            feedback = escape_html(&feedback.feedback),
            teacher = escape_html(&self.profile.name),
            contact = contact,
        )
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn send(
        &self,
        address: &str,
        feedback: &FeedbackResult,
        course: &Course,
        course_work: &CourseWork,
    ) -> PortResult<()> {
        let message = self.build_message(address, feedback, course, course_work)?;
        debug!("发送邮件: {}", address);

        self.transport
            .send(message)
            .await
            .map_err(|e| PortError::Unexpected(format!("SMTP 发送失败: {}", e)))?;

        info!("📧 邮件已发送: {}", address);
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
