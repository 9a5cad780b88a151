use serde::Deserialize;

/// 发送反馈邮件所用的老师资料
#[derive(Debug, Clone, Deserialize)]
pub struct TeacherProfile {
    pub name: String,
    pub email: String,
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_password: String,
    /// 形如 5511999999999
    #[serde(default)]
    pub whatsapp: Option<String>,
}

fn default_smtp_port() -> u16 {
    465
}

impl TeacherProfile {
    pub fn whatsapp_link(&self) -> Option<String> {
        self.whatsapp
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(|n| format!("https://wa.me/{}", n))
    }
}
