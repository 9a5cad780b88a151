use crate::models::teacher::TeacherProfile;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载老师资料
pub async fn load_teacher_profile(toml_file_path: &Path) -> Result<TeacherProfile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取老师资料文件: {}", toml_file_path.display()))?;

    let profile: TeacherProfile = toml::from_str(&content)
        .with_context(|| format!("无法解析老师资料文件: {}", toml_file_path.display()))?;

    if profile.email.trim().is_empty() || !profile.email.contains('@') {
        anyhow::bail!("老师资料中的邮箱无效: {}", profile.email);
    }

    tracing::info!("已加载老师资料: {} <{}>", profile.name, profile.email);

    Ok(profile)
}
