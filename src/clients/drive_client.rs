//! Drive API 客户端
//!
//! 只负责按文件 ID 下载原始字节

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::clients::map_status;
use crate::config::Config;
use crate::ports::{PortError, PortResult, StorageService};

/// Drive API 客户端
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DriveClient {
    /// 创建新的 Drive 客户端
    pub fn new(config: &Config) -> PortResult<Self> {
        Self::with_base_url(
            &config.drive_api_base_url,
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

    fn media_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base_url, file_id)
    }
}

#[async_trait]
impl StorageService for DriveClient {
    async fn download(&self, file_id: &str) -> PortResult<Vec<u8>> {
        let url = self.media_url(file_id);
        let mut response = self
            .http
            .get(&url)
            .query(&[("alt", "media")])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("下载请求失败 ({}): {}", file_id, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, file_id, &body));
        }

        let total = response.content_length();
        let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PortError::Unexpected(format!("下载中断 ({}): {}", file_id, e)))?
        {
            bytes.extend_from_slice(&chunk);
            if let Some(total) = total.filter(|t| *t > 0) {
                debug!(
                    "下载进度 {}: {:.0}%",
                    file_id,
                    bytes.len() as f64 * 100.0 / total as f64
                );
            }
        }

        debug!("下载完成 {}: {} 字节", file_id, bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_url() {
        let client = DriveClient::with_base_url(
            "https://www.googleapis.com/drive/v3/",
            "t",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.media_url("F1"),
            "https://www.googleapis.com/drive/v3/files/F1"
        );
    }
}
