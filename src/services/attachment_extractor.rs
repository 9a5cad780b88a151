//! 附件提取服务 - 业务能力层
//!
//! 只负责"把一个附件变成文本"能力，不关心流程
//!
//! - 存储文件：下载（经过磁盘缓存）后按扩展名解码
//! - 视频、链接、表单：目前不提取内容，返回空文本

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::infrastructure::DownloadCache;
use crate::models::{Attachment, DriveFile, Form, Link, YouTubeVideo};
use crate::ports::StorageService;
use crate::services::notebook;

/// 附件提取服务
///
/// 职责：
/// - 下载存储文件并解码为文本
/// - 同一个文件在多次运行之间只下载一次
/// - 只处理单个附件，不关心属于哪个学生
pub struct AttachmentExtractor {
    storage: Arc<dyn StorageService>,
    cache: Arc<DownloadCache>,
}

impl AttachmentExtractor {
    pub fn new(storage: Arc<dyn StorageService>, cache: Arc<DownloadCache>) -> Self {
        Self { storage, cache }
    }

    /// 提取单个附件的文本
    pub async fn extract(&self, attachment: &Attachment) -> AppResult<String> {
        match attachment {
            Attachment::StoredFile(file) => self.extract_stored_file(file).await,
            Attachment::SharedStoredFile(shared) => {
                self.extract_stored_file(&shared.drive_file).await
            }
            Attachment::Video(video) => Ok(stringify_video(video)),
            Attachment::Hyperlink(link) => Ok(stringify_link(link)),
            Attachment::Form(form) => Ok(stringify_form(form)),
            Attachment::Empty => Ok(String::new()),
        }
    }

    /// 依次提取多个附件，以空行拼接；任一附件失败即返回错误
    ///
    /// 每个附件都会经过 `extract`，但返回空文本的附件（视频、链接、表单、空附件）不参与拼接，
    /// 因此结果里不会出现连续的空段落。
    pub async fn extract_all(&self, attachments: &[Attachment]) -> AppResult<String> {
        let mut parts = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            let text = self.extract(attachment).await?;
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(parts.join("\n\n"))
    }

    async fn extract_stored_file(&self, file: &DriveFile) -> AppResult<String> {
        let key = DownloadCache::cache_key(&file.id, &file.title);
        info!("📄 处理文件: {}", file.title);

        let storage = Arc::clone(&self.storage);
        let file_id = file.id.clone();
        let cached = self
            .cache
            .get_or_fetch(&key, || async move {
                storage
                    .download(&file_id)
                    .await
                    .map_err(|source| AppError::Download { file_id, source })
            })
            .await?;

        if cached.hit {
            debug!("文件已在本地缓存: {}", key);
        }

        let content = decode_file(&key, &file.title, cached.bytes)?;
        Ok(format!("{}\n{}", file.title, content))
    }
}

/// 按扩展名解码文件内容
fn decode_file(key: &str, title: &str, bytes: Vec<u8>) -> AppResult<String> {
    let is_notebook = Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ipynb"));

    if is_notebook {
        let cells = notebook::parse_notebook(&bytes).map_err(|reason| AppError::ContentDecode {
            title: title.to_string(),
            reason,
        })?;
        return Ok(notebook::render_cells(&cells));
    }

    Ok(decode_text(bytes))
}

/// 先按 UTF-8 解码，失败时退回 Latin-1
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("UTF-8 解码失败，改用 Latin-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

fn stringify_video(video: &YouTubeVideo) -> String {
    debug!("暂不提取视频内容: {:?}", video.title);
    String::new()
}

fn stringify_link(link: &Link) -> String {
    debug!("暂不提取链接内容: {}", link.url);
    String::new()
}

fn stringify_form(form: &Form) -> String {
    debug!("暂不提取表单内容: {}", form.form_url);
    String::new()
}
