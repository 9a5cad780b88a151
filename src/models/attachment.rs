use serde::Deserialize;

/// Drive 中的文件
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alternate_link: Option<String>,
}

/// 作业材料中的共享文件，包了一层 `driveFile`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDriveFile {
    pub drive_file: DriveFile,
    #[serde(default)]
    pub share_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeVideo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alternate_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub form_url: String,
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// 附件
///
/// 接口返回的 JSON 里最多只有一个字段有值，反序列化时按
/// driveFile → youTubeVideo → link → form 的顺序取第一个，全部为空时是 `Empty`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAttachment")]
pub enum Attachment {
    StoredFile(DriveFile),
    SharedStoredFile(SharedDriveFile),
    Video(YouTubeVideo),
    Hyperlink(Link),
    Form(Form),
    Empty,
}

impl Attachment {
    /// 附件背后的 Drive 文件（共享文件会被解包）
    pub fn stored_file(&self) -> Option<&DriveFile> {
        match self {
            Attachment::StoredFile(file) => Some(file),
            Attachment::SharedStoredFile(shared) => Some(&shared.drive_file),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Attachment::StoredFile(_) => "driveFile",
            Attachment::SharedStoredFile(_) => "sharedDriveFile",
            Attachment::Video(_) => "youTubeVideo",
            Attachment::Hyperlink(_) => "link",
            Attachment::Form(_) => "form",
            Attachment::Empty => "empty",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DriveFileField {
    Shared(SharedDriveFile),
    Plain(DriveFile),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttachment {
    #[serde(default)]
    drive_file: Option<DriveFileField>,
    #[serde(default)]
    you_tube_video: Option<YouTubeVideo>,
    #[serde(default)]
    link: Option<Link>,
    #[serde(default)]
    form: Option<Form>,
}

impl From<RawAttachment> for Attachment {
    fn from(raw: RawAttachment) -> Self {
        if let Some(field) = raw.drive_file {
            return match field {
                DriveFileField::Shared(shared) => Attachment::SharedStoredFile(shared),
                DriveFileField::Plain(file) => Attachment::StoredFile(file),
            };
        }
        if let Some(video) = raw.you_tube_video {
            return Attachment::Video(video);
        }
        if let Some(link) = raw.link {
            return Attachment::Hyperlink(link);
        }
        if let Some(form) = raw.form {
            return Attachment::Form(form);
        }
        Attachment::Empty
    }
}
