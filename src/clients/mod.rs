pub mod classroom_client;
pub mod drive_client;

pub use classroom_client::ClassroomClient;
pub use drive_client::DriveClient;

use reqwest::StatusCode;

use crate::ports::PortError;

/// 非 2xx 响应映射为 `PortError`
pub(crate) fn map_status(status: StatusCode, what: &str, body: &str) -> PortError {
    match status {
        StatusCode::NOT_FOUND => PortError::NotFound(what.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        _ => PortError::Unexpected(format!("HTTP {} ({}): {}", status, what, body.trim())),
    }
}
