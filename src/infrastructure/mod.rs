pub mod download_cache;
pub mod output_layout;

pub use download_cache::{CachedBytes, DownloadCache};
pub use output_layout::OutputLayout;
