pub mod logging;
pub mod text;

pub use text::sanitize_string;
