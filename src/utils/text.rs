use regex::Regex;
use std::sync::OnceLock;

fn unsafe_chars() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_.\-]").ok()).as_ref()
}

/// 清理字符串以便用作文件名：非 `[A-Za-z0-9_.-]` 的字符都替换为 `_`
pub fn sanitize_string(s: &str) -> String {
    let trimmed = s.trim();
    match unsafe_chars() {
        Some(re) => re.replace_all(trimmed, "_").into_owned(),
        None => trimmed
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
    }
}
