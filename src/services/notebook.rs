//! Jupyter 笔记本解析
//!
//! 只保留 code / markdown 两类单元格，code 单元格附带其输出，顺序与原文件一致。

use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Code,
    Markdown,
}

impl CellKind {
    fn label(self) -> &'static str {
        match self {
            CellKind::Code => "code",
            CellKind::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotebookCell {
    pub kind: CellKind,
    pub source: String,
    /// 仅 code 单元格有
    pub outputs: Vec<String>,
}

/// nbformat 里的文本字段可能是字符串，也可能是按行拆开的数组
#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineText {
    Lines(Vec<String>),
    Single(String),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Single(String::new())
    }
}

impl MultilineText {
    fn into_string(self) -> String {
        match self {
            MultilineText::Lines(lines) => lines.concat(),
            MultilineText::Single(text) => text,
        }
    }
}

#[derive(Deserialize)]
struct RawOutput {
    #[serde(default)]
    output_type: String,
    #[serde(default)]
    text: Option<MultilineText>,
    #[serde(default)]
    data: Option<serde_json::Map<String, JsonValue>>,
    #[serde(default)]
    ename: Option<String>,
    #[serde(default)]
    evalue: Option<String>,
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: MultilineText,
    #[serde(default)]
    outputs: Vec<RawOutput>,
}

#[derive(Deserialize)]
struct RawNotebook {
    #[serde(default)]
    cells: Vec<RawCell>,
}

/// 解析笔记本，返回单元格列表
pub fn parse_notebook(bytes: &[u8]) -> Result<Vec<NotebookCell>, String> {
    let notebook: RawNotebook =
        serde_json::from_slice(bytes).map_err(|e| format!("笔记本 JSON 无效: {}", e))?;

    let cells = notebook
        .cells
        .into_iter()
        .filter_map(|cell| {
            let kind = match cell.cell_type.as_str() {
                "code" => CellKind::Code,
                "markdown" => CellKind::Markdown,
                _ => return None,
            };
            let outputs = match kind {
                CellKind::Code => cell.outputs.into_iter().filter_map(output_text).collect(),
                CellKind::Markdown => Vec::new(),
            };
            Some(NotebookCell {
                kind,
                source: cell.source.into_string(),
                outputs,
            })
        })
        .collect();

    Ok(cells)
}

fn output_text(output: RawOutput) -> Option<String> {
    match output.output_type.as_str() {
        "stream" => output.text.map(MultilineText::into_string),
        "execute_result" | "display_data" => {
            let plain = output.data?.remove("text/plain")?;
            serde_json::from_value::<MultilineText>(plain)
                .ok()
                .map(MultilineText::into_string)
        }
        "error" => Some(format!(
            "{}: {}",
            output.ename.unwrap_or_default(),
            output.evalue.unwrap_or_default()
        )),
        _ => None,
    }
}

/// 把单元格序列化为一段文本，供 LLM 阅读
pub fn render_cells(cells: &[NotebookCell]) -> String {
    cells
        .iter()
        .map(|cell| {
            let mut block = format!("[{}]\n{}", cell.kind.label(), cell.source.trim_end());
            for output in &cell.outputs {
                block.push_str("\n[output]\n");
                block.push_str(output.trim_end());
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
