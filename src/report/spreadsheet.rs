//! 成绩表导出（xlsx）

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::AppResult;
use crate::report::StudentRow;

pub const HEADERS: [&str; 6] = ["Name", "Email", "Grade", "Status", "Submission Date", "Late"];

/// 按给定顺序写入成绩行，首行为加粗表头
pub fn write_rows(path: &Path, rows: &[&StudentRow]) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Grades")?;

    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let submitted = row
            .submitted_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        worksheet.write_string(r, 0, &row.name)?;
        worksheet.write_string(r, 1, &row.email)?;
        worksheet.write_number(r, 2, row.grade)?;
        worksheet.write_string(r, 3, row.state.as_str())?;
        worksheet.write_string(r, 4, submitted)?;
        worksheet.write_string(r, 5, if row.late { "yes" } else { "no" })?;
    }

    worksheet.autofit();
    workbook.save(path)?;

    info!("📑 成绩表已导出: {}", path.display());
    Ok(())
}
