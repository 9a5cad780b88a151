//! 运行结束后的成绩汇总

use std::path::Path;

use crate::error::AppResult;
use crate::report::spreadsheet;
use crate::report::{PipelineStats, StudentRow};

/// 分布区间数
pub const BUCKET_COUNT: usize = 5;

/// 作业没有满分时使用的刻度
pub const DEFAULT_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// 占已评分人数的百分比
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub graded: usize,
    pub errors: usize,
    /// 错误条数 / 提交总数，百分比
    pub error_rate: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub histogram: Vec<HistogramBucket>,
}

impl ReportSummary {
    /// 控制台输出用，每行一条
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("📋 提交总数: {}", self.total),
            format!("✅ 已评分: {}", self.graded),
            format!("❌ 错误: {} (错误率 {:.1}%)", self.errors, self.error_rate),
            format!(
                "📈 平均分: {:.2} | 最高: {:.2} | 最低: {:.2}",
                self.mean, self.max, self.min
            ),
            "📊 成绩分布:".to_string(),
        ];

        let last = self.histogram.len().saturating_sub(1);
        for (i, bucket) in self.histogram.iter().enumerate() {
            let close = if i == last { ']' } else { ')' };
            lines.push(format!(
                "  [{:.1} - {:.1}{}: {} ({:.1}%)",
                bucket.lower, bucket.upper, close, bucket.count, bucket.percent
            ));
        }
        lines
    }
}

/// 报表生成器
pub struct ReportBuilder<'a> {
    stats: &'a PipelineStats,
    scale: f64,
}

impl<'a> ReportBuilder<'a> {
    /// `grade_scale` 取自 `CourseWork::grade_scale`，为空时使用默认刻度
    pub fn new(stats: &'a PipelineStats, grade_scale: Option<f64>) -> Self {
        let scale = grade_scale.unwrap_or(DEFAULT_SCALE);
        Self { stats, scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 没有任何学生拿到成绩时返回 `None`
    pub fn summary(&self) -> Option<ReportSummary> {
        if self.stats.rows.is_empty() {
            return None;
        }

        let graded = self.stats.graded();
        let sum: f64 = self.stats.grades().sum();
        let max = self.stats.grades().fold(f64::MIN, f64::max);
        let min = self.stats.grades().fold(f64::MAX, f64::min);
        let total = self.stats.total.max(graded);

        Some(ReportSummary {
            total,
            graded,
            errors: self.stats.errors,
            error_rate: self.stats.errors as f64 * 100.0 / total as f64,
            mean: sum / graded as f64,
            max,
            min,
            histogram: self.histogram(),
        })
    }

    fn histogram(&self) -> Vec<HistogramBucket> {
        let width = self.scale / BUCKET_COUNT as f64;
        let mut counts = [0usize; BUCKET_COUNT];
        for grade in self.stats.grades() {
            // 最后一个区间是闭区间，超过满分的也算进去
            let idx = ((grade / width).floor().max(0.0) as usize).min(BUCKET_COUNT - 1);
            counts[idx] += 1;
        }

        let graded = self.stats.graded().max(1) as f64;
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| HistogramBucket {
                lower: i as f64 * width,
                upper: (i + 1) as f64 * width,
                count,
                percent: count as f64 * 100.0 / graded,
            })
            .collect()
    }

    /// 按姓名排序（不区分大小写）的成绩行
    pub fn sorted_rows(&self) -> Vec<&'a StudentRow> {
        let mut rows: Vec<&StudentRow> = self.stats.rows.iter().collect();
        rows.sort_by_key(|r| r.name.to_lowercase());
        rows
    }

    /// 导出成绩表；没有成绩时不生成文件并返回 `false`
    pub fn write_spreadsheet(&self, path: &Path) -> AppResult<bool> {
        if self.stats.rows.is_empty() {
            return Ok(false);
        }
        spreadsheet::write_rows(path, &self.sorted_rows())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionState;

    fn row(name: &str, grade: f64) -> StudentRow {
        StudentRow {
            name: name.to_string(),
            email: format!("{}@aluno.edu", name.to_lowercase()),
            grade,
            state: SubmissionState::TurnedIn,
            submitted_at: None,
            late: false,
        }
    }

    fn stats(grades: &[(&str, f64)], total: usize, errors: usize) -> PipelineStats {
        PipelineStats {
            total,
            rows: grades.iter().map(|(n, g)| row(n, *g)).collect(),
            errors,
        }
    }

    #[test]
    fn test_no_grades_no_report() {
        let stats = stats(&[], 3, 3);
        let builder = ReportBuilder::new(&stats, Some(10.0));
        assert!(builder.summary().is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        assert!(!builder.write_spreadsheet(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_summary_values() {
        let stats = stats(&[("Ana", 10.0), ("Bruno", 4.0), ("Caio", 7.0)], 4, 1);
        let summary = ReportBuilder::new(&stats, Some(10.0)).summary().unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.graded, 3);
        assert_eq!(summary.error_rate, 25.0);
        assert_eq!(summary.mean, 7.0);
        assert_eq!(summary.max, 10.0);
        assert_eq!(summary.min, 4.0);
    }

    #[test]
    fn test_histogram_buckets() {
        // 满分 10：区间宽 2，10 分落在最后一个闭区间
        let stats = stats(
            &[("a", 0.0), ("b", 1.9), ("c", 2.0), ("d", 9.5), ("e", 10.0), ("f", 12.0)],
            6,
            0,
        );
        let summary = ReportBuilder::new(&stats, Some(10.0)).summary().unwrap();
        let counts: Vec<usize> = summary.histogram.iter().map(|b| b.count).collect();

        assert_eq!(counts, vec![2, 1, 0, 0, 3]);
        assert_eq!(summary.histogram[4].upper, 10.0);
        assert_eq!(summary.histogram[0].percent, 2.0 * 100.0 / 6.0);
    }

    #[test]
    fn test_scale_falls_back_when_no_max_points() {
        let stats = stats(&[("a", 5.0)], 1, 0);
        assert_eq!(ReportBuilder::new(&stats, None).scale(), DEFAULT_SCALE);
        assert_eq!(ReportBuilder::new(&stats, Some(100.0)).scale(), 100.0);

        let ungraded: crate::models::CourseWork = serde_json::from_str(
            r#"{"courseId": "c", "id": "a", "title": "t", "maxPoints": 0}"#,
        )
        .unwrap();
        assert_eq!(
            ReportBuilder::new(&stats, ungraded.grade_scale()).scale(),
            DEFAULT_SCALE
        );
    }

    #[test]
    fn test_rows_sorted_case_insensitive() {
        let stats = stats(&[("bruno", 1.0), ("Ana", 2.0), ("Álvaro", 3.0), ("caio", 4.0)], 4, 0);
        let builder = ReportBuilder::new(&stats, None);
        let names: Vec<&str> = builder.sorted_rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "bruno", "caio", "Álvaro"]);
    }

    #[test]
    fn test_render_lines() {
        let stats = stats(&[("Ana", 8.0)], 1, 0);
        let lines = ReportBuilder::new(&stats, Some(10.0))
            .summary()
            .unwrap()
            .render_lines();
        assert!(lines.iter().any(|l| l.contains("平均分: 8.00")));
        assert!(lines.last().unwrap().contains("[8.0 - 10.0]: 1 (100.0%)"));
    }
}
