//! 评分标准服务 - 业务能力层
//!
//! 每个作业只生成一次评分标准并缓存到磁盘；缓存存在时原样返回，不再调用生成器。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::CourseWork;
use crate::ports::RubricGenerator;
use crate::services::AttachmentExtractor;
use crate::utils::logging::truncate_text;

/// 评分标准服务
pub struct CriteriaProvider {
    generator: Arc<dyn RubricGenerator>,
    extractor: Arc<AttachmentExtractor>,
    cache_path: PathBuf,
}

impl CriteriaProvider {
    pub fn new(
        generator: Arc<dyn RubricGenerator>,
        extractor: Arc<AttachmentExtractor>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            extractor,
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// 获取评分标准
    ///
    /// 缓存文件存在时直接读取；否则根据作业信息和材料生成，写入缓存后返回。
    /// 生成失败会中止整个批次。
    pub async fn provide(&self, course_work: &CourseWork) -> AppResult<String> {
        if tokio::fs::try_exists(&self.cache_path).await.unwrap_or(false) {
            warn!(
                "评分标准文件已存在，将使用现有文件: {}",
                self.cache_path.display()
            );
            return tokio::fs::read_to_string(&self.cache_path)
                .await
                .map_err(|e| AppError::io(&self.cache_path, e));
        }

        info!("📝 生成评分标准...");
        let context = self.build_context(course_work).await;
        let criteria = self
            .generator
            .generate(&context)
            .await
            .map_err(AppError::RubricGeneration)?;

        if let Some(parent) = self.cache_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io(parent, e))?;
        }
        tokio::fs::write(&self.cache_path, &criteria)
            .await
            .map_err(|e| AppError::io(&self.cache_path, e))?;

        info!("✓ 评分标准已保存: {}", self.cache_path.display());
        info!("预览: {}", truncate_text(&criteria, 200));
        Ok(criteria)
    }

    /// 组装生成评分标准用的上下文
    ///
    /// 材料提取失败不会中断，只在对应位置留下占位文本。
    pub async fn build_context(&self, course_work: &CourseWork) -> String {
        let max_points = course_work
            .max_points
            .map(|p| p.to_string())
            .unwrap_or_else(|| "não definida".to_string());

        let mut context = format!(
            "# Contexto da Atividade\nTítulo: {}\nDescrição: {}\nNota Máxima: {}\n\n",
            course_work.title,
            course_work.description.as_deref().unwrap_or(""),
            max_points
        );

        if course_work.materials.is_empty() {
            return context;
        }

        context.push_str("# Materiais\n");
        for material in &course_work.materials {
            match self.extractor.extract(material).await {
                Ok(text) if text.is_empty() => continue,
                Ok(text) => context.push_str(&text),
                Err(e) => {
                    let title = material
                        .stored_file()
                        .map(|f| f.title.as_str())
                        .unwrap_or(material.kind());
                    warn!("⚠️ 材料处理失败 ({}): {}", title, e);
                    context.push_str(&format!("[Erro ao processar arquivo: {}]", title));
                }
            }
            context.push_str("\n\n");
        }

        context
    }
}

/// 读取用户指定的评分标准文件；文件不存在时报错
pub async fn load_criteria_file(path: &Path) -> AppResult<String> {
    let criteria = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::CriteriaFile {
            path: path.display().to_string(),
            source,
        })?;
    info!("✓ 使用指定的评分标准文件: {}", path.display());
    Ok(criteria)
}
