//! 下载缓存 - 基础设施层
//!
//! 持有磁盘上的下载目录，保证同一个文件在多次运行之间最多下载一次。
//!
//! - 每个缓存键一把异步锁，并发的 worker 不会重复下载同一个文件
//! - 先写临时文件再 rename，中途失败不会留下半个文件

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::utils::sanitize_string;

/// 缓存读取结果
#[derive(Debug)]
pub struct CachedBytes {
    pub bytes: Vec<u8>,
    /// 是否直接命中磁盘缓存
    pub hit: bool,
}

pub struct DownloadCache {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    tmp_counter: AtomicU64,
}

impl DownloadCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// 缓存键：`{file_id}_{清理后的标题}`
    pub fn cache_key(file_id: &str, title: &str) -> String {
        format!("{}_{}", file_id, sanitize_string(title))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// 读取缓存；不存在时调用 `fetch` 下载并写入缓存
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> AppResult<CachedBytes>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Vec<u8>>>,
    {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;

        let path = self.path_for(key);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("命中下载缓存: {}", path.display());
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| AppError::io(&path, e))?;
            return Ok(CachedBytes { bytes, hit: true });
        }

        let bytes = fetch().await?;
        self.persist(&path, key, &bytes).await?;
        Ok(CachedBytes { bytes, hit: false })
    }

    async fn persist(&self, path: &Path, key: &str, bytes: &[u8]) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::io(&self.dir, e))?;

        let seq = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{}.{}.{}.part", key, std::process::id(), seq));

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AppError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::io(path, e));
        }

        debug!("已写入下载缓存: {} ({} 字节)", path.display(), bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cache_key_sanitizes_title() {
        assert_eq!(DownloadCache::cache_key("F1", "Trabalho final.ipynb"), "F1_Trabalho_final.ipynb");
    }

    #[tokio::test]
    async fn test_second_read_hits_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DownloadCache::new(dir.path().join("downloads"));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("F1_a.txt", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(b"conteudo".to_vec())
            })
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("F1_a.txt", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(b"outro".to_vec())
            })
            .await
            .unwrap();

        assert!(!first.hit);
        assert!(second.hit);
        assert_eq!(second.bytes, b"conteudo");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DownloadCache::new(dir.path());

        let result = cache
            .get_or_fetch("F9_x.txt", || async { Err(AppError::Other("falhou".into())) })
            .await;

        assert!(result.is_err());
        assert!(!cache.path_for("F9_x.txt").exists());
    }

    #[tokio::test]
    async fn test_concurrent_fetches_download_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(DownloadCache::new(dir.path()));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("F1_shared.txt", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok(b"x".to_vec())
                    })
                    .await
                    .map(|c| c.bytes)
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), b"x");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
