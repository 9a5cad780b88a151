mod common;

use std::sync::Arc;

use classroom_autograder::infrastructure::DownloadCache;
use classroom_autograder::models::Attachment;
use classroom_autograder::services::AttachmentExtractor;
use classroom_autograder::AppError;
use common::FakeStorage;

const NOTEBOOK: &str = r##"{
    "nbformat": 4,
    "cells": [
        {"cell_type": "markdown", "source": ["# Lista 1\n", "Questão sobre soma"]},
        {"cell_type": "code", "source": ["def soma(a, b):\n", "    return a + b"], "outputs": []},
        {"cell_type": "code", "source": "print(soma(1, 2))",
         "outputs": [{"output_type": "stream", "name": "stdout", "text": "3\n"}]}
    ]
}"##;

fn attachment(json: &str) -> Attachment {
    serde_json::from_str(json).unwrap()
}

fn extractor(storage: Arc<FakeStorage>, dir: &std::path::Path) -> AttachmentExtractor {
    AttachmentExtractor::new(storage, Arc::new(DownloadCache::new(dir.join("downloads"))))
}

#[tokio::test]
async fn test_notebook_cells_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FakeStorage::with_files(&[("NB1", NOTEBOOK.as_bytes())]));
    let extractor = extractor(storage.clone(), dir.path());

    let text = extractor
        .extract(&attachment(r#"{"driveFile": {"id": "NB1", "title": "lista1.ipynb"}}"#))
        .await
        .unwrap();

    assert!(text.starts_with("lista1.ipynb\n"));
    let md = text.find("Questão sobre soma").unwrap();
    let first = text.find("return a + b").unwrap();
    let second = text.find("print(soma(1, 2))").unwrap();
    assert!(md < first && first < second);
    assert!(text.contains("[output]\n3"));
}

#[tokio::test]
async fn test_second_extraction_uses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FakeStorage::with_files(&[("F1", b"print('oi')".as_slice())]));
    let extractor = extractor(storage.clone(), dir.path());
    let file = attachment(r#"{"driveFile": {"id": "F1", "title": "oi.py"}}"#);

    let first = extractor.extract(&file).await.unwrap();
    let second = extractor.extract(&file).await.unwrap();

    assert_eq!(first, "oi.py\nprint('oi')");
    assert_eq!(first, second);
    assert_eq!(storage.download_count("F1"), 1);
}

#[tokio::test]
async fn test_existing_cache_file_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let downloads = dir.path().join("downloads");
    std::fs::create_dir_all(&downloads).unwrap();
    std::fs::write(downloads.join("F1_oi.py"), "print('do cache')").unwrap();

    let storage = Arc::new(FakeStorage::default());
    let extractor = extractor(storage.clone(), dir.path());

    let text = extractor
        .extract(&attachment(r#"{"driveFile": {"id": "F1", "title": "oi.py"}}"#))
        .await
        .unwrap();

    assert_eq!(text, "oi.py\nprint('do cache')");
    assert_eq!(storage.total_downloads(), 0);
}

#[tokio::test]
async fn test_latin1_file_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    // "Questão" em Latin-1
    let bytes: &[u8] = b"Quest\xe3o 1";
    let storage = Arc::new(FakeStorage::with_files(&[("F2", bytes)]));
    let extractor = extractor(storage, dir.path());

    let text = extractor
        .extract(&attachment(r#"{"driveFile": {"id": "F2", "title": "q.txt"}}"#))
        .await
        .unwrap();
    assert_eq!(text, "q.txt\nQuestão 1");
}

#[tokio::test]
async fn test_non_file_attachments_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FakeStorage::default());
    let extractor = extractor(storage.clone(), dir.path());

    for json in [
        r#"{"youTubeVideo": {"id": "v1", "title": "Aula"}}"#,
        r#"{"link": {"url": "https://exemplo.com"}}"#,
        r#"{"form": {"formUrl": "https://forms.exemplo.com/1"}}"#,
        r#"{}"#,
    ] {
        assert_eq!(extractor.extract(&attachment(json)).await.unwrap(), "");
    }
    assert_eq!(storage.total_downloads(), 0);
}

#[tokio::test]
async fn test_shared_material_file_and_download_error() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FakeStorage::with_files(&[("M1", b"enunciado".as_slice())]));
    let extractor = extractor(storage.clone(), dir.path());

    let shared = attachment(
        r#"{"driveFile": {"driveFile": {"id": "M1", "title": "enunciado.md"}, "shareMode": "VIEW"}}"#,
    );
    assert_eq!(
        extractor.extract(&shared).await.unwrap(),
        "enunciado.md\nenunciado"
    );

    let missing = attachment(r#"{"driveFile": {"id": "NOPE", "title": "x.py"}}"#);
    let err = extractor.extract(&missing).await.unwrap_err();
    assert!(matches!(err, AppError::Download { ref file_id, .. } if file_id == "NOPE"));
    assert!(!dir.path().join("downloads").join("NOPE_x.py").exists());
}

#[tokio::test]
async fn test_extract_all_joins_with_blank_line() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FakeStorage::with_files(&[
        ("A", b"a = 1".as_slice()),
        ("B", b"b = 2".as_slice()),
    ]));
    let extractor = extractor(storage, dir.path());

    let attachments = vec![
        attachment(r#"{"driveFile": {"id": "A", "title": "a.py"}}"#),
        attachment(r#"{"link": {"url": "https://exemplo.com"}}"#),
        attachment(r#"{"driveFile": {"id": "B", "title": "b.py"}}"#),
    ];
    let text = extractor.extract_all(&attachments).await.unwrap();
    assert_eq!(text, "a.py\na = 1\n\nb.py\nb = 2");
}
