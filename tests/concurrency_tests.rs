//! Concurrent uploads and saves share the content root and the backend
//! without coordinating with each other.

use std::collections::HashSet;
use std::sync::Arc;

use annotator::{
    upload_images, AnnotationStore, ImageIngestor, ImageStore, InMemoryBackend, IngestConfig,
    UploadedFile,
};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_uploads_never_share_a_file_name() {
    let dir = TempDir::new().unwrap();
    let ingestor = Arc::new(
        ImageIngestor::new(IngestConfig::with_content_root(dir.path().join("uploads")))
            .expect("valid ingest config"),
    );
    let images = ImageStore::new(Arc::new(InMemoryBackend::new()), "http://localhost:5000");

    let handles: Vec<_> = (0..8u8)
        .map(|task| {
            let ingestor = Arc::clone(&ingestor);
            let images = images.clone();
            tokio::spawn(async move {
                let files = vec![
                    UploadedFile::new("a.jpg", vec![task, 0]),
                    UploadedFile::new("b.jpg", vec![task, 1]),
                ];
                upload_images(&ingestor, &images, files)
                    .await
                    .expect("upload should succeed")
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    let names: HashSet<_> = all.iter().map(|r| r.file_name.clone()).collect();
    assert_eq!(names.len(), 16, "every stored file must get its own name");
    assert_eq!(images.list_all().await.unwrap().len(), 16);

    // Each file still holds the bytes of the upload that created it.
    let contents: HashSet<Vec<u8>> = all
        .iter()
        .map(|r| std::fs::read(&r.path).unwrap())
        .collect();
    assert_eq!(contents.len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bounding_box_saves_are_all_kept() {
    let store = AnnotationStore::new(Arc::new(InMemoryBackend::new()));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .save(
                        vec![format!("/uploads/img{i}.png")],
                        vec![json!({"x": i, "label": "box"})],
                    )
                    .await
                    .expect("save should succeed")
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(store.list_all().await.unwrap().len(), 20);
}
