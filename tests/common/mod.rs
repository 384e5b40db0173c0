#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{ImageFormat, RgbImage};
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Writes a solid PNG of the given size, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]))
        .save_with_format(path, ImageFormat::Png)
        .expect("write png");
}

/// A small source dataset: four images (one without annotations), two
/// categories, one annotation with an unlisted category and one that points
/// at a missing image.
pub const SAMPLE_MANIFEST: &str = r#"{
    "info": {"description": "fixture"},
    "images": [
        {"id": 1, "file_name": "001.png", "width": 100, "height": 50},
        {"id": 2, "file_name": "002.png", "width": 40, "height": 40},
        {"id": 3, "file_name": "003.png", "width": 20, "height": 10},
        {"id": 4, "file_name": "004.png", "width": 30, "height": 30}
    ],
    "annotations": [
        {"id": 1, "image_id": 1, "category_id": 1, "bbox": [10, 10, 30, 20], "area": 200, "iscrowd": 0},
        {"id": 2, "image_id": 2, "category_id": 2, "bbox": [0, 0, 40, 20], "area": 800, "iscrowd": 0},
        {"id": 3, "image_id": 2, "category_id": 1, "bbox": [10, 10, 20, 30], "area": 200, "iscrowd": 1},
        {"id": 4, "image_id": 3, "category_id": 9, "bbox": [0, 0, 10, 10], "area": 100, "iscrowd": 0},
        {"id": 5, "image_id": 77, "category_id": 1, "bbox": [0, 0, 1, 1], "area": 1, "iscrowd": 0}
    ],
    "categories": [
        {"id": 1, "name": "person", "supercategory": "human"},
        {"id": 2, "name": "bicycle", "supercategory": "vehicle"}
    ]
}"#;

/// Writes [`SAMPLE_MANIFEST`] and its images under `root`.
/// Returns `(manifest path, images dir)`.
pub fn create_sample_source(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let manifest = root.join("coco.json");
    let images_dir = root.join("images");
    fs::create_dir_all(&images_dir).expect("create images dir");
    fs::write(&manifest, SAMPLE_MANIFEST).expect("write manifest");

    write_png(&images_dir.join("001.png"), 100, 50);
    write_png(&images_dir.join("002.png"), 40, 40);
    write_png(&images_dir.join("003.png"), 20, 10);
    write_png(&images_dir.join("004.png"), 30, 30);

    (manifest, images_dir)
}

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}
