//! Source manifest reader.
//!
//! The manifest is a JSON document with `images`, `annotations` and
//! `categories` collections. Every field the pipeline relies on is required
//! and typed; a missing or mistyped field is a parse error before any
//! conversion starts. Extra keys (`info`, `licenses`, `segmentation`, ...)
//! are ignored.
//!
//! # Box encoding
//!
//! The default encoding is corner based, `[x_min, y_min, x_max, y_max]` in
//! absolute pixels. Standard COCO exports use `[x, y, width, height]`
//! instead; pass [`BBoxFormat::Xywh`] for those and the boxes are turned
//! into corners on load.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::model::{Annotation, Category, Dataset, Image};
use super::{AnnotationId, BBoxXYXY, CategoryId, ImageId, Pixel};
use crate::error::PrepError;

/// How the four numbers of a source `bbox` are laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BBoxFormat {
    /// `[x_min, y_min, x_max, y_max]`
    #[default]
    Xyxy,
    /// `[x, y, width, height]` (standard COCO)
    Xywh,
}

// ============================================================================
// Source schema types (internal to this module)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SourceManifest {
    images: Vec<SourceImage>,
    annotations: Vec<SourceAnnotation>,
    categories: Vec<SourceCategory>,
}

#[derive(Debug, Deserialize)]
struct SourceImage {
    id: u64,
    file_name: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct SourceAnnotation {
    id: u64,
    image_id: u64,
    category_id: u64,
    bbox: [f64; 4],
    area: f64,
    iscrowd: u8,
}

#[derive(Debug, Deserialize)]
struct SourceCategory {
    id: u64,
    name: String,
    supercategory: String,
}

// ============================================================================
// Public API
// ============================================================================

/// Reads the source manifest from a JSON file.
///
/// # Errors
/// Returns [`PrepError::Io`] if the file cannot be opened and
/// [`PrepError::CocoJsonParse`] if it is not a structurally valid manifest.
pub fn read_coco_json(path: &Path, format: BBoxFormat) -> Result<Dataset, PrepError> {
    let file = File::open(path).map_err(PrepError::Io)?;
    let reader = BufReader::new(file);

    let manifest: SourceManifest =
        serde_json::from_reader(reader).map_err(|source| PrepError::CocoJsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(manifest_to_dataset(manifest, format))
}

/// Reads the source manifest from a JSON string.
pub fn from_coco_str(json: &str, format: BBoxFormat) -> Result<Dataset, serde_json::Error> {
    let manifest: SourceManifest = serde_json::from_str(json)?;
    Ok(manifest_to_dataset(manifest, format))
}

/// Reads the source manifest from raw bytes.
pub fn from_coco_slice(bytes: &[u8], format: BBoxFormat) -> Result<Dataset, serde_json::Error> {
    let manifest: SourceManifest = serde_json::from_slice(bytes)?;
    Ok(manifest_to_dataset(manifest, format))
}

fn manifest_to_dataset(manifest: SourceManifest, format: BBoxFormat) -> Dataset {
    let images = manifest
        .images
        .into_iter()
        .map(|img| Image::new(ImageId::new(img.id), img.file_name, img.width, img.height))
        .collect();

    let categories = manifest
        .categories
        .into_iter()
        .map(|cat| Category::new(CategoryId::new(cat.id), cat.name, cat.supercategory))
        .collect();

    let annotations = manifest
        .annotations
        .into_iter()
        .map(|ann| {
            let [a, b, c, d] = ann.bbox;
            let bbox = match format {
                BBoxFormat::Xyxy => BBoxXYXY::<Pixel>::from_xyxy(a, b, c, d),
                BBoxFormat::Xywh => BBoxXYXY::<Pixel>::from_xywh(a, b, c, d),
            };

            Annotation {
                id: AnnotationId::new(ann.id),
                image_id: ImageId::new(ann.image_id),
                category_id: CategoryId::new(ann.category_id),
                bbox,
                area: ann.area,
                iscrowd: ann.iscrowd,
            }
        })
        .collect();

    Dataset {
        images,
        annotations,
        categories,
    }
}
