use std::path::PathBuf;
use thiserror::Error;

use crate::ir::{CategoryId, ImageId};

/// The main error type for yoloprep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse source annotations from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write dataset manifest to {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write dataset manifest {path}: {source}")]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render report: {0}")]
    ReportRender(#[source] serde_json::Error),

    #[error("Duplicate image id {0}")]
    DuplicateImageId(ImageId),

    #[error("Duplicate category id {0}")]
    DuplicateCategoryId(CategoryId),

    #[error("Invalid category id {id}: category ids must be between 1 and 2^63 - 1")]
    InvalidCategoryId { id: CategoryId },

    #[error("Image {image_id} has zero-area dimensions {width}x{height}")]
    ZeroImageDimension {
        image_id: ImageId,
        width: u32,
        height: u32,
    },

    #[error("Invalid option: {message}")]
    InvalidOption { message: String },

    #[error("Invalid split parameters: {message}")]
    InvalidSplitParams { message: String },

    #[error("Split failed: {message}")]
    SplitFailed { message: String },

    #[error("Image {image_id} has no matching annotation group (or vice versa)")]
    SplitKeyMismatch { image_id: ImageId },

    #[error("Image file '{file_name}' for image {image_id} not found under {images_dir}")]
    ImageNotFound {
        image_id: ImageId,
        file_name: String,
        images_dir: PathBuf,
    },

    #[error("Failed while scanning image directory {path}: {source}")]
    ImageTraversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image {path}: {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write label file {path}: {source}")]
    LabelWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
