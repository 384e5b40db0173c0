//! Source and target records.
//!
//! The source side mirrors the corner-box detection schema (images,
//! annotations, categories). The target side is a single YOLO row per
//! source annotation. All records are plain values; nothing mutates them
//! after loading.

use serde::Serialize;

use super::bbox::BBoxXYXY;
use super::ids::{AnnotationId, CategoryId, ClassId, ImageId};
use super::space::{Normalized, Pixel};

/// A fully loaded source dataset.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

/// An image entry of the source manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub id: ImageId,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }

    /// Returns true if either dimension is zero, which makes normalization undefined.
    pub fn has_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A category (class) entry of the source manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub supercategory: String,
}

impl Category {
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: supercategory.into(),
        }
    }
}

/// A source annotation: one box on one image.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    pub bbox: BBoxXYXY<Pixel>,
    pub area: f64,
    /// Carried through from the source; the converter ignores it.
    pub iscrowd: u8,
}

impl Annotation {
    /// Creates an annotation with area computed from the box and `iscrowd = 0`.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBoxXYXY<Pixel>,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            area: bbox.width() * bbox.height(),
            bbox,
            iscrowd: 0,
        }
    }
}

/// One YOLO label row: class index plus normalized center/size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct YoloAnnotation {
    pub class_id: ClassId,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloAnnotation {
    pub fn new(class_id: ClassId, x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            class_id,
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Builds a row from a normalized corner box.
    pub fn from_normalized(class_id: ClassId, bbox: &BBoxXYXY<Normalized>) -> Self {
        let (x_center, y_center, width, height) = bbox.to_cxcywh();
        Self::new(class_id, x_center, y_center, width, height)
    }

    /// The corner box this row describes, still normalized.
    pub fn to_normalized_bbox(&self) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_cxcywh(self.x_center, self.y_center, self.width, self.height)
    }

    /// Renders the row as `class_id x_center y_center width height`.
    pub fn to_label_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}
