//! Corner-box annotations to YOLO rows.
//!
//! [`convert`] is a pure transform: every source image gets an entry (maybe
//! empty) keyed by its id, every annotation on a known image becomes one
//! [`YoloAnnotation`] with its box normalized to center/size form, and the
//! category is remapped through a [`ClassMap`].
//!
//! Two inputs are degraded rather than rejected:
//! - an annotation whose category is not listed gets [`ClassId::UNKNOWN`];
//! - an annotation whose image is not listed is dropped.
//!
//! Both are counted in the [`ConversionReport`]. Out-of-range boxes are passed
//! through unclamped.

mod class_map;
pub mod report;

pub use class_map::ClassMap;
pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, LabelCounts,
    SourceCounts,
};

use std::collections::{BTreeMap, HashMap};

use log::{info, warn};

use crate::error::PrepError;
use crate::ir::{Annotation, Category, ClassId, Dataset, Image, ImageId, YoloAnnotation};

/// YOLO labels grouped by image id.
pub type LabelSet = BTreeMap<ImageId, Vec<YoloAnnotation>>;

/// Result of [`convert`].
#[derive(Clone, Debug)]
pub struct Conversion {
    pub labels: LabelSet,
    pub class_map: ClassMap,
    pub report: ConversionReport,
}

/// Converts a loaded source dataset.
pub fn convert_dataset(dataset: &Dataset) -> Result<Conversion, PrepError> {
    convert(&dataset.images, &dataset.annotations, &dataset.categories)
}

/// Converts source annotations into per-image YOLO rows.
///
/// Annotations keep their input order within each image.
///
/// # Errors
/// - [`PrepError::DuplicateImageId`] if two images share an id.
/// - [`PrepError::ZeroImageDimension`] if an image has zero width or height.
/// - Category table errors from [`ClassMap::from_categories`].
pub fn convert(
    images: &[Image],
    annotations: &[Annotation],
    categories: &[Category],
) -> Result<Conversion, PrepError> {
    let class_map = ClassMap::from_categories(categories)?;

    let mut image_lookup: HashMap<ImageId, &Image> = HashMap::with_capacity(images.len());
    for image in images {
        if image.has_zero_area() {
            return Err(PrepError::ZeroImageDimension {
                image_id: image.id,
                width: image.width,
                height: image.height,
            });
        }
        if image_lookup.insert(image.id, image).is_some() {
            return Err(PrepError::DuplicateImageId(image.id));
        }
    }

    let mut labels: LabelSet = images.iter().map(|image| (image.id, Vec::new())).collect();
    let mut counts = LabelCounts {
        label_files: labels.len(),
        ..Default::default()
    };

    for ann in annotations {
        let Some(image) = image_lookup.get(&ann.image_id) else {
            counts.dropped_annotations += 1;
            continue;
        };

        let class_id = class_map.class_for(ann.category_id);
        if class_id.is_unknown() {
            counts.unknown_category_labels += 1;
        }

        let row = to_yolo(ann, image, class_id);
        if let Some(rows) = labels.get_mut(&ann.image_id) {
            rows.push(row);
            counts.labels += 1;
        }
    }

    let report = build_report(images, annotations, &class_map, &labels, counts);

    info!(
        "converted {} annotation(s) across {} image(s) into {} class(es)",
        report.output.labels,
        labels.len(),
        class_map.len()
    );

    Ok(Conversion {
        labels,
        class_map,
        report,
    })
}

/// Normalizes one source box against its image and attaches the class index.
pub fn to_yolo(annotation: &Annotation, image: &Image, class_id: ClassId) -> YoloAnnotation {
    let normalized = annotation
        .bbox
        .to_normalized(image.width as f64, image.height as f64);
    YoloAnnotation::from_normalized(class_id, &normalized)
}

fn build_report(
    images: &[Image],
    annotations: &[Annotation],
    class_map: &ClassMap,
    labels: &LabelSet,
    counts: LabelCounts,
) -> ConversionReport {
    let mut report = ConversionReport {
        input: SourceCounts {
            images: images.len(),
            categories: class_map.len(),
            annotations: annotations.len(),
        },
        ..Default::default()
    };

    if counts.dropped_annotations > 0 {
        // Kept lenient for now; an unknown image id usually means a truncated manifest.
        warn!(
            "dropped {} annotation(s) that reference unknown image ids",
            counts.dropped_annotations
        );
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DroppedUnknownImage,
            format!(
                "{} annotation(s) reference an image id that is not in the manifest and were dropped",
                counts.dropped_annotations
            ),
        ));
    }

    if counts.unknown_category_labels > 0 {
        warn!(
            "{} annotation(s) reference unknown categories and were labelled {}",
            counts.unknown_category_labels,
            ClassId::UNKNOWN
        );
        report.add(ConversionIssue::warning(
            ConversionIssueCode::UnknownCategory,
            format!(
                "{} annotation(s) reference an unlisted category and use class {}",
                counts.unknown_category_labels,
                ClassId::UNKNOWN
            ),
        ));
    }

    let missing = class_map.missing_category_count();
    if missing > 0 {
        report.add(ConversionIssue::info(
            ConversionIssueCode::CategoryIdGaps,
            format!("category ids skip {missing} value(s); class indices are not contiguous"),
        ));
    }

    let empty_images = labels.values().filter(|rows| rows.is_empty()).count();
    if empty_images > 0 {
        report.add(ConversionIssue::info(
            ConversionIssueCode::EmptyImages,
            format!("{empty_images} image(s) have no annotations and get empty label files"),
        ));
    }

    report.output = counts;
    report
}
