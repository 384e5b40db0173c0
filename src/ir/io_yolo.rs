//! YOLO dataset writer.
//!
//! Produces the Ultralytics-style tree for a split dataset:
//!
//! ```text
//! <root>/
//!   images/{train,validation,test}/<id>.jpg
//!   labels/{train,validation,test}/<id>.txt
//!   data.yaml
//! ```
//!
//! Image and label files for one sample share the image id as base name.
//! Every image gets a label file, empty if it has no annotations. Writes are
//! sequential and not transactional: on error the tree may be partially
//! written.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{ImageId, YoloAnnotation};
use crate::convert::ClassMap;
use crate::error::PrepError;
use crate::images::SampleImage;
use crate::manifest::write_manifest;
use crate::split::{DatasetSplit, Partition, PartitionKind};

const IMAGE_EXTENSION: &str = "jpg";
const LABEL_EXTENSION: &str = "txt";

/// Renders a label file body: one `class cx cy w h` line per row.
pub fn render_label_file(rows: &[YoloAnnotation]) -> String {
    let mut body = String::new();
    for row in rows {
        body.push_str(&row.to_label_line());
        body.push('\n');
    }
    body
}

/// `(images dir, labels dir)` of a partition under `root`.
pub fn partition_dirs(root: &Path, kind: PartitionKind) -> (PathBuf, PathBuf) {
    (
        root.join("images").join(kind.dir_name()),
        root.join("labels").join(kind.dir_name()),
    )
}

/// Path of the image file for `id` inside a partition's images dir.
pub fn image_file_path(images_dir: &Path, id: ImageId) -> PathBuf {
    images_dir.join(format!("{id}.{IMAGE_EXTENSION}"))
}

/// Path of the label file for `id` inside a partition's labels dir.
pub fn label_file_path(labels_dir: &Path, id: ImageId) -> PathBuf {
    labels_dir.join(format!("{id}.{LABEL_EXTENSION}"))
}

/// Writes all three partitions and the manifest under `output_root`.
///
/// Existing partition directories are replaced. Returns the manifest path.
pub fn write_split_dir<I: SampleImage>(
    output_root: &Path,
    split: &DatasetSplit<I>,
    class_map: &ClassMap,
) -> Result<PathBuf, PrepError> {
    fs::create_dir_all(output_root).map_err(|source| PrepError::OutputDir {
        path: output_root.to_path_buf(),
        source,
    })?;

    for kind in PartitionKind::ALL {
        let written = write_partition(output_root, kind, split.get(kind))?;
        info!("wrote {} sample(s) to {}", written, kind.dir_name());
    }

    write_manifest(output_root, class_map)
}

/// Writes one partition's images and label files. Returns the sample count.
pub fn write_partition<I: SampleImage>(
    output_root: &Path,
    kind: PartitionKind,
    partition: &Partition<I>,
) -> Result<usize, PrepError> {
    let (images_dir, labels_dir) = partition_dirs(output_root, kind);
    recreate_dir(&images_dir)?;
    recreate_dir(&labels_dir)?;

    for (id, image) in &partition.images {
        let dest = image_file_path(&images_dir, *id);
        image.write_jpeg(&dest)?;
        debug!("wrote image {}", dest.display());
    }

    for (id, rows) in &partition.labels {
        let dest = label_file_path(&labels_dir, *id);
        fs::write(&dest, render_label_file(rows)).map_err(|source| PrepError::LabelWrite {
            path: dest.clone(),
            source,
        })?;
        debug!("wrote {} label(s) to {}", rows.len(), dest.display());
    }

    Ok(partition.len())
}

fn recreate_dir(path: &Path) -> Result<(), PrepError> {
    if path.exists() {
        warn!(
            "directory {} already exists; replacing its contents",
            path.display()
        );
        fs::remove_dir_all(path).map_err(|source| output_dir_error(path, source))?;
    }
    fs::create_dir_all(path).map_err(|source| output_dir_error(path, source))
}

fn output_dir_error(path: &Path, source: std::io::Error) -> PrepError {
    PrepError::OutputDir {
        path: path.to_path_buf(),
        source,
    }
}
