//! Source image lookup and JPEG output.
//!
//! Images are resolved to files up front (so a missing file fails the run
//! before anything is written) but only decoded when their partition is
//! persisted.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::PrepError;
use crate::ir::{Image, ImageId};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Anything the partition writer can store as `<id>.jpg`.
pub trait SampleImage {
    fn write_jpeg(&self, dest: &Path) -> Result<(), PrepError>;
}

/// An image file on disk, optionally shrunk on output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImageFile {
    pub path: PathBuf,
    /// Longest output side in pixels; larger images are scaled down keeping
    /// their aspect ratio.
    pub max_side: Option<u32>,
}

impl SampleImage for SourceImageFile {
    fn write_jpeg(&self, dest: &Path) -> Result<(), PrepError> {
        let decoded = image::open(&self.path).map_err(|source| PrepError::ImageDecode {
            path: self.path.clone(),
            source,
        })?;

        let resized = match self.max_side {
            Some(max_side) => shrink_to_fit(decoded, max_side),
            None => decoded,
        };

        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(resized.to_rgb8())
            .save_with_format(dest, ImageFormat::Jpeg)
            .map_err(|source| PrepError::ImageEncode {
                path: dest.to_path_buf(),
                source,
            })
    }
}

fn shrink_to_fit(image: DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if max_side == 0 || width.max(height) <= max_side {
        return image;
    }
    image.resize(max_side, max_side, FilterType::Triangle)
}

/// Maps every source image to its file under `images_dir`.
///
/// `file_name` is tried relative to `images_dir` first; if that misses, the
/// directory is walked once and the image is matched by its base name. The
/// declared width/height are compared with the file header and a mismatch
/// is logged (labels are normalized with the declared size).
///
/// # Errors
/// [`PrepError::ImageNotFound`] for the first image without a file,
/// [`PrepError::ImageDimensionRead`] if a file header cannot be read.
pub fn resolve_image_files(
    images: &[Image],
    images_dir: &Path,
    max_side: Option<u32>,
) -> Result<BTreeMap<ImageId, SourceImageFile>, PrepError> {
    if !images_dir.is_dir() {
        return Err(PrepError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("images directory {} does not exist", images_dir.display()),
        )));
    }

    let mut by_basename: Option<HashMap<String, PathBuf>> = None;
    let mut resolved = BTreeMap::new();

    for image in images {
        let direct = images_dir.join(&image.file_name);
        let path = if direct.is_file() {
            direct
        } else {
            if by_basename.is_none() {
                by_basename = Some(index_by_basename(images_dir)?);
            }
            let basename = Path::new(&image.file_name)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            by_basename
                .as_ref()
                .and_then(|index| index.get(&basename))
                .cloned()
                .ok_or_else(|| PrepError::ImageNotFound {
                    image_id: image.id,
                    file_name: image.file_name.clone(),
                    images_dir: images_dir.to_path_buf(),
                })?
        };

        check_dimensions(image, &path)?;
        resolved.insert(image.id, SourceImageFile { path, max_side });
    }

    Ok(resolved)
}

fn check_dimensions(image: &Image, path: &Path) -> Result<(), PrepError> {
    let size = imagesize::size(path).map_err(|source| PrepError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    if size.width != image.width as usize || size.height != image.height as usize {
        warn!(
            "image {} is declared {}x{} but {} is {}x{}",
            image.id,
            image.width,
            image.height,
            path.display(),
            size.width,
            size.height
        );
    }
    Ok(())
}

fn index_by_basename(root: &Path) -> Result<HashMap<String, PathBuf>, PrepError> {
    let mut index = HashMap::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| PrepError::ImageTraversal {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() || !has_image_extension(entry.path()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if index.contains_key(&name) {
            debug!(
                "ignoring {}: an image named '{}' was found earlier",
                entry.path().display(),
                name
            );
            continue;
        }
        index.insert(name, entry.path().to_path_buf());
    }

    Ok(index)
}

fn has_image_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}
