//! Dataset manifest (`data.yaml`) consumed by YOLO training tools.
//!
//! ```yaml
//! path: /abs/output
//! train: images/train
//! val: images/validation
//! test: images/test
//! names:
//!   0: person
//!   1: bicycle
//! ```
//!
//! `names` is built from the same [`ClassMap`] the converter used and keeps
//! category listing order; it is sparse if category ids had gaps.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::convert::ClassMap;
use crate::error::PrepError;
use crate::split::PartitionKind;

/// File name of the manifest under the output root.
pub const MANIFEST_FILE_NAME: &str = "data.yaml";

/// In-memory form of the manifest.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetManifest {
    pub path: String,
    pub train: String,
    pub val: String,
    pub test: String,
    #[serde(serialize_with = "serialize_names")]
    pub names: Vec<(i64, String)>,
}

impl DatasetManifest {
    /// Assembles the manifest for a dataset rooted at `root`.
    ///
    /// `root` is written as given; [`write_manifest`] passes the canonical
    /// absolute path.
    pub fn new(root: &Path, class_map: &ClassMap) -> Self {
        Self {
            path: root.to_string_lossy().into_owned(),
            train: images_rel_path(PartitionKind::Train),
            val: images_rel_path(PartitionKind::Validation),
            test: images_rel_path(PartitionKind::Test),
            names: class_map
                .names()
                .map(|(class_id, name)| (class_id.as_i64(), name.to_string()))
                .collect(),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Relative path of a partition's images directory, e.g. `images/validation`.
pub fn images_rel_path(kind: PartitionKind) -> String {
    format!("images/{}", kind.dir_name())
}

/// Writes `data.yaml` under `output_root` and returns its path.
///
/// `output_root` must already exist so it can be canonicalized.
pub fn write_manifest(output_root: &Path, class_map: &ClassMap) -> Result<PathBuf, PrepError> {
    let absolute_root = fs::canonicalize(output_root).map_err(|source| PrepError::OutputDir {
        path: output_root.to_path_buf(),
        source,
    })?;
    let manifest = DatasetManifest::new(&absolute_root, class_map);
    let path = output_root.join(MANIFEST_FILE_NAME);

    let yaml = manifest
        .to_yaml_string()
        .map_err(|source| PrepError::ManifestWrite {
            path: path.clone(),
            source,
        })?;
    fs::write(&path, yaml).map_err(|source| PrepError::ManifestIo {
        path: path.clone(),
        source,
    })?;

    info!(
        "wrote manifest {} with {} class name(s)",
        path.display(),
        manifest.names.len()
    );
    Ok(path)
}

fn serialize_names<S: Serializer>(names: &[(i64, String)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(names.len()))?;
    for (class_id, name) in names {
        map.serialize_entry(class_id, name)?;
    }
    map.end()
}
