//! Seeded train/validation/test partitioning.
//!
//! The split works on image ids, never on individual annotations: each
//! image travels together with its label group. Two shuffle-then-slice
//! passes are made with the same seed, first carving a holdout group of
//! `val + test` off the full set, then carving the test share off the
//! holdout. The split is not stratified by class.
//!
//! Input maps are keyed by [`ImageId`] in a `BTreeMap`, so the order the
//! shuffle starts from is always ascending id order and the result depends
//! only on the id set, the ratios and the seed.

use std::collections::BTreeMap;

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::convert::LabelSet;
use crate::error::PrepError;
use crate::ir::{ImageId, YoloAnnotation};

/// Default seed used by the CLI.
pub const DEFAULT_SEED: u64 = 33;

/// Nominal validation and test fractions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitRatios {
    val: f64,
    test: f64,
}

impl SplitRatios {
    /// Validates and builds a ratio pair.
    ///
    /// # Errors
    /// [`PrepError::InvalidSplitParams`] unless both fractions are finite and
    /// non-negative and `0 < val + test < 1`.
    pub fn new(val: f64, test: f64) -> Result<Self, PrepError> {
        if !val.is_finite() || !test.is_finite() || val < 0.0 || test < 0.0 {
            return Err(PrepError::InvalidSplitParams {
                message: format!(
                    "validation and test fractions must be non-negative numbers (got {val}, {test})"
                ),
            });
        }

        let holdout = val + test;
        if !(0.0 < holdout && holdout < 1.0) {
            return Err(PrepError::InvalidSplitParams {
                message: format!(
                    "validation + test fraction must be in the interval (0.0, 1.0) (got {holdout})"
                ),
            });
        }

        Ok(Self { val, test })
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn test(&self) -> f64 {
        self.test
    }

    /// Fraction of the whole set that leaves the training partition.
    pub fn holdout(&self) -> f64 {
        self.val + self.test
    }

    /// Fraction of the holdout group that becomes the test partition.
    pub fn test_share_of_holdout(&self) -> f64 {
        self.test / self.holdout()
    }
}

/// The three partition names, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    Train,
    Validation,
    Test,
}

impl PartitionKind {
    pub const ALL: [PartitionKind; 3] = [
        PartitionKind::Train,
        PartitionKind::Validation,
        PartitionKind::Test,
    ];

    /// Directory name under `images/` and `labels/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            PartitionKind::Train => "train",
            PartitionKind::Validation => "validation",
            PartitionKind::Test => "test",
        }
    }
}

/// One partition: images and label groups in the same id order.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition<I> {
    pub images: Vec<(ImageId, I)>,
    pub labels: Vec<(ImageId, Vec<YoloAnnotation>)>,
}

impl<I> Default for Partition<I> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl<I> Partition<I> {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image ids in partition order.
    pub fn ids(&self) -> Vec<ImageId> {
        self.images.iter().map(|(id, _)| *id).collect()
    }

    fn from_samples(samples: Vec<Sample<I>>) -> Self {
        let mut partition = Partition {
            images: Vec::with_capacity(samples.len()),
            labels: Vec::with_capacity(samples.len()),
        };
        for sample in samples {
            partition.images.push((sample.id, sample.image));
            partition.labels.push((sample.id, sample.labels));
        }
        partition
    }
}

/// Result of [`split`].
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetSplit<I> {
    pub train: Partition<I>,
    pub validation: Partition<I>,
    pub test: Partition<I>,
}

impl<I> DatasetSplit<I> {
    pub fn get(&self, kind: PartitionKind) -> &Partition<I> {
        match kind {
            PartitionKind::Train => &self.train,
            PartitionKind::Validation => &self.validation,
            PartitionKind::Test => &self.test,
        }
    }

    pub fn counts(&self) -> SplitCounts {
        SplitCounts {
            train: self.train.len(),
            validation: self.validation.len(),
            test: self.test.len(),
        }
    }
}

/// Partition sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

struct Sample<I> {
    id: ImageId,
    image: I,
    labels: Vec<YoloAnnotation>,
}

/// Partitions images and their label groups into train/validation/test.
///
/// The same permutation is applied to both maps, so an image and its labels
/// always land in the same partition. For a fixed id set, ratios and seed
/// the result is identical across runs.
///
/// # Errors
/// - [`PrepError::SplitKeyMismatch`] if the two maps have different key sets.
/// - [`PrepError::SplitFailed`] if the input is empty or the training
///   partition would end up empty.
pub fn split<I>(
    images: BTreeMap<ImageId, I>,
    mut labels: LabelSet,
    ratios: SplitRatios,
    seed: u64,
) -> Result<DatasetSplit<I>, PrepError> {
    let mut samples = Vec::with_capacity(images.len());
    for (id, image) in images {
        let Some(rows) = labels.remove(&id) else {
            return Err(PrepError::SplitKeyMismatch { image_id: id });
        };
        samples.push(Sample {
            id,
            image,
            labels: rows,
        });
    }
    if let Some(&id) = labels.keys().next() {
        return Err(PrepError::SplitKeyMismatch { image_id: id });
    }

    let total = samples.len();
    if total == 0 {
        return Err(PrepError::SplitFailed {
            message: "no images to split".to_string(),
        });
    }

    let (train, holdout) = shuffle_slice(samples, ratios.holdout(), seed);
    if train.is_empty() {
        return Err(PrepError::SplitFailed {
            message: format!(
                "{total} image(s) with holdout fraction {} leaves the training partition empty",
                ratios.holdout()
            ),
        });
    }

    let (validation, test) = shuffle_slice(holdout, ratios.test_share_of_holdout(), seed);

    let result = DatasetSplit {
        train: Partition::from_samples(train),
        validation: Partition::from_samples(validation),
        test: Partition::from_samples(test),
    };

    let counts = result.counts();
    info!(
        "split {} image(s) with seed {}: {} train, {} validation, {} test",
        total, seed, counts.train, counts.validation, counts.test
    );

    Ok(result)
}

/// Number of items a fraction of `total` takes, rounded up.
///
/// Products that land within floating-point noise of an integer snap to it,
/// so `10 * (0.1 + 0.2)` counts as 3 rather than 4.
pub fn fraction_count(total: usize, fraction: f64) -> usize {
    let raw = total as f64 * fraction;
    let nearest = raw.round();
    let count = if (raw - nearest).abs() < 1e-9 {
        nearest
    } else {
        raw.ceil()
    };
    (count.max(0.0) as usize).min(total)
}

/// Shuffles with a fresh seeded RNG and slices off the leading
/// `fraction_count(len, fraction)` items. Returns `(rest, taken)`.
fn shuffle_slice<T>(mut items: Vec<T>, fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let take = fraction_count(items.len(), fraction);
    let rest = items.split_off(take);
    (rest, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ClassId;
    use std::collections::HashSet;

    fn inputs(n: u64) -> (BTreeMap<ImageId, String>, LabelSet) {
        let images = (1..=n)
            .map(|id| (ImageId(id), format!("{id}.jpg")))
            .collect();
        let labels = (1..=n)
            .map(|id| {
                let row = YoloAnnotation::new(ClassId(id as i64 % 3), 0.5, 0.5, 0.1, 0.1);
                (ImageId(id), vec![row; (id % 3) as usize])
            })
            .collect();
        (images, labels)
    }

    fn ratios(val: f64, test: f64) -> SplitRatios {
        SplitRatios::new(val, test).expect("valid ratios")
    }

    #[test]
    fn ten_images_split_six_two_two() {
        let (images, labels) = inputs(10);
        let result = split(images, labels, ratios(0.2, 0.2), 33).expect("split");
        assert_eq!(
            result.counts(),
            SplitCounts {
                train: 6,
                validation: 2,
                test: 2
            }
        );
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let (images, labels) = inputs(37);
        let result = split(images, labels, ratios(0.15, 0.25), 7).expect("split");

        let mut seen = HashSet::new();
        for kind in PartitionKind::ALL {
            for id in result.get(kind).ids() {
                assert!(seen.insert(id), "{id} appears twice");
            }
        }
        assert_eq!(seen.len(), 37);
    }

    #[test]
    fn labels_follow_their_image() {
        let (images, labels) = inputs(20);
        let expected = labels.clone();
        let result = split(images, labels, ratios(0.2, 0.1), 1).expect("split");

        for kind in PartitionKind::ALL {
            let partition = result.get(kind);
            let label_ids: Vec<ImageId> = partition.labels.iter().map(|(id, _)| *id).collect();
            assert_eq!(partition.ids(), label_ids);
            for ((id, image), (_, rows)) in partition.images.iter().zip(&partition.labels) {
                assert_eq!(image, &format!("{id}.jpg"));
                assert_eq!(rows, &expected[id]);
            }
        }
    }

    #[test]
    fn same_seed_same_partitions() {
        let (images, labels) = inputs(50);
        let a = split(images.clone(), labels.clone(), ratios(0.1, 0.2), 33).expect("split");
        let b = split(images, labels, ratios(0.1, 0.2), 33).expect("split");
        assert_eq!(a, b);
    }

    #[test]
    fn zero_test_fraction_sends_holdout_to_validation() {
        let (images, labels) = inputs(10);
        let result = split(images, labels, ratios(0.3, 0.0), 33).expect("split");
        assert_eq!(result.validation.len(), 3);
        assert!(result.test.is_empty());
    }

    #[test]
    fn key_mismatch_is_rejected() {
        let (images, mut labels) = inputs(4);
        labels.remove(&ImageId(3));
        let err = split(images, labels, ratios(0.25, 0.25), 33).unwrap_err();
        assert!(matches!(err, PrepError::SplitKeyMismatch { image_id } if image_id == ImageId(3)));

        let (images, mut labels) = inputs(4);
        labels.insert(ImageId(9), Vec::new());
        let err = split(images, labels, ratios(0.25, 0.25), 33).unwrap_err();
        assert!(matches!(err, PrepError::SplitKeyMismatch { image_id } if image_id == ImageId(9)));
    }

    #[test]
    fn empty_training_partition_is_rejected() {
        let (images, labels) = inputs(1);
        let err = split(images, labels, ratios(0.1, 0.1), 33).unwrap_err();
        assert!(matches!(err, PrepError::SplitFailed { .. }));

        let err = split(BTreeMap::<ImageId, ()>::new(), LabelSet::new(), ratios(0.1, 0.1), 33)
            .unwrap_err();
        assert!(matches!(err, PrepError::SplitFailed { .. }));
    }

    #[test]
    fn ratios_are_validated() {
        assert!(SplitRatios::new(0.0, 0.0).is_err());
        assert!(SplitRatios::new(0.5, 0.5).is_err());
        assert!(SplitRatios::new(-0.1, 0.3).is_err());
        assert!(SplitRatios::new(f64::NAN, 0.1).is_err());
        assert!(SplitRatios::new(0.1, 0.2).is_ok());
    }

    #[test]
    fn fraction_count_snaps_float_noise() {
        assert_eq!(fraction_count(10, 0.1 + 0.2), 3);
        assert_eq!(fraction_count(10, 0.4), 4);
        assert_eq!(fraction_count(10, 0.25), 3);
        assert_eq!(fraction_count(3, 0.5), 2);
        assert_eq!(fraction_count(0, 0.5), 0);
    }
}
