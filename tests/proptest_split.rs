use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use yoloprep::convert::LabelSet;
use yoloprep::ir::{ClassId, ImageId, YoloAnnotation};
use yoloprep::split::{fraction_count, split, PartitionKind, SplitRatios};
use yoloprep::PrepError;

mod common;

fn arb_ratios() -> impl Strategy<Value = (f64, f64)> {
    (0.0..0.45f64, 0.0..0.45f64).prop_filter("holdout must be positive", |(v, t)| v + t > 1e-3)
}

/// Images carry their own id as payload; every label row encodes the image
/// id in its class so pairing can be checked after the shuffle.
fn inputs(n: u64) -> (BTreeMap<ImageId, u64>, LabelSet) {
    let images = (1..=n).map(|id| (ImageId(id), id)).collect();
    let labels = (1..=n)
        .map(|id| {
            let row = YoloAnnotation::new(ClassId(id as i64), 0.5, 0.5, 0.2, 0.2);
            (ImageId(id), vec![row; (id % 4) as usize])
        })
        .collect();
    (images, labels)
}

proptest! {
    #![proptest_config(common::proptest_config())]

    #[test]
    fn partitions_cover_every_image_once((val, test) in arb_ratios(), n in 1u64..80, seed in any::<u64>()) {
        let ratios = SplitRatios::new(val, test).expect("ratios");
        let (images, labels) = inputs(n);

        let holdout = fraction_count(n as usize, ratios.holdout());
        let result = split(images, labels, ratios, seed);
        if holdout == n as usize {
            let is_split_failed = matches!(result, Err(PrepError::SplitFailed { .. }));
            prop_assert!(is_split_failed);
            return Ok(());
        }
        let parts = result.expect("split");

        let mut seen = BTreeSet::new();
        for kind in PartitionKind::ALL {
            let part = parts.get(kind);
            prop_assert_eq!(part.images.len(), part.labels.len());
            for ((image_id, payload), (label_id, rows)) in part.images.iter().zip(&part.labels) {
                prop_assert_eq!(image_id, label_id);
                prop_assert_eq!(image_id.as_u64(), *payload);
                prop_assert_eq!(rows.len() as u64, payload % 4);
                prop_assert!(rows.iter().all(|row| row.class_id.as_i64() == *payload as i64));
                prop_assert!(seen.insert(*image_id), "{} in two partitions", image_id);
            }
        }
        prop_assert_eq!(seen, (1..=n).map(ImageId).collect::<BTreeSet<_>>());
    }

    #[test]
    fn partition_sizes_follow_ceiling_rule((val, test) in arb_ratios(), n in 1u64..80) {
        let ratios = SplitRatios::new(val, test).expect("ratios");
        let (images, labels) = inputs(n);
        let Ok(parts) = split(images, labels, ratios, 33) else {
            return Ok(());
        };
        let counts = parts.counts();

        let holdout = counts.validation + counts.test;
        let expected_holdout = n as f64 * (val + test);
        prop_assert!(holdout as f64 >= expected_holdout - 1e-6);
        prop_assert!((holdout as f64) < expected_holdout + 1.0);
        prop_assert!(counts.train >= 1);

        let expected_test = holdout as f64 * test / (val + test);
        prop_assert!(counts.test as f64 >= expected_test - 1e-6);
        prop_assert!((counts.test as f64) < expected_test + 1.0);
    }

    #[test]
    fn same_seed_same_partitions((val, test) in arb_ratios(), n in 2u64..60, seed in any::<u64>()) {
        let ratios = SplitRatios::new(val, test).expect("ratios");
        let (images, labels) = inputs(n);

        let first = split(images.clone(), labels.clone(), ratios, seed);
        let second = split(images, labels, ratios, seed);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                for kind in PartitionKind::ALL {
                    prop_assert_eq!(a.get(kind).ids(), b.get(kind).ids());
                }
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "runs disagreed on success"),
        }
    }
}
