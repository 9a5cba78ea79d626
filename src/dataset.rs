use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{PrepError, Result};
use crate::types::{ClassSplit, SamplePair, SplitOptions, SplitReport, Task, IMG_FORMATS};
use crate::utils::{create_progress_bar, ensure_dir, list_files_with_extensions, move_into};

const LABEL_EXTENSION: &str = "txt";

// Absorbs float noise such as 0.3 * 10 = 3.0000000000000004 before rounding up
const FRACTION_EPSILON: f64 = 1e-9;

/// Number of items taken out of `len` items for a held-out fraction
pub fn held_out_count(len: usize, fraction: f64) -> usize {
    let raw = (fraction * len as f64 - FRACTION_EPSILON).ceil();
    (raw.max(0.0) as usize).min(len)
}

/// Shuffle `items` with a fixed seed and split off a held-out part.
///
/// Returns `(kept, held_out)` where `held_out` holds `ceil(fraction * len)`
/// items. The input is sorted first so the result only depends on its
/// contents and the seed.
pub fn split_off<T: Ord>(mut items: Vec<T>, fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    items.sort();
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let held_out_len = held_out_count(items.len(), fraction);
    let kept = items.split_off(held_out_len);
    (kept, items)
}

fn validate_fraction(fraction: f64) -> Result<f64> {
    if fraction > 0.0 && fraction < 1.0 {
        Ok(fraction)
    } else {
        Err(PrepError::InvalidFraction(fraction))
    }
}

/// Split a dataset directory in place, dispatching on the task
pub fn prepare_folder_structure(
    root: &Path,
    task: Task,
    options: &SplitOptions,
) -> Result<SplitReport> {
    if !root.exists() {
        return Err(PrepError::PathNotFound(root.to_path_buf()));
    }

    let report = match task {
        Task::Cls => split_classification(root, options)?,
        Task::Detect => split_detection(root, options)?,
    };
    report.print_summary();
    Ok(report)
}

/// Collect the image/label pairs of a detection dataset.
///
/// Returns the pairs together with the number of files left out: images
/// without a label, labels without an image, and images whose label is
/// already claimed by an image with the same stem.
pub fn collect_pairs(images_dir: &Path, labels_dir: &Path) -> Result<(Vec<SamplePair>, usize)> {
    let images = list_files_with_extensions(images_dir, IMG_FORMATS)?;

    let candidates: Vec<SamplePair> = images
        .par_iter()
        .filter_map(|image| {
            let stem = Path::new(image).file_stem()?.to_str()?;
            let label = format!("{}.{}", stem, LABEL_EXTENSION);
            labels_dir.join(&label).is_file().then(|| SamplePair {
                image: image.clone(),
                label,
            })
        })
        .collect();

    let mut claimed = HashSet::new();
    let mut pairs = Vec::with_capacity(candidates.len());
    for pair in candidates {
        if claimed.insert(pair.label.clone()) {
            pairs.push(pair);
        } else {
            warn!(
                "Label {} is already paired, skipping image {}",
                pair.label, pair.image
            );
        }
    }

    let orphan_labels = if labels_dir.is_dir() {
        list_files_with_extensions(labels_dir, &[LABEL_EXTENSION])?
            .into_iter()
            .filter(|label| !claimed.contains(label))
            .count()
    } else {
        0
    };
    let dropped = (images.len() - pairs.len()) + orphan_labels;

    Ok((pairs, dropped))
}

/// Split `images/` and `labels/` of a detection dataset into train and val
pub fn split_detection(root: &Path, options: &SplitOptions) -> Result<SplitReport> {
    let val_size = validate_fraction(options.val_size)?;
    let images_dir = root.join("images");
    let labels_dir = root.join("labels");

    let (pairs, dropped) = collect_pairs(&images_dir, &labels_dir)?;
    if pairs.is_empty() {
        return Err(PrepError::EmptyDataset(images_dir));
    }
    if dropped > 0 {
        warn!(
            "{} image or label files in {} have no counterpart and stay in place",
            dropped,
            root.display()
        );
    }
    info!("Found {} image/label pairs.", pairs.len());

    let (train, val) = split_off(pairs, val_size, options.seed);

    let pb = create_progress_bar((train.len() + val.len()) as u64, "Move");
    for (subset, subset_pairs) in [("train", &train), ("val", &val)] {
        let image_dest = ensure_dir(&images_dir.join(subset))?;
        let label_dest = ensure_dir(&labels_dir.join(subset))?;
        for pair in subset_pairs {
            move_into(&images_dir.join(&pair.image), &image_dest)?;
            move_into(&labels_dir.join(&pair.label), &label_dest)?;
            pb.inc(1);
        }
    }
    pb.finish_with_message("Detection split complete");

    Ok(SplitReport {
        train: train.len(),
        val: val.len(),
        test: 0,
        dropped,
    })
}

/// Group image names by the class prefix in front of the first underscore
pub fn group_by_class(images: Vec<String>) -> BTreeMap<String, Vec<String>> {
    let mut classes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for image in images {
        let prefix = image
            .split_once('_')
            .map(|(prefix, _)| prefix)
            .unwrap_or(&image)
            .to_string();
        classes.entry(prefix).or_default().push(image);
    }
    classes
}

/// Split one class: `val_size` of it is held out, then `test_size` of the
/// held-out part goes to test and the rest to val.
pub fn split_class(images: Vec<String>, options: &SplitOptions) -> ClassSplit {
    let (train, held_out) = split_off(images, options.val_size, options.seed);
    let (val, test) = split_off(held_out, options.test_size, options.seed);
    ClassSplit { train, val, test }
}

/// Split a flat directory of `<class>_<rest>.<ext>` images into
/// `train/<class>`, `val/<class>` and `test/<class>`
pub fn split_classification(root: &Path, options: &SplitOptions) -> Result<SplitReport> {
    validate_fraction(options.val_size)?;
    validate_fraction(options.test_size)?;

    let images = list_files_with_extensions(root, IMG_FORMATS)?;
    if images.is_empty() {
        warn!("No images found in {}, nothing to split", root.display());
    }

    let splits: BTreeMap<String, ClassSplit> = group_by_class(images)
        .into_iter()
        .map(|(class, images)| (class, split_class(images, options)))
        .collect();
    info!("Found {} classes.", splits.len());

    let mut report = SplitReport::default();
    let total: usize = splits.values().map(ClassSplit::len).sum();
    let pb = create_progress_bar(total as u64, "Move");
    for subset in 0..3 {
        for (class, split) in &splits {
            let (subset_name, images) = split.subsets()[subset];
            let dest = ensure_dir(&root.join(subset_name).join(class))?;
            for image in images {
                move_into(&root.join(image), &dest)?;
                pb.inc(1);
            }
        }
    }
    pb.finish_with_message("Classification split complete");

    for split in splits.values() {
        report.train += split.train.len();
        report.val += split.val.len();
        report.test += split.test.len();
    }
    Ok(report)
}
