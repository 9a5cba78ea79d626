use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cvprep::dataset::split_off;
use cvprep::io::{build_config, CONFIG_FILE};
use cvprep::types::{ClassificationConfig, DetectionConfig};
use cvprep::{
    create_config, prepare_folder_structure, split_classification, split_detection, PrepError,
    ScriptedNames, SplitOptions, Task, Workspace,
};

fn write_file(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"data").unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

fn stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

fn detection_dataset(root: &Path, pairs: usize) {
    for i in 0..pairs {
        write_file(&root.join("images").join(format!("frame{:02}.png", i)));
        write_file(&root.join("labels").join(format!("frame{:02}.txt", i)));
    }
}

#[test]
fn test_detection_split_keeps_pairs_together() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    detection_dataset(root, 10);
    write_file(&root.join("images/unlabeled.jpg"));
    write_file(&root.join("labels/orphan.txt"));

    let report = split_detection(root, &SplitOptions::for_task(Task::Detect)).unwrap();
    assert_eq!(report.train, 8);
    assert_eq!(report.val, 2);
    assert_eq!(report.test, 0);
    assert_eq!(report.dropped, 2);

    for subset in ["train", "val"] {
        let images = file_names(&root.join("images").join(subset));
        let labels = file_names(&root.join("labels").join(subset));
        let image_stems: Vec<String> = images.iter().map(|name| stem(name)).collect();
        let label_stems: Vec<String> = labels.iter().map(|name| stem(name)).collect();
        assert_eq!(image_stems, label_stems);
    }

    // Unpaired files stay where they were
    assert_eq!(file_names(&root.join("images")), vec!["unlabeled.jpg"]);
    assert_eq!(file_names(&root.join("labels")), vec!["orphan.txt"]);
}

#[test]
fn test_detection_split_matches_extensions_case_insensitively() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_file(&root.join("images/A.JPG"));
    write_file(&root.join("labels/A.txt"));
    write_file(&root.join("images/b.jpeg"));
    write_file(&root.join("labels/b.txt"));
    write_file(&root.join("images/c.gif"));
    write_file(&root.join("labels/c.txt"));

    let report = split_detection(root, &SplitOptions::for_task(Task::Detect)).unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(report.dropped, 1);
    assert!(root.join("images/c.gif").exists());
}

#[test]
fn test_detection_split_is_deterministic() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    detection_dataset(first.path(), 25);
    detection_dataset(second.path(), 25);

    let options = SplitOptions::for_task(Task::Detect);
    split_detection(first.path(), &options).unwrap();
    split_detection(second.path(), &options).unwrap();

    assert_eq!(
        file_names(&first.path().join("images/val")),
        file_names(&second.path().join("images/val"))
    );
    assert_eq!(file_names(&first.path().join("images/val")).len(), 5);
}

#[test]
fn test_detection_split_twice_finds_no_pairs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    detection_dataset(root, 5);
    let options = SplitOptions::for_task(Task::Detect);

    split_detection(root, &options).unwrap();
    let result = split_detection(root, &options);
    assert!(matches!(result, Err(PrepError::EmptyDataset(_))));
}

#[test]
fn test_detection_split_without_labels_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write_file(&root.join("images/a.png"));
    fs::create_dir_all(root.join("labels")).unwrap();

    let result = split_detection(root, &SplitOptions::for_task(Task::Detect));
    assert!(matches!(result, Err(PrepError::EmptyDataset(_))));
    assert!(root.join("images/a.png").exists());
}

#[test]
fn test_classification_split_compounds_test_fraction() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    for i in 0..100 {
        write_file(&root.join(format!("cat_{}.png", i)));
    }
    for i in 0..2 {
        write_file(&root.join(format!("dog_{}.jpg", i)));
    }
    write_file(&root.join("notes.txt"));

    let report = split_classification(root, &SplitOptions::for_task(Task::Cls)).unwrap();

    assert_eq!(file_names(&root.join("train/cat")).len(), 60);
    assert_eq!(file_names(&root.join("val/cat")).len(), 36);
    assert_eq!(file_names(&root.join("test/cat")).len(), 4);

    // Small classes may end up with empty subsets, but the folders exist
    let dog_total: usize = ["train", "val", "test"]
        .iter()
        .map(|subset| file_names(&root.join(subset).join("dog")).len())
        .sum();
    assert_eq!(dog_total, 2);
    assert!(root.join("val/dog").is_dir());

    assert_eq!(report.total(), 102);
    assert_eq!(file_names(root), vec!["notes.txt"]);
}

#[test]
fn test_classification_split_partitions_every_image_once() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    let mut expected = Vec::new();
    for class in ["apple", "banana", "cherry"] {
        for i in 0..13 {
            let name = format!("{}_{}.png", class, i);
            write_file(&root.join(&name));
            expected.push(name);
        }
    }
    expected.sort();

    split_classification(root, &SplitOptions::for_task(Task::Cls)).unwrap();

    let mut found = Vec::new();
    for subset in ["train", "val", "test"] {
        for class in ["apple", "banana", "cherry"] {
            let names = file_names(&root.join(subset).join(class));
            assert!(names.iter().all(|name| name.starts_with(class)));
            found.extend(names);
        }
    }
    found.sort();
    assert_eq!(found, expected);
}

#[test]
fn test_split_rejects_invalid_fractions() {
    let temp_dir = tempfile::tempdir().unwrap();
    let options = SplitOptions::for_task(Task::Cls).with_overrides(Some(1.0), None, None);
    let result = split_classification(temp_dir.path(), &options);
    assert!(matches!(result, Err(PrepError::InvalidFraction(_))));
}

#[test]
fn test_prepare_folder_structure_requires_existing_root() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing");
    let result = prepare_folder_structure(&missing, Task::Cls, &SplitOptions::for_task(Task::Cls));
    assert!(matches!(result, Err(PrepError::PathNotFound(_))));
}

#[test]
fn test_split_off_rounds_up_held_out_part() {
    let (kept, held_out) = split_off((0..10).collect::<Vec<u32>>(), 0.3, 42);
    assert_eq!(kept.len(), 7);
    assert_eq!(held_out.len(), 3);
}

#[test]
fn test_create_detection_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("classes.txt"), "cat\ndog\n").unwrap();

    let (config_path, _) = create_config(root, Task::Detect).unwrap();
    assert_eq!(config_path, root.join(CONFIG_FILE));

    let yaml_content = fs::read_to_string(config_path).unwrap();
    let config: DetectionConfig = serde_yaml::from_str(&yaml_content).unwrap();
    let names: BTreeMap<usize, String> =
        [(0, "cat".to_string()), (1, "dog".to_string())].into_iter().collect();
    assert_eq!(
        config,
        DetectionConfig {
            train: "images/train".to_string(),
            val: "images/val".to_string(),
            nc: 2,
            names,
        }
    );
}

#[test]
fn test_create_classification_config_sorts_classes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    for class in ["zebra", "ant", "mango"] {
        fs::create_dir_all(root.join("train").join(class)).unwrap();
    }
    write_file(&root.join("train/.DS_Store"));
    fs::write(root.join(CONFIG_FILE), "stale: true\n").unwrap();

    create_config(root, Task::Cls).unwrap();

    let yaml_content = fs::read_to_string(root.join(CONFIG_FILE)).unwrap();
    assert!(!yaml_content.contains("stale"));
    let config: ClassificationConfig = serde_yaml::from_str(&yaml_content).unwrap();
    assert_eq!(config.names, vec!["ant", "mango", "zebra"]);
    assert_eq!(config.nc, 3);
    assert_eq!(config.train, "train");
    assert_eq!(config.val, "val");
    assert_eq!(config.test, "test");
}

#[test]
fn test_config_errors() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing");
    assert!(matches!(
        build_config(&missing, Task::Detect),
        Err(PrepError::PathNotFound(_))
    ));
    assert!(matches!(
        build_config(temp_dir.path(), Task::Detect),
        Err(PrepError::ClassesNotFound(_))
    ));
    assert!(matches!(
        build_config(temp_dir.path(), Task::Cls),
        Err(PrepError::Io { .. })
    ));
}

#[test]
fn test_prepare_then_config_for_classification() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    for class in ["rock", "paper", "scissors"] {
        for i in 0..10 {
            write_file(&root.join(format!("{}_{}.png", class, i)));
        }
    }

    prepare_folder_structure(root, Task::Cls, &SplitOptions::for_task(Task::Cls)).unwrap();
    let (_, config) = create_config(root, Task::Cls).unwrap();
    assert_eq!(config.class_count(), 3);
}

#[test]
fn test_init_group_creates_sanitized_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(temp_dir.path());
    let mut names = ScriptedNames::new(["Müller_Gruppe", "", " Müller "]);

    let group_dir = workspace.init_group(Task::Detect, &mut names).unwrap();
    assert_eq!(group_dir.group, "mueller");
    assert_eq!(group_dir.path, temp_dir.path().join("detection/mueller"));
    assert!(group_dir.path.is_dir());

    // A second init for the same group leaves the directory alone
    write_file(&group_dir.path.join("keep.png"));
    let mut names = ScriptedNames::new(["MÜLLER"]);
    let again = workspace.init_group(Task::Detect, &mut names).unwrap();
    assert_eq!(again, group_dir);
    assert!(group_dir.path.join("keep.png").exists());
}

#[test]
fn test_init_named_group_rejects_invalid_name() {
    let temp_dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(temp_dir.path());

    let result = workspace.init_named_group(Task::Cls, "a_b");
    assert!(matches!(result, Err(PrepError::InvalidName(ref name)) if name == "a_b"));
    assert!(!temp_dir.path().join("classification").exists());

    let group_dir = workspace.init_named_group(Task::Cls, " Größe ").unwrap();
    assert_eq!(group_dir.group, "groesse");
    assert!(temp_dir.path().join("classification/groesse").is_dir());
}
