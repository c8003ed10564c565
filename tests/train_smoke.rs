// End-to-end smoke test: build a tiny synthetic dataset and an
// experiment directory on disk, run the full pipeline, and check
// the artifacts the trainer promises to leave behind.

use std::fs;
use std::path::Path;

use image::GrayImage;
use tempfile::TempDir;

use unet_seg::application::experiment::{load_experiment_spec, SpecError};
use unet_seg::application::train_use_case::TrainUseCase;

fn write_gray(path: &Path, value: u8) {
    GrayImage::from_pixel(8, 8, image::Luma([value])).save(path).unwrap();
}

/// Four 8x8 pairs: flat gray images, masks alternating between
/// all-foreground and all-background.
fn build_data_dir(root: &Path) {
    let images = root.join("images");
    let labels = root.join("labels");
    fs::create_dir_all(&images).unwrap();
    fs::create_dir_all(&labels).unwrap();
    for i in 0..4u8 {
        let name = format!("frame_{i:04}.png");
        write_gray(&images.join(&name), 60 + i * 40);
        write_gray(&labels.join(&name), if i % 2 == 0 { 255 } else { 0 });
    }
}

fn build_experiment(loss: &str, epochs: usize, save_every: usize) -> (TempDir, TempDir) {
    let data = tempfile::tempdir().unwrap();
    build_data_dir(data.path());

    let exp = tempfile::tempdir().unwrap();
    let spec = format!(
        r#"{{
            "DataSource": "{}",
            "LearningRate": 1e-3,
            "Epochs": {epochs},
            "SaveEvery": {save_every},
            "BatchSize": 2,
            "Debug": false,
            "NumDebug": 0,
            "LossFunction": "{loss}"
        }}"#,
        data.path().display(),
    );
    fs::write(exp.path().join("specs.json"), spec).unwrap();
    (data, exp)
}

#[test]
fn train_run_leaves_expected_artifacts() {
    let (_data, exp) = build_experiment("Dice", 4, 2);

    let spec = load_experiment_spec(exp.path()).unwrap();
    TrainUseCase::new(exp.path(), spec, 2020).execute().unwrap();

    let root = exp.path();
    assert!(root.join("evaluation").is_dir());

    // Latest snapshot pair plus its epoch marker.
    assert!(root.join("latest_model.mpk.gz").is_file());
    assert!(root.join("latest_optim.mpk.gz").is_file());
    let marker: usize =
        serde_json::from_str(&fs::read_to_string(root.join("latest.json")).unwrap()).unwrap();
    assert_eq!(marker, 4);

    // Permanent checkpoints only at epochs divisible by SaveEvery.
    let ckpt = root.join("checkpoints");
    assert!(ckpt.join("model_epoch_2.mpk.gz").is_file());
    assert!(ckpt.join("optim_epoch_2.mpk.gz").is_file());
    assert!(ckpt.join("model_epoch_4.mpk.gz").is_file());
    assert!(!ckpt.join("model_epoch_1.mpk.gz").exists());
    assert!(!ckpt.join("model_epoch_3.mpk.gz").exists());

    // One metrics row per epoch, on disk already.
    let metrics = fs::read_to_string(root.join("metrics.csv")).unwrap();
    let lines: Vec<&str> = metrics.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "epoch,overall_loss,dice_loss,focal_loss");
    assert!(lines[4].starts_with("4,"));
}

#[test]
fn train_run_with_bce_criterion() {
    let (_data, exp) = build_experiment("BCE", 1, 1);
    let spec = load_experiment_spec(exp.path()).unwrap();
    TrainUseCase::new(exp.path(), spec, 7).execute().unwrap();
    assert!(exp.path().join("checkpoints/model_epoch_1.mpk.gz").is_file());
}

#[test]
fn debug_flag_caps_dataset_size() {
    let (_data, exp) = build_experiment("Dice", 1, 1);
    let mut spec = load_experiment_spec(exp.path()).unwrap();
    spec.debug = true;
    spec.num_debug = 2;
    assert_eq!(spec.sample_limit(), Some(2));
    TrainUseCase::new(exp.path(), spec, 2020).execute().unwrap();
}

#[test]
fn unknown_loss_function_fails_before_training() {
    let (_data, exp) = build_experiment("Tversky", 1, 1);
    let err = load_experiment_spec(exp.path()).unwrap_err();
    assert!(matches!(err, SpecError::UnknownLossFunction(name) if name == "Tversky"));
    // Nothing was created in the experiment dir.
    assert!(!exp.path().join("checkpoints").exists());
    assert!(!exp.path().join("metrics.csv").exists());
}

#[test]
fn missing_experiment_dir_is_reported() {
    let err = load_experiment_spec(Path::new("/definitely/not/here")).unwrap_err();
    assert!(matches!(err, SpecError::MissingExperimentDir(_)));
}
