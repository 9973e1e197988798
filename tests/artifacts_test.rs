mod common;

use std::fs;
use churnlens::artifacts::{ENCODERS_FILE, MANIFEST_FILE, MODEL_FILE, SCALER_FILE};
use churnlens::{ArtifactError, ArtifactStore, ChurnPredictor, PipelineError};
use tempfile::TempDir;

fn artifact_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

#[test]
fn test_missing_model_is_named() {
    common::init();
    let dir = artifact_dir(&[
        (SCALER_FILE, r#"{"feature_names_in": ["Tenure"], "mean": [0.0], "scale": [1.0]}"#),
        (ENCODERS_FILE, "{}"),
    ]);

    let err = ChurnPredictor::builder().with_artifact_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains(MODEL_FILE));
    match err {
        PipelineError::Artifact(ArtifactError::NotFound(path)) => assert!(path.ends_with(MODEL_FILE)),
        other => panic!("expected a missing model, got {:?}", other),
    }
}

#[test]
fn test_scaler_without_feature_names_fails_at_startup() {
    let dir = artifact_dir(&[
        (MODEL_FILE, "placeholder"),
        (SCALER_FILE, r#"{"mean": [0.0, 1.0], "scale": [1.0, 1.0], "n_features_in": 2}"#),
        (ENCODERS_FILE, "{}"),
    ]);

    let err = ChurnPredictor::builder().with_artifact_dir(dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::ContractError(ref m) if m.contains("feature names")), "{}", err);
}

#[test]
fn test_inconsistent_scaler_rejected() {
    let dir = artifact_dir(&[
        (MODEL_FILE, "placeholder"),
        (SCALER_FILE, r#"{"feature_names_in_": ["Tenure", "Tenure"], "mean_": [0.0, 0.0], "scale_": [1.0, 1.0]}"#),
        (ENCODERS_FILE, "{}"),
    ]);

    let err = ChurnPredictor::builder().with_artifact_dir(dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::ContractError(ref m) if m.contains("Duplicate")), "{}", err);
}

#[test]
fn test_store_reports_completeness() {
    let dir = artifact_dir(&[(MODEL_FILE, "placeholder")]);
    let store = ArtifactStore::new(dir.path());

    assert!(!store.is_complete());
    assert_eq!(store.missing_artifacts().len(), 2);
    assert_eq!(store.paths().model, dir.path().join(MODEL_FILE));
}

#[test]
fn test_manifest_must_list_every_artifact() {
    let dir = artifact_dir(&[
        (MODEL_FILE, "placeholder"),
        (SCALER_FILE, "{}"),
        (ENCODERS_FILE, "{}"),
        (MANIFEST_FILE, "0000000000000000000000000000000000000000000000000000000000000000  churn_model.onnx\n"),
    ]);
    let store = ArtifactStore::new(dir.path());

    assert!(matches!(store.verify_artifacts(), Err(ArtifactError::HashMismatch { .. })));

    fs::write(
        dir.path().join(MANIFEST_FILE),
        // sha256 of the empty string; the listed file is not an artifact
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  notes.txt\n",
    ).unwrap();
    assert!(matches!(store.verify_artifacts(), Err(ArtifactError::Invalid { .. })));
}
