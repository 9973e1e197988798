use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use sha2::{Sha256, Digest};

use crate::contract::{LabelEncoders, TrainedFeatureContract};
use crate::pipeline::PipelineError;

/// File name of the exported classifier
pub const MODEL_FILE: &str = "churn_model.onnx";
/// File name of the exported scaler statistics and feature names
pub const SCALER_FILE: &str = "standard_scaler.json";
/// File name of the exported label encoder classes
pub const ENCODERS_FILE: &str = "label_encoders.json";
/// Optional checksum manifest, one `<sha256>  <file name>` line per artifact
pub const MANIFEST_FILE: &str = "artifacts.sha256";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse {file}: {message}")]
    ParseError { file: String, message: String },
    #[error("Invalid {file}: {message}")]
    Invalid { file: String, message: String },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

/// Locations of the three artifacts a predictor is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub label_encoders: PathBuf,
}

impl ArtifactPaths {
    fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.model, &self.scaler, &self.label_encoders].into_iter()
    }
}

/// A directory holding the trained artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store over the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("CHURNLENS_ARTIFACTS") {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("churnlens").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("churnlens").join("artifacts");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("churnlens").join("artifacts")
    }

    /// Unlike a download cache the directory is never created: artifacts are produced
    /// by training, and an empty directory would only hide a wrong path.
    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn get_model_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_FILE)
    }

    pub fn get_scaler_path(&self) -> PathBuf {
        self.artifacts_dir.join(SCALER_FILE)
    }

    pub fn get_label_encoders_path(&self) -> PathBuf {
        self.artifacts_dir.join(ENCODERS_FILE)
    }

    pub fn get_manifest_path(&self) -> PathBuf {
        self.artifacts_dir.join(MANIFEST_FILE)
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.get_model_path(),
            scaler: self.get_scaler_path(),
            label_encoders: self.get_label_encoders_path(),
        }
    }

    /// Required artifacts that are not present on disk
    pub fn missing_artifacts(&self) -> Vec<PathBuf> {
        let paths = self.paths();
        log::info!("Checking artifacts in {:?}:", self.artifacts_dir);
        paths.iter()
            .filter(|path| {
                let exists = path.exists();
                log::info!("  {:?} (exists: {})", path, exists);
                !exists
            })
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_artifacts().is_empty()
    }

    /// Returns the artifact paths, or `NotFound` for the first missing artifact.
    pub fn ensure_complete(&self) -> Result<ArtifactPaths, ArtifactError> {
        match self.missing_artifacts().into_iter().next() {
            Some(missing) => {
                log::error!("Missing artifact: {:?}", missing);
                Err(ArtifactError::NotFound(missing))
            }
            None => Ok(self.paths()),
        }
    }

    /// Computes the file's SHA-256 and compares it with `expected_hash`.
    pub fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ArtifactError> {
        log::info!("Verifying file: {:?}", path);
        let bytes = fs::read(path)?;
        log::debug!("Read {} bytes", bytes.len());
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        log::debug!("Calculated hash: {}", hash);
        log::debug!("Expected hash:   {}", expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash.trim()))
    }

    /// Reads the checksum manifest, or `None` when the directory has none.
    pub fn read_manifest(&self) -> Result<Option<HashMap<String, String>>, ArtifactError> {
        let path = self.get_manifest_path();
        if !path.exists() {
            return Ok(None);
        }

        let mut hashes = HashMap::new();
        for (number, line) in fs::read_to_string(&path)?.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(hash), Some(file)) => {
                    // sha256sum marks binary mode with a leading '*'
                    hashes.insert(file.trim_start_matches('*').to_string(), hash.to_string());
                }
                _ => {
                    return Err(ArtifactError::ParseError {
                        file: MANIFEST_FILE.to_string(),
                        message: format!("line {} is not '<hash>  <file>'", number + 1),
                    });
                }
            }
        }
        Ok(Some(hashes))
    }

    /// Verifies every required artifact against the manifest.
    ///
    /// Returns `Ok(false)` when there is no manifest to verify against. An artifact
    /// missing from the manifest, or whose hash differs, is an error.
    pub fn verify_artifacts(&self) -> Result<bool, ArtifactError> {
        let Some(manifest) = self.read_manifest()? else {
            log::warn!("No {} in {:?}; skipping verification", MANIFEST_FILE, self.artifacts_dir);
            return Ok(false);
        };

        let paths = self.ensure_complete()?;
        for path in paths.iter() {
            let file = file_name(path);
            let expected = manifest.get(&file).ok_or_else(|| ArtifactError::Invalid {
                file: MANIFEST_FILE.to_string(),
                message: format!("no checksum listed for {}", file),
            })?;
            if !self.verify_file(path, expected)? {
                let actual = sha256_hex(&fs::read(path)?);
                log::error!("{} hash mismatch: expected {}, got {}", file, expected, actual);
                return Err(ArtifactError::HashMismatch {
                    file,
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        log::info!("All artifacts verified successfully");
        Ok(true)
    }

    /// Loads the feature contract from the exported scaler.
    pub fn load_contract(&self) -> Result<TrainedFeatureContract, PipelineError> {
        let path = self.get_scaler_path();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path).into());
        }
        let json = fs::read_to_string(&path).map_err(ArtifactError::from)?;
        TrainedFeatureContract::from_json_str(&json)
    }

    /// Loads the label encoder classes.
    pub fn load_label_encoders(&self) -> Result<LabelEncoders, ArtifactError> {
        let path = self.get_label_encoders_path();
        if !path.exists() {
            return Err(ArtifactError::NotFound(path));
        }
        let json = fs::read_to_string(&path)?;
        LabelEncoders::from_json_str(&json).map_err(|e| ArtifactError::ParseError {
            file: ENCODERS_FILE.to_string(),
            message: e.to_string(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCALER_JSON: &str = r#"{"feature_names_in": ["Tenure"], "mean": [32.0], "scale": [24.0]}"#;
    const ENCODERS_JSON: &str = r#"{"Contract": ["Month-to-month", "One_year", "Two_year"]}"#;

    fn populated_store() -> (TempDir, ArtifactStore) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MODEL_FILE), b"not really onnx").unwrap();
        fs::write(dir.path().join(SCALER_FILE), SCALER_JSON).unwrap();
        fs::write(dir.path().join(ENCODERS_FILE), ENCODERS_JSON).unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    fn write_manifest(store: &ArtifactStore) {
        let manifest: String = [MODEL_FILE, SCALER_FILE, ENCODERS_FILE].iter()
            .map(|file| {
                let bytes = fs::read(store.artifacts_dir().join(file)).unwrap();
                format!("{}  {}\n", sha256_hex(&bytes), file)
            })
            .collect();
        fs::write(store.get_manifest_path(), manifest).unwrap();
    }

    #[test]
    fn test_default_artifacts_dir() {
        env::set_var("CHURNLENS_ARTIFACTS", "/tmp/churnlens-test-artifacts");
        let path = ArtifactStore::get_default_artifacts_dir();
        assert_eq!(path, PathBuf::from("/tmp/churnlens-test-artifacts"));
        env::remove_var("CHURNLENS_ARTIFACTS");

        let path = ArtifactStore::get_default_artifacts_dir();
        assert!(path.ends_with("churnlens/artifacts"));
    }

    #[test]
    fn test_missing_artifacts() {
        let (dir, store) = populated_store();
        assert!(store.is_complete());

        fs::remove_file(dir.path().join(ENCODERS_FILE)).unwrap();
        assert_eq!(store.missing_artifacts(), vec![store.get_label_encoders_path()]);
        assert!(matches!(
            store.ensure_complete(),
            Err(ArtifactError::NotFound(path)) if path.ends_with(ENCODERS_FILE)
        ));
    }

    #[test]
    fn test_load_contract_and_encoders() {
        let (_dir, store) = populated_store();
        let contract = store.load_contract().unwrap();
        assert_eq!(contract.columns(), &["Tenure".to_string()]);

        let encoders = store.load_label_encoders().unwrap();
        assert_eq!(encoders.classes("Contract").map(|c| c.len()), Some(3));
    }

    #[test]
    fn test_malformed_label_encoders() {
        let (dir, store) = populated_store();
        fs::write(dir.path().join(ENCODERS_FILE), "[1, 2").unwrap();
        assert!(matches!(store.load_label_encoders(), Err(ArtifactError::ParseError { .. })));
    }

    #[test]
    fn test_verify_without_manifest() {
        let (_dir, store) = populated_store();
        assert!(!store.verify_artifacts().unwrap());
    }

    #[test]
    fn test_verify_with_manifest() {
        let (dir, store) = populated_store();
        write_manifest(&store);
        assert!(store.verify_artifacts().unwrap());

        fs::write(dir.path().join(MODEL_FILE), b"tampered").unwrap();
        assert!(matches!(
            store.verify_artifacts(),
            Err(ArtifactError::HashMismatch { file, .. }) if file == MODEL_FILE
        ));
    }

    #[test]
    fn test_malformed_manifest() {
        let (_dir, store) = populated_store();
        fs::write(store.get_manifest_path(), "deadbeef\n").unwrap();
        assert!(matches!(store.read_manifest(), Err(ArtifactError::ParseError { .. })));
    }
}
