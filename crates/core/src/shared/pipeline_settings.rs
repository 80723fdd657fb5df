use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_CLUSTER_ATTEMPTS, DEFAULT_EXTRACT_THREADS, DEFAULT_FEATURE_THREADS,
    DEFAULT_FRAMES_PER_IDENTIFIER, DEFAULT_KMEANS_EPSILON, DEFAULT_KMEANS_MAX_ITERATIONS,
    DEFAULT_MAX_DESCRIPTORS_PER_FRAME, DEFAULT_NUM_CLUSTERS, DEFAULT_VOCABULARY_ATTEMPTS,
    DEFAULT_VOCABULARY_SIZE,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Hyper-parameters and thread counts for one pipeline run.
///
/// Every field has a default, so a settings file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub vocabulary_size: usize,
    pub vocabulary_attempts: usize,
    pub num_clusters: usize,
    pub cluster_attempts: usize,
    pub kmeans_epsilon: f64,
    pub kmeans_max_iterations: usize,
    pub extract_threads: usize,
    pub feature_threads: usize,
    pub frames_per_identifier: usize,
    pub max_descriptors_per_frame: usize,
    /// Fixes frame sampling and k-means seeding when set.
    pub seed: Option<u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            vocabulary_size: DEFAULT_VOCABULARY_SIZE,
            vocabulary_attempts: DEFAULT_VOCABULARY_ATTEMPTS,
            num_clusters: DEFAULT_NUM_CLUSTERS,
            cluster_attempts: DEFAULT_CLUSTER_ATTEMPTS,
            kmeans_epsilon: DEFAULT_KMEANS_EPSILON,
            kmeans_max_iterations: DEFAULT_KMEANS_MAX_ITERATIONS,
            extract_threads: DEFAULT_EXTRACT_THREADS,
            feature_threads: DEFAULT_FEATURE_THREADS,
            frames_per_identifier: DEFAULT_FRAMES_PER_IDENTIFIER,
            max_descriptors_per_frame: DEFAULT_MAX_DESCRIPTORS_PER_FRAME,
            seed: None,
        }
    }
}

impl PipelineSettings {
    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("vocabulary_size", self.vocabulary_size),
            ("vocabulary_attempts", self.vocabulary_attempts),
            ("num_clusters", self.num_clusters),
            ("cluster_attempts", self.cluster_attempts),
            ("kmeans_max_iterations", self.kmeans_max_iterations),
            ("extract_threads", self.extract_threads),
            ("feature_threads", self.feature_threads),
            ("frames_per_identifier", self.frames_per_identifier),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(SettingsError::Invalid(format!("{name} must be at least 1")));
            }
        }
        if !(self.kmeans_epsilon.is_finite() && self.kmeans_epsilon >= 0.0) {
            return Err(SettingsError::Invalid(format!(
                "kmeans_epsilon must be a non-negative number, got {}",
                self.kmeans_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let settings = PipelineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.vocabulary_size, 300);
        assert_eq!(settings.extract_threads, 1);
        assert_eq!(settings.feature_threads, 12);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"num_clusters": 5, "seed": 42}"#).unwrap();

        let settings = PipelineSettings::load(&path).unwrap();
        assert_eq!(settings.num_clusters, 5);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.vocabulary_size, DEFAULT_VOCABULARY_SIZE);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = PipelineSettings::load(Path::new("/nonexistent/settings.json"));
        assert!(matches!(result, Err(SettingsError::Read { .. })));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PipelineSettings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[rstest]
    #[case::vocabulary(PipelineSettings { vocabulary_size: 0, ..Default::default() })]
    #[case::clusters(PipelineSettings { num_clusters: 0, ..Default::default() })]
    #[case::threads(PipelineSettings { feature_threads: 0, ..Default::default() })]
    #[case::frames(PipelineSettings { frames_per_identifier: 0, ..Default::default() })]
    #[case::epsilon(PipelineSettings { kmeans_epsilon: -1.0, ..Default::default() })]
    fn test_validate_rejects(#[case] settings: PipelineSettings) {
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }
}
