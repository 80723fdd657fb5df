pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Singleton id under which the vocabulary artifact is stored.
pub const VOCABULARY_ID: &str = "vocabulary";

pub const ARTIFACT_EXTENSION: &str = "json";

/// Number of visual words in the bag-of-features representation.
pub const DEFAULT_VOCABULARY_SIZE: usize = 300;
/// Number of k-means runs when generating the vocabulary.
pub const DEFAULT_VOCABULARY_ATTEMPTS: usize = 20;

/// Number of webcam categories.
pub const DEFAULT_NUM_CLUSTERS: usize = 3;
/// Number of k-means runs when clustering webcams.
pub const DEFAULT_CLUSTER_ATTEMPTS: usize = 3;

pub const DEFAULT_KMEANS_EPSILON: f64 = 0.1;
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 100;

/// Keypoint detectors may be internally parallel; one extraction thread avoids
/// contention.
pub const DEFAULT_EXTRACT_THREADS: usize = 1;
pub const DEFAULT_FEATURE_THREADS: usize = 12;

/// Frames sampled per webcam; webcams with fewer frames are degenerate.
pub const DEFAULT_FRAMES_PER_IDENTIFIER: usize = 8;
pub const DEFAULT_MAX_DESCRIPTORS_PER_FRAME: usize = 50;
