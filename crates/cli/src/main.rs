use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use webcam_bovw_core::checkpoint::domain::checkpoint_store::CheckpointStore;
use webcam_bovw_core::checkpoint::infrastructure::file_artifact_store::FileArtifactStore;
use webcam_bovw_core::clustering::infrastructure::lloyd_kmeans::LloydKMeans;
use webcam_bovw_core::frames::infrastructure::directory_frame_source::DirectoryFrameSource;
use webcam_bovw_core::pipeline::cluster_webcams_use_case::ClusterWebcamsUseCase;
use webcam_bovw_core::pipeline::infrastructure::threaded_stage_executor::ThreadedStageExecutor;
use webcam_bovw_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use webcam_bovw_core::shared::pipeline_settings::PipelineSettings;
use webcam_bovw_core::vision::infrastructure::gradient_histogram_backend::GradientHistogramBackend;

/// Group webcams by visual similarity using a bag of visual words.
#[derive(Parser)]
#[command(name = "webcam-bovw")]
struct Cli {
    /// Directory holding one sub-directory of frames per webcam.
    frames_dir: PathBuf,

    /// Number of webcam clusters.
    num_clusters: Option<usize>,

    /// JSON settings file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the descriptors/, vocabulary/, features/ and clusters/ checkpoints.
    #[arg(long, default_value = ".")]
    checkpoint_dir: PathBuf,

    /// Number of visual words.
    #[arg(long)]
    vocabulary_size: Option<usize>,

    /// Worker threads for descriptor extraction.
    #[arg(long)]
    extract_threads: Option<usize>,

    /// Worker threads for histogram computation.
    #[arg(long)]
    feature_threads: Option<usize>,

    /// Seed for frame sampling and k-means.
    #[arg(long)]
    seed: Option<u64>,

    /// Discard every checkpoint before running.
    #[arg(long)]
    fresh: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !cli.frames_dir.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames_dir.display()).into());
    }
    let settings = resolve_settings(&cli)?;

    let checkpoints = CheckpointStore::new(Arc::new(FileArtifactStore::new(&cli.checkpoint_dir)));
    if cli.fresh {
        log::info!("Clearing checkpoints in {}", cli.checkpoint_dir.display());
        checkpoints.clear_all()?;
    }

    let use_case = ClusterWebcamsUseCase::new(
        Box::new(DirectoryFrameSource::new(&cli.frames_dir)),
        Box::new(GradientHistogramBackend::default()),
        Box::new(LloydKMeans::new(settings.kmeans_max_iterations, settings.seed)),
        Box::new(ThreadedStageExecutor::new()),
        checkpoints,
        settings,
    );

    let mut logger = StdoutPipelineLogger::new();
    let outcome = use_case.execute(&mut logger)?;
    logger.summary();

    for (id, label) in &outcome.clusters {
        println!("{id}\t{label}");
    }
    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<PipelineSettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => PipelineSettings::load(path)?,
        None => PipelineSettings::default(),
    };
    if let Some(n) = cli.num_clusters {
        settings.num_clusters = n;
    }
    if let Some(n) = cli.vocabulary_size {
        settings.vocabulary_size = n;
    }
    if let Some(n) = cli.extract_threads {
        settings.extract_threads = n;
    }
    if let Some(n) = cli.feature_threads {
        settings.feature_threads = n;
    }
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["webcam-bovw", "frames"]).unwrap();
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings, PipelineSettings::default());
        assert_eq!(cli.checkpoint_dir, PathBuf::from("."));
        assert!(!cli.fresh);
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "webcam-bovw",
            "frames",
            "5",
            "--vocabulary-size",
            "64",
            "--feature-threads",
            "2",
            "--seed",
            "9",
        ])
        .unwrap();
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.num_clusters, 5);
        assert_eq!(settings.vocabulary_size, 64);
        assert_eq!(settings.feature_threads, 2);
        assert_eq!(settings.seed, Some(9));
    }

    #[test]
    fn test_zero_clusters_is_rejected() {
        let cli = Cli::try_parse_from(["webcam-bovw", "frames", "0"]).unwrap();
        assert!(resolve_settings(&cli).is_err());
    }

    #[test]
    fn test_malformed_cluster_count_fails_to_parse() {
        assert!(Cli::try_parse_from(["webcam-bovw", "frames", "three"]).is_err());
    }
}
