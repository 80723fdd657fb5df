pub mod file_artifact_store;
pub mod memory_artifact_store;
