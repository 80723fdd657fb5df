use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::checkpoint::domain::artifact::Namespace;
use crate::checkpoint::domain::artifact_store::ArtifactStore;
use crate::checkpoint::domain::checkpoint_error::CheckpointError;
use crate::shared::constants::ARTIFACT_EXTENSION;

/// Stores each artifact as `<root>/<namespace>/<id>.json`.
///
/// Payloads are written to a `.part` sibling and renamed into place, so a
/// crash mid-write never leaves a truncated artifact behind.
pub struct FileArtifactStore {
    root: PathBuf,
}

impl FileArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.root.join(namespace.dir_name())
    }

    pub fn artifact_path(&self, namespace: Namespace, id: &str) -> PathBuf {
        self.namespace_dir(namespace)
            .join(format!("{id}.{ARTIFACT_EXTENSION}"))
    }
}

impl ArtifactStore for FileArtifactStore {
    fn read(&self, namespace: Namespace, id: &str) -> Result<Option<Vec<u8>>, CheckpointError> {
        let path = self.artifact_path(namespace, id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CheckpointError::Read { path, source: e }),
        }
    }

    fn write(
        &self,
        namespace: Namespace,
        id: &str,
        payload: &[u8],
    ) -> Result<(), CheckpointError> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir).map_err(|e| write_error(&dir, e))?;

        let dest = self.artifact_path(namespace, id);
        let temp_path = dest.with_extension(format!("{ARTIFACT_EXTENSION}.part"));
        let mut file = fs::File::create(&temp_path).map_err(|e| write_error(&temp_path, e))?;
        file.write_all(payload)
            .map_err(|e| write_error(&temp_path, e))?;
        file.sync_all().map_err(|e| write_error(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &dest).map_err(|e| write_error(&dest, e))
    }

    fn clear(&self, namespace: Namespace) -> Result<(), CheckpointError> {
        match fs::remove_dir_all(self.namespace_dir(namespace)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckpointError::Clear {
                namespace,
                source: e,
            }),
        }
    }
}

fn write_error(path: &Path, source: std::io::Error) -> CheckpointError {
    CheckpointError::Write {
        path: path.to_path_buf(),
        source,
    }
}
