use std::collections::HashMap;
use std::sync::Mutex;

use crate::checkpoint::domain::artifact::Namespace;
use crate::checkpoint::domain::artifact_store::ArtifactStore;
use crate::checkpoint::domain::checkpoint_error::CheckpointError;

/// Process-local artifact store; nothing survives the process.
///
/// Useful for dry runs and tests where the on-disk layout is irrelevant.
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<(Namespace, String), Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts currently held in `namespace`.
    pub fn count(&self, namespace: Namespace) -> usize {
        self.lock()
            .keys()
            .filter(|(ns, _)| *ns == namespace)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(Namespace, String), Vec<u8>>> {
        // A panicking writer cannot leave a half-inserted entry behind.
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn read(&self, namespace: Namespace, id: &str) -> Result<Option<Vec<u8>>, CheckpointError> {
        Ok(self.lock().get(&(namespace, id.to_string())).cloned())
    }

    fn write(
        &self,
        namespace: Namespace,
        id: &str,
        payload: &[u8],
    ) -> Result<(), CheckpointError> {
        self.lock()
            .insert((namespace, id.to_string()), payload.to_vec());
        Ok(())
    }

    fn clear(&self, namespace: Namespace) -> Result<(), CheckpointError> {
        self.lock().retain(|(ns, _), _| *ns != namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_and_count() {
        let store = MemoryArtifactStore::new();
        store.write(Namespace::Descriptors, "a", b"1").unwrap();
        store.write(Namespace::Descriptors, "b", b"2").unwrap();
        store.write(Namespace::Features, "a", b"3").unwrap();

        assert_eq!(store.count(Namespace::Descriptors), 2);
        assert_eq!(store.read(Namespace::Features, "a").unwrap().unwrap(), b"3");
        assert!(store.read(Namespace::Features, "b").unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let store = MemoryArtifactStore::new();
        store.write(Namespace::Clusters, "a", b"1").unwrap();
        store.clear(Namespace::Clusters).unwrap();
        assert_eq!(store.count(Namespace::Clusters), 0);
    }
}
