use std::collections::BTreeMap;
use std::sync::Arc;

use crate::checkpoint::domain::artifact::{Artifact, Namespace};
use crate::checkpoint::domain::artifact_store::ArtifactStore;
use crate::checkpoint::domain::checkpoint_error::CheckpointError;

/// Typed checkpoint access on top of an [`ArtifactStore`].
///
/// Presence of an artifact is the only signal that a unit of work is done,
/// so a missing artifact is `Ok(None)`, never an error.
#[derive(Clone)]
pub struct CheckpointStore {
    backend: Arc<dyn ArtifactStore>,
}

impl CheckpointStore {
    pub fn new(backend: Arc<dyn ArtifactStore>) -> Self {
        Self { backend }
    }

    pub fn load<A: Artifact>(&self, id: &str) -> Result<Option<A>, CheckpointError> {
        validate_id(id)?;
        let Some(payload) = self.backend.read(A::NAMESPACE, id)? else {
            return Ok(None);
        };
        serde_json::from_slice(&payload)
            .map(Some)
            .map_err(|e| CheckpointError::Malformed {
                namespace: A::NAMESPACE,
                id: id.to_string(),
                source: e,
            })
    }

    pub fn store<A: Artifact>(&self, id: &str, artifact: &A) -> Result<(), CheckpointError> {
        validate_id(id)?;
        let payload = serde_json::to_vec(artifact).map_err(|e| CheckpointError::Malformed {
            namespace: A::NAMESPACE,
            id: id.to_string(),
            source: e,
        })?;
        self.backend.write(A::NAMESPACE, id, &payload)
    }

    /// Loads every present artifact among `ids`; absent ids are omitted.
    pub fn load_all<A, I, S>(&self, ids: I) -> Result<BTreeMap<String, A>, CheckpointError>
    where
        A: Artifact,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        for id in ids {
            let id = id.as_ref();
            if let Some(artifact) = self.load::<A>(id)? {
                map.insert(id.to_string(), artifact);
            }
        }
        Ok(map)
    }

    pub fn clear(&self, namespace: Namespace) -> Result<(), CheckpointError> {
        self.backend.clear(namespace)
    }

    pub fn clear_all(&self) -> Result<(), CheckpointError> {
        Namespace::ALL.iter().try_for_each(|&ns| self.clear(ns))
    }
}

/// Ids become file names, so they must not be able to leave their namespace.
fn validate_id(id: &str) -> Result<(), CheckpointError> {
    let escapes = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if escapes {
        return Err(CheckpointError::InvalidId(id.to_string()));
    }
    Ok(())
}
