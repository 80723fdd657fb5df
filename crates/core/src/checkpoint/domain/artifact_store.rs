use crate::checkpoint::domain::artifact::Namespace;
use crate::checkpoint::domain::checkpoint_error::CheckpointError;

/// Raw persistence of serialized artifacts keyed by `(namespace, id)`.
///
/// Writes to distinct ids may run concurrently. A write is all-or-nothing:
/// readers observe either no artifact or the complete payload.
pub trait ArtifactStore: Send + Sync {
    /// Returns `None` when nothing has been stored for `(namespace, id)`.
    fn read(&self, namespace: Namespace, id: &str) -> Result<Option<Vec<u8>>, CheckpointError>;

    fn write(&self, namespace: Namespace, id: &str, payload: &[u8])
        -> Result<(), CheckpointError>;

    /// Removes every artifact in `namespace`.
    fn clear(&self, namespace: Namespace) -> Result<(), CheckpointError>;
}
