use ndarray::ShapeError;
use serde::{Deserialize, Serialize};

use crate::shared::matrix_record::MatrixRecord;

/// Cluster assignment of one webcam, in `[0, num_clusters)`.
///
/// Stored as a 1×1 matrix so every namespace shares one artifact format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "MatrixRecord<u32>", try_from = "MatrixRecord<u32>")]
pub struct ClusterLabel(pub u32);

impl ClusterLabel {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ClusterLabel> for MatrixRecord<u32> {
    fn from(label: ClusterLabel) -> Self {
        MatrixRecord {
            rows: 1,
            cols: 1,
            data: vec![label.0],
        }
    }
}

impl TryFrom<MatrixRecord<u32>> for ClusterLabel {
    type Error = ShapeError;

    fn try_from(record: MatrixRecord<u32>) -> Result<Self, Self::Error> {
        let matrix = record.into_array()?;
        matrix
            .iter()
            .next()
            .copied()
            .map(ClusterLabel)
            .ok_or_else(|| ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape))
    }
}
