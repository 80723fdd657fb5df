use ndarray::ShapeError;
use serde::{Deserialize, Serialize};

use crate::shared::matrix_record::MatrixRecord;

/// Bag-of-visual-words feature: one raw count per vocabulary word.
///
/// The counts sum to the number of descriptor rows they were built from.
/// Stored as a k×1 column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MatrixRecord<u32>", try_from = "MatrixRecord<u32>")]
pub struct FeatureHistogram {
    counts: Vec<u32>,
}

impl FeatureHistogram {
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            counts: vec![0; len],
        }
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn increment(&mut self, word: usize) {
        self.counts[word] += 1;
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.counts.iter().map(|&c| c as f32).collect()
    }
}

impl From<FeatureHistogram> for MatrixRecord<u32> {
    fn from(histogram: FeatureHistogram) -> Self {
        MatrixRecord {
            rows: histogram.counts.len(),
            cols: 1,
            data: histogram.counts,
        }
    }
}

impl TryFrom<MatrixRecord<u32>> for FeatureHistogram {
    type Error = ShapeError;

    fn try_from(record: MatrixRecord<u32>) -> Result<Self, Self::Error> {
        let column = record.into_array()?;
        Ok(Self::new(column.iter().copied().collect()))
    }
}
