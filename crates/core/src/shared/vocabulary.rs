use ndarray::{Array2, ArrayView1, ArrayView2, ShapeError};
use serde::{Deserialize, Serialize};

use crate::shared::matrix_record::MatrixRecord;

/// The visual words: k centroid rows in descriptor space.
///
/// Computed once per run and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatrixRecord<f32>", try_from = "MatrixRecord<f32>")]
pub struct Vocabulary {
    words: Array2<f32>,
}

impl Vocabulary {
    pub fn new(words: Array2<f32>) -> Self {
        Self { words }
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.words.nrows() == 0
    }

    pub fn width(&self) -> usize {
        self.words.ncols()
    }

    pub fn word(&self, index: usize) -> ArrayView1<'_, f32> {
        self.words.row(index)
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.words.view()
    }
}

impl From<Vocabulary> for MatrixRecord<f32> {
    fn from(vocabulary: Vocabulary) -> Self {
        MatrixRecord::from_array(&vocabulary.words)
    }
}

impl TryFrom<MatrixRecord<f32>> for Vocabulary {
    type Error = ShapeError;

    fn try_from(record: MatrixRecord<f32>) -> Result<Self, Self::Error> {
        record.into_array().map(Self::new)
    }
}
