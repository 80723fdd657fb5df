use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis, ShapeError};
use serde::{Deserialize, Serialize};

use crate::shared::matrix_record::MatrixRecord;

/// Descriptors of one webcam: one fixed-width row per detected keypoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatrixRecord<f32>", try_from = "MatrixRecord<f32>")]
pub struct DescriptorMatrix {
    rows: Array2<f32>,
}

impl DescriptorMatrix {
    pub fn new(rows: Array2<f32>) -> Self {
        Self { rows }
    }

    pub fn empty(width: usize) -> Self {
        Self {
            rows: Array2::zeros((0, width)),
        }
    }

    /// Builds a matrix from row vectors that must all have length `width`.
    pub fn from_rows(rows: &[Vec<f32>], width: usize) -> Result<Self, ShapeError> {
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows.len(), width), data).map(Self::new)
    }

    /// Stacks matrices vertically, preserving row order.
    ///
    /// Empty parts are skipped so a zero-row matrix of any width never
    /// causes a width mismatch.
    pub fn vstack(parts: &[DescriptorMatrix]) -> Result<Self, ShapeError> {
        let views: Vec<ArrayView2<'_, f32>> = parts
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| m.rows.view())
            .collect();
        if views.is_empty() {
            let width = parts.first().map_or(0, |m| m.width());
            return Ok(Self::empty(width));
        }
        concatenate(Axis(0), &views).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    pub fn width(&self) -> usize {
        self.rows.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f32> {
        self.rows.row(index)
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.rows.view()
    }
}

impl From<DescriptorMatrix> for MatrixRecord<f32> {
    fn from(matrix: DescriptorMatrix) -> Self {
        MatrixRecord::from_array(&matrix.rows)
    }
}

impl TryFrom<MatrixRecord<f32>> for DescriptorMatrix {
    type Error = ShapeError;

    fn try_from(record: MatrixRecord<f32>) -> Result<Self, Self::Error> {
        record.into_array().map(Self::new)
    }
}
