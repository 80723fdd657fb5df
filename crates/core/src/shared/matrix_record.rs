use ndarray::{Array2, ShapeError};
use serde::{Deserialize, Serialize};

/// Row-major on-disk form shared by every checkpointed artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixRecord<T> {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<T>,
}

impl<T: Clone> MatrixRecord<T> {
    pub fn from_array(array: &Array2<T>) -> Self {
        Self {
            rows: array.nrows(),
            cols: array.ncols(),
            data: array.iter().cloned().collect(),
        }
    }

    pub fn into_array(self) -> Result<Array2<T>, ShapeError> {
        Array2::from_shape_vec((self.rows, self.cols), self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_array_is_row_major() {
        let record = MatrixRecord::from_array(&array![[1, 2, 3], [4, 5, 6]]);
        assert_eq!(record.rows, 2);
        assert_eq!(record.cols, 3);
        assert_eq!(record.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_into_array_rejects_wrong_length() {
        let record = MatrixRecord {
            rows: 2,
            cols: 2,
            data: vec![1.0f32, 2.0, 3.0],
        };
        assert!(record.into_array().is_err());
    }

    #[test]
    fn test_empty_matrix_keeps_width() {
        let record = MatrixRecord::<f32> {
            rows: 0,
            cols: 128,
            data: vec![],
        };
        let array = record.into_array().unwrap();
        assert_eq!(array.dim(), (0, 128));
    }
}
