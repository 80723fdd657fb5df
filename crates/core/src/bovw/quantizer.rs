//! Brute-force nearest-word quantization.
//!
//! Every descriptor row is compared against every vocabulary word, so a call
//! costs O(rows · words · width). Exact argmin with lowest-index tie-breaking
//! keeps the histogram deterministic.

use ndarray::{ArrayView1, ArrayView2};

use crate::bovw::bovw_error::BovwError;
use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::feature_histogram::FeatureHistogram;
use crate::shared::vocabulary::Vocabulary;

/// Counts how many descriptors fall closest to each vocabulary word.
///
/// The result has one bin per word and its counts sum to `descriptors.len()`.
/// An empty descriptor matrix yields the all-zero histogram.
pub fn quantize(
    descriptors: &DescriptorMatrix,
    vocabulary: &Vocabulary,
) -> Result<FeatureHistogram, BovwError> {
    if vocabulary.is_empty() {
        return Err(BovwError::EmptyVocabulary);
    }
    let mut histogram = FeatureHistogram::zeros(vocabulary.len());
    if descriptors.is_empty() {
        return Ok(histogram);
    }
    if descriptors.width() != vocabulary.width() {
        return Err(BovwError::WidthMismatch {
            expected: vocabulary.width(),
            found: descriptors.width(),
        });
    }

    let words = vocabulary.view();
    for row in descriptors.view().rows() {
        histogram.increment(nearest_word(row, words));
    }
    Ok(histogram)
}

/// Index of the word with the smallest Euclidean distance to `descriptor`.
///
/// Squared distances are compared, which preserves the argmin. A later word
/// only wins when strictly closer, so ties resolve to the lowest index.
pub fn nearest_word(descriptor: ArrayView1<'_, f32>, words: ArrayView2<'_, f32>) -> usize {
    let mut closest_word = 0;
    let mut smallest_distance = f64::INFINITY;
    for (index, word) in words.rows().into_iter().enumerate() {
        let distance: f64 = descriptor
            .iter()
            .zip(word.iter())
            .map(|(&d, &w)| {
                let diff = d as f64 - w as f64;
                diff * diff
            })
            .sum();
        if distance < smallest_distance {
            smallest_distance = distance;
            closest_word = index;
        }
    }
    closest_word
}
