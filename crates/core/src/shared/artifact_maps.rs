//! Identifier-keyed artifact mappings.
//!
//! Ordered maps keep stage output (and therefore clustering input order)
//! independent of hash seeds.

use std::collections::BTreeMap;

use crate::shared::cluster_label::ClusterLabel;
use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::feature_histogram::FeatureHistogram;

/// Webcam identifier → representative descriptors.
pub type DescriptorsMap = BTreeMap<String, DescriptorMatrix>;

/// Webcam identifier → feature histogram.
pub type FeaturesMap = BTreeMap<String, FeatureHistogram>;

/// Webcam identifier → cluster assignment.
pub type ClustersMap = BTreeMap<String, ClusterLabel>;
