use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::cluster_label::ClusterLabel;
use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::feature_histogram::FeatureHistogram;
use crate::shared::vocabulary::Vocabulary;

/// Artifact class; each pipeline stage owns writes to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Descriptors,
    Features,
    Vocabulary,
    Clusters,
}

impl Namespace {
    pub const ALL: &'static [Namespace] = &[
        Namespace::Descriptors,
        Namespace::Features,
        Namespace::Vocabulary,
        Namespace::Clusters,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Namespace::Descriptors => "descriptors",
            Namespace::Features => "features",
            Namespace::Vocabulary => "vocabulary",
            Namespace::Clusters => "clusters",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A value that can be checkpointed under a fixed namespace.
pub trait Artifact: Serialize + DeserializeOwned {
    const NAMESPACE: Namespace;
}

impl Artifact for DescriptorMatrix {
    const NAMESPACE: Namespace = Namespace::Descriptors;
}

impl Artifact for FeatureHistogram {
    const NAMESPACE: Namespace = Namespace::Features;
}

impl Artifact for Vocabulary {
    const NAMESPACE: Namespace = Namespace::Vocabulary;
}

impl Artifact for ClusterLabel {
    const NAMESPACE: Namespace = Namespace::Clusters;
}
