//! Checkpointed bag-of-visual-words pipeline for grouping webcams by what
//! they see.

pub mod shared {
    pub mod artifact_maps;
    pub mod cluster_label;
    pub mod constants;
    pub mod descriptor_matrix;
    pub mod feature_histogram;
    pub mod frame;
    pub mod matrix_record;
    pub mod pipeline_settings;
    pub mod vocabulary;
}

pub mod checkpoint {
    pub mod domain {
        pub mod artifact;
        pub mod artifact_store;
        pub mod checkpoint_error;
        pub mod checkpoint_store;
    }
    pub mod infrastructure;
}

pub mod frames {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod vision {
    pub mod domain {
        pub mod representative_sampler;
        pub mod vision_backend;
    }
    pub mod infrastructure;
}

pub mod clustering {
    pub mod domain {
        pub mod clustering_backend;
    }
    pub mod infrastructure;
}

pub mod bovw {
    pub mod bovw_error;
    pub mod quantizer;
    pub mod vocabulary_builder;
}

pub mod pipeline {
    pub mod cluster_stage;
    pub mod cluster_webcams_use_case;
    pub mod compute_features_stage;
    pub mod extract_descriptors_stage;
    pub mod pipeline_error;
    pub mod pipeline_logger;
    pub mod stage_executor;
    pub mod work_queue;

    pub mod infrastructure;
}
