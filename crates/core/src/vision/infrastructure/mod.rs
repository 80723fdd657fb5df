pub mod gradient_histogram_backend;
