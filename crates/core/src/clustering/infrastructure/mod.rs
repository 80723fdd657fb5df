pub mod lloyd_kmeans;
