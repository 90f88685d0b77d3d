pub mod centroids;
pub mod convert;
