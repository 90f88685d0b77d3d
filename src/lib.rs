#![doc = "Administrative-boundary centroid extraction and front-end literal generation"]
mod common;
pub mod emit;
pub mod error;
pub mod geom;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod table;
pub mod translate;

#[doc(inline)]
pub use error::AdmError;

#[doc(inline)]
pub use pipeline::{run_centroids, run_convert, CentroidOptions, ConvertOptions};

#[doc(inline)]
pub use source::{BoundarySource, LayerPolicy, Provider};

#[doc(inline)]
pub use schema::SchemaPolicy;

#[doc(inline)]
pub use table::{CentroidRecord, NullRowPolicy};

#[doc(inline)]
pub use translate::Translator;
