//! Core ETL (Extract, Transform, Load) abstractions
//!
//! A run extracts raw organization records, transforms each into an output
//! row and loads all rows to the destination in one write.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::Transformer;
