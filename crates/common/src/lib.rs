pub mod error;
pub mod types;

pub use error::Error;
pub use types::{BestPathMap, Edge, Path, Vertex};
