pub mod csr;
pub mod solver;
pub mod store;
pub mod traits;

pub use csr::GraphCSR;
pub use solver::{QueueDiscipline, SPFASolver};
pub use store::GraphStore;
pub use traits::GraphSolver;
