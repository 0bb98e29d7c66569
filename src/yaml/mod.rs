pub mod editor;
pub mod emit;
pub mod errors;
pub mod operations;
pub mod query;
pub mod scan;
pub mod tree;

pub use editor::{EditPlan, FrontmatterEditor};
pub use errors::FrontmatterError;
pub use operations::{FrontmatterEdit, InsertValue, Position};
pub use query::KeyPath;
pub use tree::{FrontmatterTree, Scalar};
