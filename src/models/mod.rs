pub mod query;
pub mod recommendation;

pub use query::*;
pub use recommendation::*;
