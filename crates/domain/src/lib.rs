pub mod errors;
pub mod query;
pub mod todo;

pub use errors::*;
pub use query::*;
pub use todo::*;
