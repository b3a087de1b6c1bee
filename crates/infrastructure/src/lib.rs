pub mod audit;
pub mod dynamodb;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod store;

pub use audit::*;
pub use dynamodb::*;
pub use memory::*;
pub use repositories::*;
pub use store::*;
