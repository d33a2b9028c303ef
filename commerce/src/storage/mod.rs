// Storage traits and their SeaORM implementation
pub mod catalog;
pub mod order;
pub mod prod;
pub mod session;

pub use catalog::*;
pub use order::*;
pub use prod::*;
pub use session::*;
