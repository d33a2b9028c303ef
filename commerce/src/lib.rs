pub mod catalog;
pub mod checkout;
pub mod error;
pub mod executable_utils;
pub mod identifiers;
pub mod model;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod totals;

pub use error::{CommerceError, CommerceResult};
