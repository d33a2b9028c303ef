//! Customer-facing pieces of the storefront: the order history client and view.
//!
//! The HTTP backend itself lives in `commerce`; the `backend` binary here only wires
//! it to configuration.

pub mod history;
