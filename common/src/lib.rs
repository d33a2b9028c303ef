pub mod config;
pub mod yaml_include;

/// Common utilities shared across the storefront workspace
///
/// This crate provides shared functionality used by the `commerce` core and
/// the `storefront` binaries:
///
/// - Configuration loading (`config`)
/// - Build-time YAML include merging (`yaml_include`)
/// - Test identifiers and database URLs (`test_helpers`)

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{generate_unique_code, generate_unique_id, get_test_database_url};
