/// Shared Test Helpers for Cross-Crate Use
///
/// Centralized test utilities used by both the `commerce` and `storefront`
/// crates so parallel tests never collide on catalog codes or tokens.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global counter for unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique identifier in the format `{prefix}-{timestamp}-{counter}`.
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// Generate a unique uppercase catalog or offer code, e.g. `SKU-17`.
pub fn generate_unique_code(prefix: &str) -> String {
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix.to_uppercase(), counter)
}

/// Get the test database URL from environment or default
///
/// Defaults to an in-memory SQLite database so storage tests run without
/// an external server; set `TEST_DATABASE_URL` to point them at Postgres.
pub fn get_test_database_url() -> String {
    std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| get_test_in_memory_database_url())
}

/// Get an in-memory SQLite database URL for unit tests
pub fn get_test_in_memory_database_url() -> String {
    "sqlite::memory:".to_string()
}
