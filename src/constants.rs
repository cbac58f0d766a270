//! Shared constants used across the application.

/// Maximum number of notifications kept in the snapshot. Oldest entries are
/// dropped first once the cap is exceeded.
pub const NOTIFICATION_STORAGE_CAP: usize = 150;

/// Maximum number of notifications returned by a single query.
pub const NOTIFICATION_QUERY_LIMIT: usize = 20;

/// Default request body cap in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_000_000;
