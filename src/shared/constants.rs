/// Default number of items returned by list endpoints
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Maximum number of items a single list request may return
pub const MAX_PAGE_LIMIT: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Superuser role - can read and modify every item regardless of owner
pub const ROLE_SUPERUSER: &str = "superuser";

// =============================================================================
// MEDIA CONSTANTS
// =============================================================================

/// Default upload size ceiling in megabytes (server and widget)
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;

/// Cache key for the item list query
pub const ITEMS_QUERY_KEY: &str = "items";
