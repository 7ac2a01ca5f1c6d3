use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable error message
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Offset pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Number of records to skip (default: 0)
    #[serde(default)]
    #[param(minimum = 0)]
    pub skip: i64,

    /// Maximum number of records to return (default: 100)
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PaginationQuery {
    /// SQL OFFSET, never negative
    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }

    /// Clamped SQL LIMIT (respects MAX_PAGE_LIMIT)
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }
}
