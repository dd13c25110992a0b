//! Limit/skip clamping shared by every listing operation.

/// Default page size when the caller supplies no limit.
pub const DEFAULT_LIMIT: i64 = 24;

/// Maximum page size a caller can request.
pub const MAX_LIMIT: i64 = 100;

/// A clamped limit/skip window passed through to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub skip: i64,
}

impl Page {
    /// Clamp caller-supplied values: limit into [1, 100] (default 24),
    /// skip to >= 0 (default 0).
    pub fn clamped(limit: Option<i64>, skip: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            skip: skip.unwrap_or(0).max(0),
        }
    }
}
