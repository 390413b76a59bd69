//! JSON envelopes shared by the REST server and the remote client.
//!
//! Success: `{"data": ..., "success": true}`.
//! Failure: `{"error": "...", "success": false}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub data: T,
    pub success: bool,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            success: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFailure {
    pub error: String,
    pub success: bool,
}

impl ApiFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}

/// Body of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedId {
    pub id: i64,
}
