//! Transport trait

use super::{ApiError, ApiRequest, ApiResponse};
use async_trait::async_trait;

/// Carries a resolved request to the release server.
///
/// Implementations issue exactly one network request per `send` and never
/// retry, cache or deduplicate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and hand back the raw response
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}
