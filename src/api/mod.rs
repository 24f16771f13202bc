//! Remote call layer
//!
//! Builds strongly-typed request functions from an HTTP method and a path
//! template. Each call issues exactly one request through a [`Transport`] and
//! resolves to exactly one `Result`; there is no retry, caching or
//! deduplication at this layer.

mod endpoint;
mod error;
mod http;
mod query;
mod transport;

pub use endpoint::{ApiRequest, ApiResponse, Endpoint, Method, PathTemplate, decode_response};
pub use error::{ApiError, DECODE_FAILURE_MESSAGE, TRANSPORT_FAILURE_MESSAGE};
pub use http::{DEFAULT_TIMEOUT, HttpTransport};
pub use query::to_query_pairs;
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::Transport;
