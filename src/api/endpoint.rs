//! Typed endpoint factory
//!
//! An [`Endpoint`] pairs an HTTP method with a path template and fixes, at the
//! type level, the query shape `Q`, the path shape `P` and the response type
//! `R`. Passing another endpoint's parameter record does not compile.

use super::query::to_query_pairs;
use super::{ApiError, Transport};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether parameters travel in the query string rather than the body
    pub fn uses_query_string(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static path or a path computed from path parameters
pub enum PathTemplate<P> {
    Static(&'static str),
    Dynamic(fn(&P) -> String),
}

impl<P> PathTemplate<P> {
    pub fn resolve(&self, params: &P) -> String {
        match self {
            PathTemplate::Static(path) => (*path).to_string(),
            PathTemplate::Dynamic(build) => build(params),
        }
    }
}

impl<P> Clone for PathTemplate<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PathTemplate<P> {}

/// A fully resolved request, ready for a [`Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the server base URL, e.g. `/releases/web/history`
    pub path: String,
    /// Opaque bearer credential
    pub token: String,
    /// Query-string pairs (GET only)
    pub query: Vec<(String, String)>,
    /// JSON body (non-GET only)
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Look up a query-string or body parameter as a string
    pub fn param(&self, key: &str) -> Option<String> {
        if let Some((_, v)) = self.query.iter().find(|(k, _)| k == key) {
            return Some(v.clone());
        }
        self.body
            .as_ref()
            .and_then(|b| b.get(key))
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}

/// Raw response handed back by a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A typed remote call: method + path template + parameter contract
pub struct Endpoint<Q, P, R> {
    method: Method,
    path: PathTemplate<P>,
    _shape: PhantomData<fn(&Q) -> R>,
}

impl<Q, P, R> Clone for Endpoint<Q, P, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q, P, R> Copy for Endpoint<Q, P, R> {}

impl<Q, P, R> Endpoint<Q, P, R> {
    /// Endpoint with a fixed path
    pub const fn fixed(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path: PathTemplate::Static(path),
            _shape: PhantomData,
        }
    }

    /// Endpoint whose path is computed from its path parameters
    pub const fn templated(method: Method, build: fn(&P) -> String) -> Self {
        Self {
            method,
            path: PathTemplate::Dynamic(build),
            _shape: PhantomData,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self, params: &P) -> String {
        self.path.resolve(params)
    }
}

impl<Q, P, R> Endpoint<Q, P, R>
where
    Q: Serialize,
    R: DeserializeOwned,
{
    /// Resolve the path and serialize parameters without sending anything
    pub fn build_request(&self, token: &str, query: &Q, path: &P) -> Result<ApiRequest, ApiError> {
        let (query, body) = if self.method.uses_query_string() {
            (to_query_pairs(query)?, None)
        } else {
            let body = serde_json::to_value(query).map_err(|e| ApiError::Encode(e.to_string()))?;
            (Vec::new(), (!body.is_null()).then_some(body))
        };

        Ok(ApiRequest {
            method: self.method,
            path: self.path.resolve(path),
            token: token.to_string(),
            query,
            body,
        })
    }

    /// Issue exactly one request and decode its response
    pub async fn call(
        &self,
        transport: &dyn Transport,
        token: &str,
        query: &Q,
        path: &P,
    ) -> Result<R, ApiError> {
        let request = self.build_request(token, query, path)?;
        let label = format!("{} {}", request.method, request.path);
        tracing::debug!("Issuing {}", label);

        let response = transport.send(request).await.inspect_err(|e| {
            tracing::debug!("{} failed before a response arrived: {}", label, e);
        })?;

        tracing::debug!("{} resolved with status {}", label, response.status);
        decode_response(response)
    }
}

/// Map a raw response onto the endpoint's response type
pub fn decode_response<R: DeserializeOwned>(response: ApiResponse) -> Result<R, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(response.status, &response.body));
    }

    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };

    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
