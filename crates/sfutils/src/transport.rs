//! The RPC seam between [`RecordClient`](crate::RecordClient) and the remote store.
//!
//! Connecting, authenticating, encoding the wire protocol and retrying are
//! the transport's job. The client only needs one call:
//! `call(operation, named_arguments)`.

use serde_json::{Map, Value as Json};
use std::future::Future;
use thiserror::Error;

/// Operation names passed to [`Transport::call`].
pub mod operation {
    pub const QUERY: &str = "query";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const RETRIEVE: &str = "retrieve";
    pub const UNDELETE: &str = "undelete";
    pub const UPSERT: &str = "upsert";
    pub const DESCRIBE_SOBJECTS: &str = "describeSObjects";
}

/// Named arguments for a transport call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs(Map<String, Json>);

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument (builder form).
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Json> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Json> {
        self.0
    }

    /// The arguments as a JSON object.
    pub fn to_json(&self) -> Json {
        Json::Object(self.0.clone())
    }
}

impl From<Map<String, Json>> for CallArgs {
    fn from(map: Map<String, Json>) -> Self {
        Self(map)
    }
}

/// An opaque failure raised by a transport.
#[derive(Debug, Error)]
#[error("Transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error (network, authentication, serialization).
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A connection to the remote record store.
///
/// Implementations are responsible for any connection-level synchronization
/// when shared between tasks.
pub trait Transport: Send + Sync {
    /// Issue one remote operation and return its decoded JSON response.
    fn call(
        &self,
        operation: &str,
        args: CallArgs,
    ) -> impl Future<Output = Result<Json, TransportError>> + Send;
}

impl<T: Transport> Transport for &T {
    fn call(
        &self,
        operation: &str,
        args: CallArgs,
    ) -> impl Future<Output = Result<Json, TransportError>> + Send {
        (**self).call(operation, args)
    }
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn call(
        &self,
        operation: &str,
        args: CallArgs,
    ) -> impl Future<Output = Result<Json, TransportError>> + Send {
        (**self).call(operation, args)
    }
}
