//! Hooks around transport calls.
//!
//! [`RecordClient`](crate::RecordClient) reports every transport call to the
//! hooks registered on its [`ClientConfig`](crate::ClientConfig):
//!
//! ```ignore
//! use sfutils::{ClientConfig, RecordClient, StatsHook};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatsHook::new());
//! let client = RecordClient::with_config(transport, ClientConfig::new().with_hook(stats.clone()));
//! // ...
//! println!("{:?}", stats.stats());
//! ```

use crate::transport::operation;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// What a transport call is about to do.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Transport operation name, e.g. `query` or `create`.
    pub operation: String,
    /// The rendered query string (for `query` only).
    pub query: Option<String>,
    /// Object type, when the operation names one.
    pub object_type: Option<String>,
    /// Number of records or ids in a batch operation.
    pub batch_size: usize,
}

impl CallContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            query: None,
            object_type: None,
            batch_size: 0,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

/// How a transport call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Ok,
    /// The transport failed; carries its message.
    Failed(String),
}

impl CallStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Observes transport calls. Both methods default to doing nothing.
pub trait CallHook: Send + Sync {
    fn before_call(&self, _ctx: &CallContext) {}

    fn after_call(&self, _ctx: &CallContext, _duration: Duration, _status: &CallStatus) {}
}

/// Snapshot of [`StatsHook`] counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStats {
    pub total_calls: u64,
    pub failed_calls: u64,
    pub query_calls: u64,
    pub create_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub other_calls: u64,
    pub total_duration: Duration,
}

/// A hook that counts calls by operation.
#[derive(Debug, Default)]
pub struct StatsHook {
    total_calls: AtomicU64,
    failed_calls: AtomicU64,
    query_calls: AtomicU64,
    create_calls: AtomicU64,
    update_calls: AtomicU64,
    delete_calls: AtomicU64,
    other_calls: AtomicU64,
    total_duration_nanos: AtomicU64,
}

impl StatsHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CallStats {
        CallStats {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
            query_calls: self.query_calls.load(Ordering::Relaxed),
            create_calls: self.create_calls.load(Ordering::Relaxed),
            update_calls: self.update_calls.load(Ordering::Relaxed),
            delete_calls: self.delete_calls.load(Ordering::Relaxed),
            other_calls: self.other_calls.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.total_calls,
            &self.failed_calls,
            &self.query_calls,
            &self.create_calls,
            &self.update_calls,
            &self.delete_calls,
            &self.other_calls,
            &self.total_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl CallHook for StatsHook {
    fn after_call(&self, ctx: &CallContext, duration: Duration, status: &CallStatus) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if !status.is_ok() {
            self.failed_calls.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match ctx.operation.as_str() {
            operation::QUERY => &self.query_calls,
            operation::CREATE => &self.create_calls,
            operation::UPDATE => &self.update_calls,
            operation::DELETE => &self.delete_calls,
            _ => &self.other_calls,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

/// Truncate to at most `max` bytes without splitting a character.
pub(crate) fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingCallHook;

#[cfg(feature = "tracing")]
mod tracing_hook {
    use super::{CallContext, CallHook, CallStatus, truncate_at_char_boundary};
    use std::time::Duration;
    use tracing::Level;

    /// A `tracing`-based hook that emits one event per transport call.
    ///
    /// Enable via the crate feature: `sfutils = { features = ["tracing"] }`.
    #[derive(Debug, Clone)]
    pub struct TracingCallHook {
        /// Tracing event level for successful calls. Failures are logged at `WARN`.
        pub level: Level,
        /// Truncate long query strings (in bytes). `None` means no truncation.
        pub max_query_length: Option<usize>,
    }

    impl Default for TracingCallHook {
        fn default() -> Self {
            Self {
                level: Level::DEBUG,
                max_query_length: Some(200),
            }
        }
    }

    impl TracingCallHook {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn max_query_length(mut self, len: usize) -> Self {
            self.max_query_length = Some(len);
            self
        }

        pub fn no_truncate(mut self) -> Self {
            self.max_query_length = None;
            self
        }

        pub(super) fn truncate_query(&self, query: &str) -> String {
            match self.max_query_length {
                Some(max) if query.len() > max => {
                    format!("{}...", truncate_at_char_boundary(query, max))
                }
                _ => query.to_string(),
            }
        }
    }

    impl CallHook for TracingCallHook {
        fn after_call(&self, ctx: &CallContext, duration: Duration, status: &CallStatus) {
            macro_rules! emit_at_level {
                ($level:expr, $($field:tt)*) => {
                    match $level {
                        Level::ERROR => tracing::error!($($field)*),
                        Level::WARN  => tracing::warn!($($field)*),
                        Level::INFO  => tracing::info!($($field)*),
                        Level::DEBUG => tracing::debug!($($field)*),
                        Level::TRACE => tracing::trace!($($field)*),
                    }
                };
            }

            let query = ctx.query.as_deref().map(|q| self.truncate_query(q));
            let query = query.as_deref().unwrap_or("-");
            let object_type = ctx.object_type.as_deref().unwrap_or("-");
            match status {
                CallStatus::Ok => emit_at_level!(
                    self.level,
                    target: "sfutils.call",
                    operation = %ctx.operation,
                    object_type,
                    batch_size = ctx.batch_size,
                    ?duration,
                    query = %query,
                ),
                CallStatus::Failed(message) => tracing::warn!(
                    target: "sfutils.call",
                    operation = %ctx.operation,
                    object_type,
                    batch_size = ctx.batch_size,
                    ?duration,
                    query = %query,
                    error = %message,
                    "transport call failed",
                ),
            }
        }
    }
}
