//! Client configuration.

use crate::monitor::CallHook;
use crate::record::DEFAULT_ID_FIELD;
use std::fmt;
use std::sync::Arc;

/// Default name of the reserved field holding a record type id.
pub const DEFAULT_RECORD_TYPE_FIELD: &str = "RecordTypeId";

/// Configuration for [`RecordClient`](crate::RecordClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Identifier field name on the wire.
    pub id_field: String,
    /// Field [`Writer::create`](crate::Writer::create) sets when given a record type id.
    pub record_type_field: String,
    /// Hooks notified around every transport call, in registration order.
    pub hooks: Vec<Arc<dyn CallHook>>,
    /// Query truncation used by [`with_tracing`](Self::with_tracing).
    pub log_query_max_len: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            record_type_field: DEFAULT_RECORD_TYPE_FIELD.to_string(),
            hooks: Vec::new(),
            log_query_max_len: Some(200),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("id_field", &self.id_field)
            .field("record_type_field", &self.record_type_field)
            .field("hooks", &self.hooks.len())
            .field("log_query_max_len", &self.log_query_max_len)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the identifier field name.
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = name.into();
        self
    }

    /// Override the record type field name.
    pub fn record_type_field(mut self, name: impl Into<String>) -> Self {
        self.record_type_field = name.into();
        self
    }

    /// Register a call hook.
    pub fn with_hook(mut self, hook: Arc<dyn CallHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Truncate logged queries to `len` bytes; `None` disables truncation.
    ///
    /// Applies to hooks registered by later [`with_tracing`](Self::with_tracing) calls.
    pub fn log_query_max_len(mut self, len: Option<usize>) -> Self {
        self.log_query_max_len = len;
        self
    }

    /// Register a [`TracingCallHook`](crate::TracingCallHook) at `DEBUG`.
    #[cfg(feature = "tracing")]
    pub fn with_tracing(self) -> Self {
        let hook = crate::monitor::TracingCallHook::new();
        let hook = match self.log_query_max_len {
            Some(len) => hook.max_query_length(len),
            None => hook.no_truncate(),
        };
        self.with_hook(Arc::new(hook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::StatsHook;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.id_field, "Id");
        assert_eq!(config.record_type_field, "RecordTypeId");
        assert!(config.hooks.is_empty());
        assert_eq!(config.log_query_max_len, Some(200));
    }

    #[test]
    fn config_builder() {
        let config = ClientConfig::new()
            .id_field("id")
            .record_type_field("recordTypeId")
            .with_hook(Arc::new(StatsHook::new()));
        assert_eq!(config.id_field, "id");
        assert_eq!(config.record_type_field, "recordTypeId");
        assert_eq!(config.hooks.len(), 1);
        assert!(format!("{config:?}").contains("hooks: 1"));
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn with_tracing_registers_hook() {
        let config = ClientConfig::new().log_query_max_len(None).with_tracing();
        assert_eq!(config.hooks.len(), 1);
        assert_eq!(config.log_query_max_len, None);
    }
}
