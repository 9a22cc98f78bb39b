//! An in-memory transport that records calls and replays scripted responses.

use crate::client::RecordClient;
use crate::transport::{CallArgs, Transport, TransportError};
use serde_json::Value as Json;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<(String, CallArgs)>>,
    responses: Mutex<VecDeque<Result<Json, TransportError>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub(crate) fn respond(self, json: Json) -> Self {
        self.responses.lock().unwrap().push_back(Ok(json));
        self
    }

    /// Queue a transport failure.
    pub(crate) fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, CallArgs)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn into_client(self) -> RecordClient<Self> {
        RecordClient::new(self)
    }
}

impl Transport for ScriptedTransport {
    async fn call(&self, operation: &str, args: CallArgs) -> Result<Json, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), args));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new(format!("no response scripted for {operation}"))))
    }
}

/// Shorthand for a `query` response.
pub(crate) fn query_response(records: Vec<Json>) -> Json {
    serde_json::json!({
        "size": records.len(),
        "done": true,
        "records": records,
    })
}
