//! # sfutils
//!
//! Injection-safe query templates and record helpers for Salesforce-style
//! record APIs.
//!
//! ## Features
//!
//! - **Escaping**: every [`Value`] has a defined literal form; free text is
//!   escaped in a single pass and optionally quoted
//! - **Templates**: `:name`, `::name` and `?` placeholders, with lists
//!   expanding to `( 'a', 'b' )` for `IN` clauses
//! - **Record client**: batch create/update/upsert/delete/undelete/retrieve/describe
//!   with uniform `*_one` helpers, over any [`Transport`]
//! - **Writer**: build payloads from field values and turn failed saves into errors
//! - **Call hooks**: statistics and `tracing` logs around every transport call
//!
//! ## Example
//!
//! ```ignore
//! use sfutils::{RecordClient, Value};
//!
//! let client = RecordClient::new(transport);
//!
//! // SELECT Id FROM Contact WHERE Email = 'o\'brien@example.com' AND AccountId IN ( '001A', '001B' )
//! let contacts = client
//!     .query_all(
//!         "SELECT Id FROM Contact WHERE Email = :email AND AccountId IN :accounts",
//!         [
//!             ("email", Value::from("o'brien@example.com")),
//!             ("accounts", Value::from(vec!["001A", "001B"])),
//!         ],
//!     )
//!     .await?;
//!
//! let writer = client.writer();
//! writer
//!     .update("Contact", "003A", [("Title", "Director")])
//!     .await?;
//! ```

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod escape;
pub mod monitor;
pub mod picklist;
pub mod prelude;
pub mod record;
pub mod result;
pub mod template;
pub mod transport;
pub mod value;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use args::Arguments;
pub use client::RecordClient;
pub use config::ClientConfig;
pub use error::{MissingParameter, SaveFailure, SfError, SfResult};
pub use escape::{EscapeContext, escape, escape_list};
pub use monitor::{CallContext, CallHook, CallStats, CallStatus, StatsHook};
pub use picklist::Picklist;
pub use record::{FromRecord, FromValue, Record, RecordId};
pub use result::{
    ApiError, DeleteResult, DescribeField, DescribeResult, Outcome, QueryResult, RecordIter,
    SaveResult, UndeleteResult, UpsertResult,
};
pub use template::{IntoQueryTemplate, QueryTemplate};
pub use transport::{CallArgs, Transport, TransportError};
pub use value::{SafeString, Value};
pub use writer::{RecordInput, UpdateBase, Writer};

#[cfg(feature = "tracing")]
pub use monitor::TracingCallHook;
