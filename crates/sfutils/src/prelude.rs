//! Commonly used types.
//!
//! ```ignore
//! use sfutils::prelude::*;
//! ```

pub use crate::args::Arguments;
pub use crate::client::RecordClient;
pub use crate::config::ClientConfig;
pub use crate::error::{SfError, SfResult};
pub use crate::picklist::Picklist;
pub use crate::record::{FromRecord, Record};
pub use crate::result::{Outcome, RecordIter, SaveResult, UpsertResult};
pub use crate::template::QueryTemplate;
pub use crate::transport::{CallArgs, Transport, TransportError};
pub use crate::value::{SafeString, Value};
pub use crate::writer::Writer;
