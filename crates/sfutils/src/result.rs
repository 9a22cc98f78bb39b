//! Results returned by the remote store.

use crate::error::SfResult;
use crate::record::Record;
use futures_core::Stream;
use serde::{Deserialize, Deserializer, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

/// The decoded result of a `query` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    /// Total number of records matched by the query.
    pub size: u64,
    /// Whether `records` holds the complete result set.
    pub done: bool,
    pub records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQueryResult {
    #[serde(default, alias = "totalSize")]
    size: Option<u64>,
    #[serde(default = "default_done")]
    done: bool,
    #[serde(default, deserialize_with = "one_or_many")]
    records: Vec<serde_json::Value>,
}

fn default_done() -> bool {
    true
}

impl QueryResult {
    /// Decode a `query` response, mapping records with `id_field` as the identifier.
    pub fn from_wire(json: serde_json::Value, id_field: &str) -> SfResult<Self> {
        let raw: RawQueryResult = serde_json::from_value(json)?;
        let records = raw
            .records
            .into_iter()
            .map(|r| Record::from_wire(r, id_field))
            .collect::<SfResult<Vec<_>>>()?;
        Ok(Self {
            size: raw.size.unwrap_or(records.len() as u64),
            done: raw.done,
            records,
        })
    }
}

/// A forward-only, non-restartable sequence of query results.
///
/// The records were fetched by the call that produced the iterator;
/// advancing it never reaches the transport. Implements both [`Iterator`]
/// and [`Stream`].
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct RecordIter {
    size: u64,
    done: bool,
    inner: std::vec::IntoIter<Record>,
}

impl RecordIter {
    pub fn new(result: QueryResult) -> Self {
        Self {
            size: result.size,
            done: result.done,
            inner: result.records.into_iter(),
        }
    }

    /// Total number of records matched by the query.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the transport returned the complete result set.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Records not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inner.len()
    }
}

impl Iterator for RecordIter {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for RecordIter {}

impl Stream for RecordIter {
    type Item = Record;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().inner.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An error detail attached to a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub fields: Vec<String>,
}

/// Outcome of a single create, update, delete or undelete.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "one_or_many")]
    pub errors: Vec<ApiError>,
}

impl SaveResult {
    pub fn succeeded(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<ApiError>) -> Self {
        Self {
            id: None,
            success: false,
            errors,
        }
    }
}

pub type DeleteResult = SaveResult;
pub type UndeleteResult = SaveResult;

/// Outcome of a single upsert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub success: bool,
    /// `true` if the upsert inserted a new record rather than updating one.
    #[serde(default)]
    pub created: bool,
    #[serde(default, deserialize_with = "one_or_many")]
    pub errors: Vec<ApiError>,
}

/// Shared view over write outcomes.
pub trait Outcome {
    fn is_success(&self) -> bool;
    fn id(&self) -> Option<&str>;
    fn errors(&self) -> &[ApiError];
}

impl Outcome for SaveResult {
    fn is_success(&self) -> bool {
        self.success
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn errors(&self) -> &[ApiError] {
        &self.errors
    }
}

impl Outcome for UpsertResult {
    fn is_success(&self) -> bool {
        self.success
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn errors(&self) -> &[ApiError] {
        &self.errors
    }
}

/// A field in a [`DescribeResult`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub nillable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Metadata for one object type, returned by `describeSObjects`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeResult {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default, deserialize_with = "one_or_many")]
    pub fields: Vec<DescribeField>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DescribeResult {
    pub fn field(&self, name: &str) -> Option<&DescribeField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Accept a list, a single element, or an absent/`null`/`false` value.
///
/// Single-element lists are sometimes collapsed to the bare element by the
/// remote side.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null | serde_json::Value::Bool(false) => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        single => serde_json::from_value(single)
            .map(|item| vec![item])
            .map_err(D::Error::custom),
    }
}
