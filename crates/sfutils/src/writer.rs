//! Create/update helpers that build record payloads and fail on unsuccessful saves.

use crate::client::RecordClient;
use crate::error::{SaveFailure, SfError, SfResult};
use crate::escape::{EscapeContext, escape};
use crate::record::Record;
use crate::result::SaveResult;
use crate::transport::Transport;
use crate::value::Value;
use std::collections::BTreeMap;

/// Field values or a pre-built record to create from.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordInput {
    Values(Vec<(String, Value)>),
    Record(Record),
}

impl From<Record> for RecordInput {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<&Record> for RecordInput {
    fn from(record: &Record) -> Self {
        Self::Record(record.clone())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for RecordInput {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::Values(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for RecordInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Self::Values(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for RecordInput {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::Values(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The record an update starts from: an identifier or an existing record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateBase {
    Id(String),
    Record(Record),
}

impl From<&str> for UpdateBase {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for UpdateBase {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Record> for UpdateBase {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<&Record> for UpdateBase {
    fn from(record: &Record) -> Self {
        Self::Record(record.clone())
    }
}

/// Writes single records through a [`RecordClient`].
///
/// Unlike the client's `*_one` helpers, a non-successful outcome is turned
/// into [`SfError::SaveFailure`].
pub struct Writer<'c, T> {
    client: &'c RecordClient<T>,
}

impl<T> Clone for Writer<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Writer<'_, T> {}

impl<'c, T: Transport> Writer<'c, T> {
    pub fn new(client: &'c RecordClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &'c RecordClient<T> {
        self.client
    }

    /// Create a record of `object_type` from field values or a pre-built record.
    ///
    /// Field values are always sent, even when there are none. A pre-built
    /// record goes through [`RecordClient::create_one`], which rejects a bare
    /// record.
    ///
    /// If `record_type_id` is given it is set on the configured record type
    /// field before sending.
    pub async fn create(
        &self,
        object_type: &str,
        input: impl Into<RecordInput>,
        record_type_id: Option<&str>,
    ) -> SfResult<SaveResult> {
        let (mut record, built) = match input.into() {
            RecordInput::Values(values) => (self.build_record(None, values), true),
            RecordInput::Record(record) => (record, false),
        };
        if let Some(record_type_id) = record_type_id {
            record.set(self.client.config().record_type_field.as_str(), record_type_id);
        }

        // An empty value set is still sent; the remote store decides.
        let result = if built {
            self.client.create_built(object_type, &record).await?
        } else {
            self.client.create_one(object_type, &record).await?
        };
        ensure_success(result)
    }

    /// Update a record, overlaying `values` onto `base`.
    ///
    /// Given an identifier, the payload carries only that identifier and
    /// `values`. Given a record, its identifier and fields are kept and
    /// `values` win over matching fields.
    pub async fn update<K, V>(
        &self,
        object_type: &str,
        base: impl Into<UpdateBase>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> SfResult<SaveResult>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let record = match base.into() {
            UpdateBase::Id(id) => self.build_record(Some(&id), values),
            UpdateBase::Record(mut record) => {
                record.merge_fields(
                    values
                        .into_iter()
                        .map(|(k, v)| (k.into(), field_value(v.into()))),
                );
                record
            }
        };

        let result = self.client.update_one(object_type, &record).await?;
        ensure_success(result)
    }

    /// Build a record from an optional identifier and field values.
    ///
    /// Lists have no field representation of their own and are stored in
    /// their multi-select string form (`a;b;c`).
    pub fn build_record<K, V>(
        &self,
        id: Option<&str>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Record
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Record::new();
        if let Some(id) = id {
            record.set_id(id);
        }
        for (name, value) in values {
            record.set(name, field_value(value.into()));
        }
        record
    }
}

fn field_value(value: Value) -> Value {
    match value {
        Value::List(items) => Value::Text(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| match item {
                    Value::Text(s) => s.clone(),
                    other => escape(other, EscapeContext::RAW),
                })
                .collect::<crate::picklist::Picklist>()
                .to_string(),
        ),
        other => other,
    }
}

fn ensure_success(result: SaveResult) -> SfResult<SaveResult> {
    if result.success {
        Ok(result)
    } else {
        Err(SfError::from(SaveFailure::new(result)))
    }
}

#[cfg(test)]
mod tests;
