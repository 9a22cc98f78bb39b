//! The record client: queries, batch writes and their single-record helpers.

use crate::args::Arguments;
use crate::config::ClientConfig;
use crate::error::{SfError, SfResult};
use crate::escape::{EscapeContext, escape};
use crate::monitor::{CallContext, CallStatus};
use crate::record::{FromRecord, Record, RecordId};
use crate::result::{
    DeleteResult, DescribeResult, QueryResult, RecordIter, SaveResult, UndeleteResult,
    UpsertResult,
};
use crate::template::{IntoQueryTemplate, QueryTemplate};
use crate::transport::{CallArgs, Transport, operation};
use crate::value::{SafeString, Value};
use crate::writer::Writer;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::future::Future;
use std::time::Instant;

/// A client for a remote record store.
///
/// Owns the [`Transport`] and exposes record-level operations. Every batch
/// operation returns one outcome per input, in input order; each has a
/// `*_one` counterpart that sends a single input and returns its outcome.
///
/// # Example
///
/// ```ignore
/// use sfutils::{RecordClient, Record};
///
/// let client = RecordClient::new(transport);
///
/// let open = client
///     .query_all("SELECT Id, Subject FROM Case WHERE Status = :status", [("status", "Open")])
///     .await?;
///
/// let saved = client
///     .create_one("Account", &Record::new().with_field("Name", "Acme"))
///     .await?;
/// ```
pub struct RecordClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> RecordClient<T> {
    /// Create a client with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// A [`Writer`] bound to this client.
    pub fn writer(&self) -> Writer<'_, T> {
        Writer::new(self)
    }

    /// Prepare a reusable template with global arguments.
    pub fn prepare(
        &self,
        template: impl Into<String>,
        globals: impl Into<Arguments>,
    ) -> QueryTemplate<'_, T> {
        QueryTemplate::new(self, template, globals)
    }

    /// Escape a value for literal embedding in a query.
    pub fn escape(&self, value: impl Into<Value>, pattern_match: bool, quote: bool) -> SafeString {
        SafeString::new(escape(
            &value.into(),
            EscapeContext::new(pattern_match, quote),
        ))
    }

    // ==================== Queries ====================

    /// Run a finished query string. Issues exactly one transport call.
    pub async fn raw_query(&self, query: &str) -> SfResult<RecordIter> {
        let ctx = CallContext::new(operation::QUERY).with_query(query);
        let args = CallArgs::new().arg("queryString", query);
        let json = self.call(ctx, args).await?;
        let result = QueryResult::from_wire(json, &self.config.id_field)?;
        Ok(RecordIter::new(result))
    }

    /// Run a template (raw or prepared) and return a forward-only record iterator.
    pub async fn query<'c>(
        &'c self,
        template: impl IntoQueryTemplate<'c, T>,
        args: impl Into<Arguments>,
    ) -> SfResult<RecordIter> {
        template.into_query_template(self).query(args).await
    }

    /// Run a template and collect every record.
    pub async fn query_all<'c>(
        &'c self,
        template: impl IntoQueryTemplate<'c, T>,
        args: impl Into<Arguments>,
    ) -> SfResult<Vec<Record>> {
        template.into_query_template(self).query_all(args).await
    }

    /// Run a template and return the first record, or `None` if there are no results.
    pub async fn query_one<'c>(
        &'c self,
        template: impl IntoQueryTemplate<'c, T>,
        args: impl Into<Arguments>,
    ) -> SfResult<Option<Record>> {
        template.into_query_template(self).query_one(args).await
    }

    pub async fn query_all_as<'c, R: FromRecord>(
        &'c self,
        template: impl IntoQueryTemplate<'c, T>,
        args: impl Into<Arguments>,
    ) -> SfResult<Vec<R>> {
        template.into_query_template(self).query_all_as(args).await
    }

    pub async fn query_one_as<'c, R: FromRecord>(
        &'c self,
        template: impl IntoQueryTemplate<'c, T>,
        args: impl Into<Arguments>,
    ) -> SfResult<Option<R>> {
        template.into_query_template(self).query_one_as(args).await
    }

    // ==================== Batch operations ====================

    /// Create records of `object_type`.
    ///
    /// A bare record (no identifier, no fields) is rejected with
    /// [`SfError::InvalidArgument`] before anything is sent.
    pub async fn create(
        &self,
        object_type: &str,
        records: &[Record],
    ) -> SfResult<Vec<SaveResult>> {
        require_type(object_type)?;
        if let Some(index) = records.iter().position(Record::is_bare) {
            return Err(SfError::invalid_argument(format!(
                "cannot create {object_type} from a bare record (record #{index} has no fields set)"
            )));
        }
        self.write(operation::CREATE, object_type, records, CallArgs::new())
            .await
    }

    /// Update records of `object_type`. Every record must carry an identifier.
    pub async fn update(
        &self,
        object_type: &str,
        records: &[Record],
    ) -> SfResult<Vec<SaveResult>> {
        require_type(object_type)?;
        if let Some(index) = records.iter().position(|r| r.id().is_none()) {
            return Err(SfError::invalid_argument(format!(
                "cannot update {object_type} without an id (record #{index})"
            )));
        }
        self.write(operation::UPDATE, object_type, records, CallArgs::new())
            .await
    }

    /// Insert or update records of `object_type`, matching on `external_id_field`.
    pub async fn upsert(
        &self,
        object_type: &str,
        external_id_field: &str,
        records: &[Record],
    ) -> SfResult<Vec<UpsertResult>> {
        require_type(object_type)?;
        if external_id_field.trim().is_empty() {
            return Err(SfError::invalid_argument(
                "external id field name cannot be empty",
            ));
        }
        let args = CallArgs::new().arg("externalIDFieldName", external_id_field);
        self.write(operation::UPSERT, object_type, records, args)
            .await
    }

    /// Delete records by identifier. Accepts raw ids or records.
    pub async fn delete<I: RecordId>(&self, ids: &[I]) -> SfResult<Vec<DeleteResult>> {
        self.by_ids(operation::DELETE, ids).await
    }

    /// Restore deleted records by identifier. Accepts raw ids or records.
    pub async fn undelete<I: RecordId>(&self, ids: &[I]) -> SfResult<Vec<UndeleteResult>> {
        self.by_ids(operation::UNDELETE, ids).await
    }

    /// Fetch `fields` of the given records. Ids that match nothing yield `None`.
    pub async fn retrieve<I: RecordId>(
        &self,
        object_type: &str,
        fields: &[&str],
        ids: &[I],
    ) -> SfResult<Vec<Option<Record>>> {
        require_type(object_type)?;
        let ids = collect_ids(operation::RETRIEVE, ids)?;
        let ctx = CallContext::new(operation::RETRIEVE)
            .with_object_type(object_type)
            .with_batch_size(ids.len());
        let args = CallArgs::new()
            .arg("fieldList", fields.join(", "))
            .arg("sObjectType", object_type)
            .arg("ids", ids);
        let json = self.call(ctx, args).await?;
        list_items(json)
            .into_iter()
            .map(|item| match item {
                Json::Null => Ok(None),
                other => Record::from_wire(other, &self.config.id_field).map(Some),
            })
            .collect()
    }

    /// Describe object types.
    pub async fn describe_sobjects(
        &self,
        object_types: &[&str],
    ) -> SfResult<Vec<DescribeResult>> {
        for object_type in object_types {
            require_type(object_type)?;
        }
        let ctx =
            CallContext::new(operation::DESCRIBE_SOBJECTS).with_batch_size(object_types.len());
        let args = CallArgs::new().arg("sObjectType", object_types.to_vec());
        let json = self.call(ctx, args).await?;
        decode_outcomes(json)
    }

    // ==================== Single-record helpers ====================

    pub async fn create_one(&self, object_type: &str, record: &Record) -> SfResult<SaveResult> {
        first(operation::CREATE, self.create(object_type, std::slice::from_ref(record))).await
    }

    /// Create a single record built by the [`Writer`], bare or not.
    pub(crate) async fn create_built(
        &self,
        object_type: &str,
        record: &Record,
    ) -> SfResult<SaveResult> {
        require_type(object_type)?;
        first(
            operation::CREATE,
            self.write(
                operation::CREATE,
                object_type,
                std::slice::from_ref(record),
                CallArgs::new(),
            ),
        )
        .await
    }

    pub async fn update_one(&self, object_type: &str, record: &Record) -> SfResult<SaveResult> {
        first(operation::UPDATE, self.update(object_type, std::slice::from_ref(record))).await
    }

    pub async fn upsert_one(
        &self,
        object_type: &str,
        external_id_field: &str,
        record: &Record,
    ) -> SfResult<UpsertResult> {
        first(
            operation::UPSERT,
            self.upsert(object_type, external_id_field, std::slice::from_ref(record)),
        )
        .await
    }

    pub async fn delete_one<I: RecordId>(&self, id: I) -> SfResult<DeleteResult> {
        first(operation::DELETE, self.delete(&[id])).await
    }

    pub async fn undelete_one<I: RecordId>(&self, id: I) -> SfResult<UndeleteResult> {
        first(operation::UNDELETE, self.undelete(&[id])).await
    }

    pub async fn retrieve_one<I: RecordId>(
        &self,
        object_type: &str,
        fields: &[&str],
        id: I,
    ) -> SfResult<Option<Record>> {
        first(operation::RETRIEVE, self.retrieve(object_type, fields, &[id])).await
    }

    pub async fn describe_sobject(&self, object_type: &str) -> SfResult<DescribeResult> {
        first(
            operation::DESCRIBE_SOBJECTS,
            self.describe_sobjects(&[object_type]),
        )
        .await
    }

    // ==================== Internals ====================

    async fn write<O: DeserializeOwned>(
        &self,
        op: &str,
        object_type: &str,
        records: &[Record],
        args: CallArgs,
    ) -> SfResult<Vec<O>> {
        let id_field = self.config.id_field.as_str();
        let objects: Vec<Json> = records
            .iter()
            .map(|r| r.to_wire(Some(object_type), id_field))
            .collect();
        let ctx = CallContext::new(op)
            .with_object_type(object_type)
            .with_batch_size(records.len());
        let json = self.call(ctx, args.arg("sObjects", objects)).await?;
        decode_outcomes(json)
    }

    async fn by_ids<I: RecordId>(&self, op: &str, ids: &[I]) -> SfResult<Vec<SaveResult>> {
        let ids = collect_ids(op, ids)?;
        let ctx = CallContext::new(op).with_batch_size(ids.len());
        let json = self.call(ctx, CallArgs::new().arg("ids", ids)).await?;
        decode_outcomes(json)
    }

    /// Send one call through the transport, notifying hooks on both sides.
    async fn call(&self, ctx: CallContext, args: CallArgs) -> SfResult<Json> {
        for hook in &self.config.hooks {
            hook.before_call(&ctx);
        }

        let start = Instant::now();
        let result = self.transport.call(&ctx.operation, args).await;
        let elapsed = start.elapsed();

        let status = match &result {
            Ok(_) => CallStatus::Ok,
            Err(err) => CallStatus::Failed(err.to_string()),
        };
        for hook in &self.config.hooks {
            hook.after_call(&ctx, elapsed, &status);
        }

        Ok(result?)
    }
}

/// Await a batch operation issued for a single input and unwrap its outcome.
async fn first<O>(op: &str, outcomes: impl Future<Output = SfResult<Vec<O>>>) -> SfResult<O> {
    outcomes
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SfError::UnexpectedResponse(format!("{op} returned no outcome")))
}

fn require_type(object_type: &str) -> SfResult<()> {
    if object_type.trim().is_empty() {
        return Err(SfError::invalid_argument("object type cannot be empty"));
    }
    Ok(())
}

fn collect_ids<I: RecordId>(op: &str, ids: &[I]) -> SfResult<Vec<String>> {
    ids.iter()
        .enumerate()
        .map(|(index, item)| {
            item.record_id()
                .map(str::to_string)
                .ok_or_else(|| {
                    SfError::invalid_argument(format!("{op}: record #{index} has no id"))
                })
        })
        .collect()
}

/// Batch responses are a list, but a single outcome may arrive unwrapped.
fn list_items(json: Json) -> Vec<Json> {
    match json {
        Json::Array(items) => items,
        Json::Null => Vec::new(),
        single => vec![single],
    }
}

fn decode_outcomes<O: DeserializeOwned>(json: Json) -> SfResult<Vec<O>> {
    list_items(json)
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(SfError::from))
        .collect()
}
