//! Query templates with injection-safe placeholder substitution.
//!
//! Placeholders, scanned left to right:
//!
//! - `:name`: quoted substitution. Lists render as `( 'a', 'b' )`, so
//!   `Id IN :ids` works; safe strings are inserted verbatim.
//! - `::name`: unquoted substitution. Text is escaped but not wrapped in quotes.
//! - `?`: the next positional argument, substituted like `:name`.
//!
//! Names match `[A-Za-z_][A-Za-z0-9_]*`. A colon not followed by a name is
//! left as-is, so literals such as `12:00` pass through untouched.
//!
//! # Example
//!
//! ```ignore
//! let accounts = client
//!     .prepare("SELECT Id FROM Account WHERE Name LIKE :pattern AND Id IN :ids", ())
//!     .query_all([
//!         ("pattern", Value::safe(format!("'{}%'", client.escape("Acme_", true, false)))),
//!         ("ids", Value::from(vec!["001A", "001B"])),
//!     ])
//!     .await?;
//! ```

use crate::args::{Arguments, MergedArguments};
use crate::client::RecordClient;
use crate::error::{SfError, SfResult};
use crate::escape::{EscapeContext, write_escaped, write_escaped_list};
use crate::record::{FromRecord, Record};
use crate::result::RecordIter;
use crate::transport::Transport;
use crate::value::Value;
use std::fmt;

/// A template string plus global arguments, bound to the client that runs it.
///
/// The template and global arguments never change after construction; each
/// call to [`build`](QueryTemplate::build) overlays its own local arguments.
pub struct QueryTemplate<'c, T> {
    client: &'c RecordClient<T>,
    template: String,
    globals: Arguments,
}

impl<'c, T> Clone for QueryTemplate<'c, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            template: self.template.clone(),
            globals: self.globals.clone(),
        }
    }
}

impl<T> fmt::Debug for QueryTemplate<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTemplate")
            .field("template", &self.template)
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}

impl<'c, T: Transport> QueryTemplate<'c, T> {
    pub(crate) fn new(
        client: &'c RecordClient<T>,
        template: impl Into<String>,
        globals: impl Into<Arguments>,
    ) -> Self {
        Self {
            client,
            template: template.into(),
            globals: globals.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn globals(&self) -> &Arguments {
        &self.globals
    }

    pub fn client(&self) -> &'c RecordClient<T> {
        self.client
    }

    /// Substitute every placeholder and return the final query string.
    ///
    /// Fails with [`SfError::MissingParameter`] if any placeholder has no
    /// argument; nothing is returned in that case.
    pub fn build(&self, local: impl Into<Arguments>) -> SfResult<String> {
        let local = local.into();
        let built = render(&self.template, self.globals.merged(&local));
        #[cfg(feature = "tracing")]
        {
            if let Err(err) = &built {
                tracing::debug!(
                    target: "sfutils.template",
                    template = %self.template,
                    error = %err,
                    "template build failed",
                );
            }
        }
        built
    }

    /// Build and run the query, returning a forward-only record iterator.
    pub async fn query(&self, local: impl Into<Arguments>) -> SfResult<RecordIter> {
        let query = self.build(local)?;
        self.client.raw_query(&query).await
    }

    /// Build and run the query, collecting every record.
    pub async fn query_all(&self, local: impl Into<Arguments>) -> SfResult<Vec<Record>> {
        Ok(self.query(local).await?.collect())
    }

    /// Build and run the query, returning the first record if there is one.
    pub async fn query_one(&self, local: impl Into<Arguments>) -> SfResult<Option<Record>> {
        Ok(self.query(local).await?.next())
    }

    /// Like [`query_all`](Self::query_all), mapping each record into `R`.
    pub async fn query_all_as<R: FromRecord>(
        &self,
        local: impl Into<Arguments>,
    ) -> SfResult<Vec<R>> {
        self.query(local)
            .await?
            .map(|record| R::from_record(&record))
            .collect()
    }

    /// Like [`query_one`](Self::query_one), mapping the record into `R`.
    pub async fn query_one_as<R: FromRecord>(
        &self,
        local: impl Into<Arguments>,
    ) -> SfResult<Option<R>> {
        self.query_one(local)
            .await?
            .as_ref()
            .map(R::from_record)
            .transpose()
    }
}

/// Either a raw template string or an already prepared [`QueryTemplate`].
pub trait IntoQueryTemplate<'c, T> {
    fn into_query_template(self, client: &'c RecordClient<T>) -> QueryTemplate<'c, T>;
}

impl<'c, T: Transport> IntoQueryTemplate<'c, T> for &str {
    fn into_query_template(self, client: &'c RecordClient<T>) -> QueryTemplate<'c, T> {
        client.prepare(self, Arguments::new())
    }
}

impl<'c, T: Transport> IntoQueryTemplate<'c, T> for String {
    fn into_query_template(self, client: &'c RecordClient<T>) -> QueryTemplate<'c, T> {
        client.prepare(self, Arguments::new())
    }
}

impl<'c, T: Transport> IntoQueryTemplate<'c, T> for &String {
    fn into_query_template(self, client: &'c RecordClient<T>) -> QueryTemplate<'c, T> {
        client.prepare(self.as_str(), Arguments::new())
    }
}

/// A prepared template keeps the client it was prepared with.
impl<'c, T> IntoQueryTemplate<'c, T> for QueryTemplate<'c, T> {
    fn into_query_template(self, _client: &'c RecordClient<T>) -> QueryTemplate<'c, T> {
        self
    }
}

impl<'c, T> IntoQueryTemplate<'c, T> for &QueryTemplate<'c, T> {
    fn into_query_template(self, _client: &'c RecordClient<T>) -> QueryTemplate<'c, T> {
        self.clone()
    }
}

/// Substitute placeholders in `template` from `args`.
pub(crate) fn render(template: &str, args: MergedArguments<'_>) -> SfResult<String> {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + 16);
    let mut copied = 0;
    let mut next_positional = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b':' => {
                let unquoted = bytes.get(i + 1) == Some(&b':');
                let name_start = if unquoted { i + 2 } else { i + 1 };
                let name_end = name_start + name_len(&bytes[name_start.min(bytes.len())..]);
                if name_end == name_start {
                    // Not a placeholder; skip the colon(s) so `::` is never re-read as `:`.
                    i = name_start;
                    continue;
                }

                let name = &template[name_start..name_end];
                let value = args.get(name).ok_or_else(|| SfError::missing_named(name))?;
                out.push_str(&template[copied..i]);
                if unquoted {
                    write_escaped(&mut out, value, EscapeContext::RAW);
                } else {
                    write_quoted(&mut out, value);
                }
                copied = name_end;
                i = name_end;
            }
            b'?' => {
                let value = args
                    .positional(next_positional)
                    .ok_or_else(|| SfError::missing_positional(next_positional))?;
                next_positional += 1;
                out.push_str(&template[copied..i]);
                write_quoted(&mut out, value);
                i += 1;
                copied = i;
            }
            _ => i += 1,
        }
    }

    out.push_str(&template[copied..]);
    Ok(out)
}

fn write_quoted(out: &mut String, value: &Value) {
    match value {
        Value::List(items) => {
            out.push_str("( ");
            write_escaped_list(out, items);
            out.push_str(" )");
        }
        other => write_escaped(out, other, EscapeContext::QUOTED),
    }
}

/// Length of the placeholder name at the start of `bytes`, or 0 if there is none.
fn name_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
        _ => 0,
    }
}
