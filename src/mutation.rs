use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::{
    error::{Error, Result, fail},
    value::Value,
    writer::FormatContext,
};

/// A key-ordered column/value record. Column order is insertion order, so
/// rebuilding the same payload yields the same statement text.
pub type Record = IndexMap<SmolStr, Value>;

/// The mutation payload, normalized to a closed set of shapes.
///
/// `Expr` and `Exprs` carry pre-rendered `k1=v1,k2=v2` text that bypasses
/// parameter binding entirely; the values land in the SQL as raw literals.
/// This is the legacy escape hatch for callers that already escaped their
/// data, and it is deliberately visible in the type.
#[derive(Debug, Clone)]
pub enum MutationData {
    Record(Record),
    Records(Vec<Record>),
    Expr(SmolStr),
    Exprs(Vec<SmolStr>),
}

impl From<Record> for MutationData {
    fn from(record: Record) -> Self {
        MutationData::Record(record)
    }
}

impl From<Vec<Record>> for MutationData {
    fn from(records: Vec<Record>) -> Self {
        MutationData::Records(records)
    }
}

impl From<&str> for MutationData {
    fn from(expr: &str) -> Self {
        MutationData::Expr(SmolStr::new(expr))
    }
}

impl From<String> for MutationData {
    fn from(expr: String) -> Self {
        MutationData::Expr(SmolStr::new(expr))
    }
}

impl From<SmolStr> for MutationData {
    fn from(expr: SmolStr) -> Self {
        MutationData::Expr(expr)
    }
}

impl From<Vec<&str>> for MutationData {
    fn from(exprs: Vec<&str>) -> Self {
        MutationData::Exprs(exprs.into_iter().map(SmolStr::new).collect())
    }
}

impl From<Vec<String>> for MutationData {
    fn from(exprs: Vec<String>) -> Self {
        MutationData::Exprs(exprs.into_iter().map(SmolStr::new).collect())
    }
}

impl MutationData {
    /// Shape checks for update, run before any output is written.
    pub(crate) fn check_update(&self) -> Result<()> {
        match self {
            MutationData::Records(_) => fail(Error::InvalidData("update expects a single record")),
            _ => Ok(()),
        }
    }

    /// Shape checks for insert, run before any output is written.
    pub(crate) fn check_insert(&self) -> Result<()> {
        match self {
            MutationData::Records(records) if records.is_empty() => {
                fail(Error::InvalidData("insert expects at least one record"))
            }
            MutationData::Exprs(exprs) if exprs.is_empty() => {
                fail(Error::InvalidData("insert expects at least one record"))
            }
            _ => Ok(()),
        }
    }

    /// The `SET` assignment list for update: `k = <placeholder>` per pair,
    /// `k = null` for nil values, delimited-string payloads verbatim.
    pub(crate) fn format_set<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        match self {
            MutationData::Record(record) => {
                for (index, (key, value)) in record.iter().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    context.writer.write_str(key)?;
                    if value.is_null() {
                        context.writer.write_str(" = null")?;
                    } else {
                        context.writer.write_str(" = ")?;
                        context.write_value(value.clone())?;
                    }
                }
                Ok(())
            }
            MutationData::Expr(expr) => context.writer.write_str(expr),
            MutationData::Exprs(exprs) => {
                for (index, expr) in exprs.iter().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    context.writer.write_str(expr)?;
                }
                Ok(())
            }
            // rejected by check_update
            MutationData::Records(_) => Ok(()),
        }
    }

    /// The insert column list. For record sequences the first record fixes
    /// the column set; for delimited strings the first string does.
    pub(crate) fn format_columns<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        match self {
            MutationData::Record(record) => write_columns(context, record.keys()),
            MutationData::Records(records) => match records.first() {
                Some(first) => write_columns(context, first.keys()),
                None => Ok(()),
            },
            MutationData::Expr(expr) => {
                write_columns(context, split_pairs(expr).into_iter().map(|(key, _)| key))
            }
            MutationData::Exprs(exprs) => match exprs.first() {
                Some(first) => {
                    write_columns(context, split_pairs(first).into_iter().map(|(key, _)| key))
                }
                None => Ok(()),
            },
        }
    }

    /// The insert value tuples, one parenthesized tuple per record. A nil
    /// value, or a key the first record has but a later one lacks, renders
    /// the literal `null` with no placeholder and no binding.
    pub(crate) fn format_tuples<W: std::fmt::Write>(
        &self,
        context: &mut FormatContext<'_, W>,
    ) -> std::fmt::Result {
        match self {
            MutationData::Record(record) => {
                context.writer.write_char('(')?;
                for (index, value) in record.values().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    write_tuple_value(context, value)?;
                }
                context.writer.write_char(')')
            }
            MutationData::Records(records) => {
                let Some(first) = records.first() else {
                    return Ok(());
                };
                for (index, record) in records.iter().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    context.writer.write_char('(')?;
                    for (column, key) in first.keys().enumerate() {
                        if column > 0 {
                            context.writer.write_char(',')?;
                        }
                        match record.get(key) {
                            Some(value) => write_tuple_value(context, value)?,
                            None => context.writer.write_str("null")?,
                        }
                    }
                    context.writer.write_char(')')?;
                }
                Ok(())
            }
            MutationData::Expr(expr) => {
                context.writer.write_char('(')?;
                for (index, (_, value)) in split_pairs(expr).into_iter().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    // raw literal, not bound
                    context.writer.write_str(value)?;
                }
                context.writer.write_char(')')
            }
            MutationData::Exprs(exprs) => {
                let Some(first) = exprs.first() else {
                    return Ok(());
                };
                let columns = split_pairs(first);
                for (index, expr) in exprs.iter().enumerate() {
                    if index > 0 {
                        context.writer.write_char(',')?;
                    }
                    let pairs = split_pairs(expr);
                    context.writer.write_char('(')?;
                    for (column, (key, _)) in columns.iter().enumerate() {
                        if column > 0 {
                            context.writer.write_char(',')?;
                        }
                        let value = pairs
                            .iter()
                            .find(|(candidate, _)| candidate == key)
                            .map(|(_, value)| *value);
                        context.writer.write_str(value.unwrap_or("null"))?;
                    }
                    context.writer.write_char(')')?;
                }
                Ok(())
            }
        }
    }
}

fn write_columns<W, I, S>(context: &mut FormatContext<'_, W>, keys: I) -> std::fmt::Result
where
    W: std::fmt::Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (index, key) in keys.into_iter().enumerate() {
        if index > 0 {
            context.writer.write_char(',')?;
        }
        context.writer.write_str(key.as_ref())?;
    }
    Ok(())
}

fn write_tuple_value<W: std::fmt::Write>(
    context: &mut FormatContext<'_, W>,
    value: &Value,
) -> std::fmt::Result {
    if value.is_null() {
        context.writer.write_str("null")
    } else {
        context.write_value(value.clone())
    }
}

/// Split a `k1=v1,k2=v2` payload into pairs; items without a `=` are
/// skipped.
fn split_pairs(expr: &str) -> Vec<(&str, &str)> {
    expr.split(',')
        .filter_map(|item| item.split_once('='))
        .collect()
}
