use crate::value::{IntoValue, Value};

pub mod cond;
pub(crate) mod parse;

/// One node of the untyped where-condition input.
///
/// Conditions arrive as nested sequences, e.g. `["age", ">", 18]` or
/// `["$or", [["name", "3232"], ["name", "like", "sss"]]]`. The normalizer in
/// [`parse`] validates the shape once and turns it into the typed condition
/// tree; see the [`crate::cond!`] macro for the ergonomic way to build one.
#[derive(Debug, Clone)]
pub enum WhereArg {
    Value(Value),
    List(Vec<WhereArg>),
}

impl WhereArg {
    pub fn value<V: IntoValue>(value: V) -> Self {
        WhereArg::Value(value.into_value())
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = WhereArg>,
    {
        WhereArg::List(items.into_iter().collect())
    }
}

pub trait IntoWhereArg {
    fn into_where_arg(self) -> WhereArg;
}

impl IntoWhereArg for WhereArg {
    #[inline(always)]
    fn into_where_arg(self) -> WhereArg {
        self
    }
}

impl<T> IntoWhereArg for T
where
    T: IntoValue,
{
    fn into_where_arg(self) -> WhereArg {
        WhereArg::Value(self.into_value())
    }
}

impl IntoWhereArg for Vec<WhereArg> {
    fn into_where_arg(self) -> WhereArg {
        WhereArg::List(self)
    }
}

impl<const N: usize> IntoWhereArg for [WhereArg; N] {
    fn into_where_arg(self) -> WhereArg {
        WhereArg::List(self.into_iter().collect())
    }
}

impl<T> IntoWhereArg for Vec<T>
where
    T: IntoValue,
{
    fn into_where_arg(self) -> WhereArg {
        WhereArg::List(self.into_iter().map(WhereArg::value).collect())
    }
}

impl<T, const N: usize> IntoWhereArg for [T; N]
where
    T: IntoValue,
{
    fn into_where_arg(self) -> WhereArg {
        WhereArg::List(self.into_iter().map(WhereArg::value).collect())
    }
}
