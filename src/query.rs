use smol_str::SmolStr;

use crate::{
    expr::{IntoWhereArg, WhereArg},
    mutation::MutationData,
    value::IntoValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Cross => "CROSS",
        }
    }
}

/// One join specification: the kind plus 1, 2 or 4 arguments.
///
/// One argument is a raw join expression, two are `table ON condition`,
/// four are `table ON fieldA op fieldB`. Arity is validated when the
/// statement is built.
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) args: Vec<SmolStr>,
}

pub trait IntoJoinArgs {
    fn into_join_args(self) -> Vec<SmolStr>;
}

impl IntoJoinArgs for &str {
    fn into_join_args(self) -> Vec<SmolStr> {
        vec![SmolStr::new(self)]
    }
}

impl<T> IntoJoinArgs for Vec<T>
where
    T: Into<SmolStr>,
{
    fn into_join_args(self) -> Vec<SmolStr> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T, const N: usize> IntoJoinArgs for [T; N]
where
    T: Into<SmolStr>,
{
    fn into_join_args(self) -> Vec<SmolStr> {
        self.into_iter().map(Into::into).collect()
    }
}

/// The per-request query state consumed by [`crate::Builder`].
///
/// Populated with builder-style setters and read exactly once by a build;
/// building never mutates it, so the same state can be rebuilt and yields
/// identical SQL and binds.
#[derive(Debug, Default, Clone)]
pub struct Query {
    pub(crate) table: SmolStr,
    pub(crate) fields: Vec<SmolStr>,
    pub(crate) joins: Vec<Join>,
    pub(crate) wheres: Vec<WhereArg>,
    pub(crate) group: SmolStr,
    pub(crate) having: SmolStr,
    pub(crate) order: SmolStr,
    pub(crate) maybe_limit: Option<u64>,
    pub(crate) maybe_offset: Option<u64>,
    pub(crate) distinct: bool,
    pub(crate) union: bool,
    pub(crate) force: bool,
    pub(crate) maybe_data: Option<MutationData>,
    extra_cols: Vec<SmolStr>,
}

impl Query {
    pub fn table<T>(table: T) -> Self
    where
        T: Into<SmolStr>,
    {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn select<I, T>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SmolStr>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn join<A: IntoJoinArgs>(&mut self, args: A) -> &mut Self {
        self.push_join(JoinKind::Inner, args)
    }

    pub fn left_join<A: IntoJoinArgs>(&mut self, args: A) -> &mut Self {
        self.push_join(JoinKind::Left, args)
    }

    pub fn right_join<A: IntoJoinArgs>(&mut self, args: A) -> &mut Self {
        self.push_join(JoinKind::Right, args)
    }

    pub fn cross_join<A: IntoJoinArgs>(&mut self, args: A) -> &mut Self {
        self.push_join(JoinKind::Cross, args)
    }

    fn push_join<A: IntoJoinArgs>(&mut self, kind: JoinKind, args: A) -> &mut Self {
        self.joins.push(Join {
            kind,
            args: args.into_join_args(),
        });
        self
    }

    /// Append one condition node; see [`crate::cond!`].
    pub fn where_cond<A: IntoWhereArg>(&mut self, arg: A) -> &mut Self {
        self.wheres.push(arg.into_where_arg());
        self
    }

    /// Append a pre-validated literal condition, emitted verbatim.
    pub fn where_raw<T>(&mut self, raw: T) -> &mut Self
    where
        T: Into<SmolStr>,
    {
        self.wheres.push(WhereArg::Value(raw.into().into_value()));
        self
    }

    pub fn group_by<T>(&mut self, group: T) -> &mut Self
    where
        T: Into<SmolStr>,
    {
        self.group = group.into();
        self
    }

    pub fn having<T>(&mut self, having: T) -> &mut Self
    where
        T: Into<SmolStr>,
    {
        self.having = having.into();
        self
    }

    pub fn order_by<T>(&mut self, order: T) -> &mut Self
    where
        T: Into<SmolStr>,
    {
        self.order = order.into();
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.maybe_limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.maybe_offset = Some(offset);
        self
    }

    /// Mark the query as part of a union; union queries paginate
    /// differently, so limit and offset are not emitted.
    pub fn union(&mut self) -> &mut Self {
        self.union = true;
        self
    }

    /// Opt out of the mandatory-where guard on update and delete.
    pub fn force(&mut self) -> &mut Self {
        self.force = true;
        self
    }

    pub fn data<D>(&mut self, data: D) -> &mut Self
    where
        D: Into<MutationData>,
    {
        self.maybe_data = Some(data.into());
        self
    }

    /// Extra columns for the struct flattening done by the caller's
    /// reflection layer; carried on the state, not read by the compiler.
    pub fn extra_cols<I, T>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SmolStr>,
    {
        self.extra_cols = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn get_extra_cols(&self) -> &[SmolStr] {
        &self.extra_cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cond;

    #[test]
    fn test_fluent_state() {
        let mut query = Query::table("users");
        query
            .select(["id", "name"])
            .distinct()
            .left_join(["roles", "users.role_id", "=", "roles.id"])
            .where_cond(cond!["age", ">", 18])
            .group_by("name")
            .having("count(*) > 1")
            .order_by("id desc")
            .limit(10)
            .offset(20)
            .force();
        assert_eq!("users", query.table.as_str());
        assert_eq!(2, query.fields.len());
        assert_eq!(JoinKind::Left, query.joins[0].kind);
        assert_eq!(4, query.joins[0].args.len());
        assert_eq!(1, query.wheres.len());
        assert_eq!(Some(10), query.maybe_limit);
        assert!(query.force);
    }
}
