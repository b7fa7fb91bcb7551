use std::fmt::{self, Write};

use crate::{
    dialect::{Dialect, HasDialect},
    error::{Error, Result, fail},
    expr::{cond::Conditions, parse::parse_where},
    mutation::MutationData,
    operator::Conjunction,
    query::Query,
    value::Values,
    writer::{FormatContext, FormatWriter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The statement assembler.
///
/// Holds only the target dialect; every build allocates a fresh
/// [`FormatContext`], so builders are freely shareable and rebuilding the
/// same query is idempotent.
#[derive(Debug, Clone, Copy)]
pub struct Builder {
    dialect: Dialect,
}

impl Builder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn of<D: HasDialect>() -> Self {
        Self::new(D::DIALECT)
    }

    pub fn for_driver(driver: &str) -> Result<Self> {
        Ok(Self::new(Dialect::for_driver(driver)?))
    }

    /// Compile the query state into a `SELECT` statement and its bound
    /// values.
    pub fn build_query(&self, query: &Query) -> Result<(String, Values)> {
        check_joins(query)?;
        let conditions = parse_where(&query.wheres, Conjunction::And)?;

        let mut sql = String::with_capacity(64);
        let mut context = FormatContext::new(&mut sql, self.dialect);
        write_select(query, &conditions, &mut context)
            .expect("should not fail on a string writer");
        let binds = context.into_binds();
        Ok((sql, binds))
    }

    /// Compile the query state into an `INSERT`, `UPDATE` or `DELETE`
    /// statement.
    ///
    /// Update and delete refuse to run without a where clause unless the
    /// state carries the force flag; this is the fail-closed guard against
    /// accidental full-table mutation.
    pub fn build_execute(&self, query: &Query, operation: Operation) -> Result<(String, Values)> {
        let mut sql = String::with_capacity(64);
        let mut context = FormatContext::new(&mut sql, self.dialect);
        match operation {
            Operation::Insert => {
                let data = require_data(query)?;
                data.check_insert()?;
                write_insert(query, data, &mut context)
                    .expect("should not fail on a string writer");
            }
            Operation::Update => {
                let data = require_data(query)?;
                data.check_update()?;
                let conditions = guarded_where(query, operation)?;
                write_update(query, data, &conditions, &mut context)
                    .expect("should not fail on a string writer");
            }
            Operation::Delete => {
                let conditions = guarded_where(query, operation)?;
                write_delete(query, &conditions, &mut context)
                    .expect("should not fail on a string writer");
            }
        }
        let binds = context.into_binds();
        Ok((sql, binds))
    }
}

fn require_data(query: &Query) -> Result<&MutationData> {
    match query.maybe_data {
        Some(ref data) => Ok(data),
        None => fail(Error::MissingData),
    }
}

fn guarded_where(query: &Query, operation: Operation) -> Result<Conditions> {
    let conditions = parse_where(&query.wheres, Conjunction::And)?;
    if conditions.is_empty() && !query.force {
        return fail(Error::MissingWhere(operation));
    }
    Ok(conditions)
}

/// Join arity is checked before anything is written, so a malformed join
/// aborts without emitting a fragment.
fn check_joins(query: &Query) -> Result<()> {
    for join in &query.joins {
        if !matches!(join.args.len(), 1 | 2 | 4) {
            return fail(Error::JoinArity(join.args.len()));
        }
    }
    Ok(())
}

fn write_select<W: Write>(
    query: &Query,
    conditions: &Conditions,
    context: &mut FormatContext<'_, W>,
) -> fmt::Result {
    context.writer.write_str("SELECT ")?;
    if query.distinct {
        context.writer.write_str("DISTINCT ")?;
    }
    if query.fields.is_empty() {
        context.writer.write_char('*')?;
    } else {
        for (index, field) in query.fields.iter().enumerate() {
            if index > 0 {
                context.writer.write_char(',')?;
            }
            context.writer.write_str(field)?;
        }
    }
    context.writer.write_str(" FROM ")?;
    context.writer.write_str(&query.table)?;
    write_joins(query, context)?;
    write_where(conditions, context)?;
    if !query.group.is_empty() {
        context.writer.write_str(" GROUP BY ")?;
        context.writer.write_str(&query.group)?;
    }
    if !query.having.is_empty() {
        context.writer.write_str(" HAVING ")?;
        context.writer.write_str(&query.having)?;
    }
    if !query.order.is_empty() {
        context.writer.write_str(" ORDER BY ")?;
        context.writer.write_str(&query.order)?;
    }
    write_page(query, context)
}

fn write_joins<W: Write>(query: &Query, context: &mut FormatContext<'_, W>) -> fmt::Result {
    for join in &query.joins {
        context.writer.write_char(' ')?;
        context.writer.write_str(join.kind.as_str())?;
        context.writer.write_str(" JOIN ")?;
        match join.args.as_slice() {
            [raw] => context.writer.write_str(raw)?,
            [table, on] => write!(context.writer, "{table} ON {on}")?,
            [table, lhs, op, rhs] => write!(context.writer, "{table} ON {lhs} {op} {rhs}")?,
            // other arities were rejected by check_joins
            _ => {}
        }
    }
    Ok(())
}

fn write_where<W: Write>(
    conditions: &Conditions,
    context: &mut FormatContext<'_, W>,
) -> fmt::Result {
    if conditions.is_empty() {
        return Ok(());
    }
    context.writer.write_str(" WHERE ")?;
    conditions.format_writer(context)
}

/// Pagination is suppressed for union queries, and an offset without a
/// limit is not emitted.
fn write_page<W: Write>(query: &Query, context: &mut FormatContext<'_, W>) -> fmt::Result {
    if query.union {
        return Ok(());
    }
    if let Some(limit) = query.maybe_limit {
        write!(context.writer, " LIMIT {limit}")?;
        if let Some(offset) = query.maybe_offset {
            write!(context.writer, " OFFSET {offset}")?;
        }
    }
    Ok(())
}

fn write_insert<W: Write>(
    query: &Query,
    data: &MutationData,
    context: &mut FormatContext<'_, W>,
) -> fmt::Result {
    context.writer.write_str("INSERT INTO ")?;
    context.writer.write_str(&query.table)?;
    context.writer.write_str(" (")?;
    data.format_columns(context)?;
    context.writer.write_str(") VALUES ")?;
    data.format_tuples(context)
}

fn write_update<W: Write>(
    query: &Query,
    data: &MutationData,
    conditions: &Conditions,
    context: &mut FormatContext<'_, W>,
) -> fmt::Result {
    context.writer.write_str("UPDATE ")?;
    context.writer.write_str(&query.table)?;
    context.writer.write_str(" SET ")?;
    data.format_set(context)?;
    write_where(conditions, context)
}

fn write_delete<W: Write>(
    query: &Query,
    conditions: &Conditions,
    context: &mut FormatContext<'_, W>,
) -> fmt::Result {
    context.writer.write_str("DELETE FROM ")?;
    context.writer.write_str(&query.table)?;
    write_where(conditions, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cond,
        dialect::{MySql, Postgres},
        record,
        value::Value,
    };
    use smol_str::SmolStr;

    #[test]
    fn test_basic_select() {
        let query = Query::table("users");
        let (sql, binds) = Builder::of::<MySql>().build_query(&query).unwrap();
        assert_eq!("SELECT * FROM users", sql);
        assert!(binds.is_empty());
    }

    #[test]
    fn test_full_clause_order() {
        let mut query = Query::table("users");
        query
            .distinct()
            .select(["id", "name"])
            .left_join(["roles", "users.role_id", "=", "roles.id"])
            .where_cond(cond!["age", ">", 18])
            .group_by("name")
            .having("count(*) > 1")
            .order_by("id desc")
            .limit(10)
            .offset(20);
        let (sql, binds) = Builder::of::<Postgres>().build_query(&query).unwrap();
        assert_eq!(
            "SELECT DISTINCT id,name FROM users \
             LEFT JOIN roles ON users.role_id = roles.id \
             WHERE age>$1 GROUP BY name HAVING count(*) > 1 \
             ORDER BY id desc LIMIT 10 OFFSET 20",
            sql
        );
        assert_eq!(vec![Value::I32(18)], binds);
    }

    #[test]
    fn test_join_arities() {
        let mut query = Query::table("users");
        query
            .join("roles ON users.role_id = roles.id")
            .right_join(["perms", "perms.role_id = roles.id"]);
        let (sql, _) = Builder::of::<MySql>().build_query(&query).unwrap();
        assert_eq!(
            "SELECT * FROM users \
             INNER JOIN roles ON users.role_id = roles.id \
             RIGHT JOIN perms ON perms.role_id = roles.id",
            sql
        );
    }

    #[test]
    fn test_join_arity_error() {
        let mut query = Query::table("users");
        query.join(["roles", "users.role_id", "roles.id"]);
        let err = Builder::of::<MySql>().build_query(&query).unwrap_err();
        assert_eq!(Error::JoinArity(3), err);
    }

    #[test]
    fn test_or_group_binds_in_order() {
        let mut query = Query::table("users");
        query.where_cond(cond!["$or", [["name", "3232"], ["name", "like", "sss"]]]);
        let (sql, binds) = Builder::of::<MySql>().build_query(&query).unwrap();
        assert_eq!("SELECT * FROM users WHERE (name = ? or name like ?)", sql);
        assert_eq!(
            vec![
                Value::String(SmolStr::new("3232")),
                Value::String(SmolStr::new("sss")),
            ],
            binds
        );
    }

    #[test]
    fn test_placeholder_count_matches_binds() {
        let mut query = Query::table("users");
        query
            .where_cond(cond!["age", "between", [18, 30]])
            .where_cond(cond!["type", "in", [2, 3, 5]])
            .where_cond(cond!["name", "like", "s%"]);
        let (sql, binds) = Builder::of::<MySql>().build_query(&query).unwrap();
        assert_eq!(sql.matches('?').count(), binds.len());
        assert_eq!(6, binds.len());
    }

    #[test]
    fn test_union_suppresses_pagination() {
        let mut query = Query::table("users");
        query.limit(10).offset(5).union();
        let (sql, _) = Builder::of::<MySql>().build_query(&query).unwrap();
        assert_eq!("SELECT * FROM users", sql);
    }

    #[test]
    fn test_offset_requires_limit() {
        let mut query = Query::table("users");
        query.offset(5);
        let (sql, _) = Builder::of::<MySql>().build_query(&query).unwrap();
        assert_eq!("SELECT * FROM users", sql);
    }

    #[test]
    fn test_update_requires_where() {
        let mut query = Query::table("users");
        query.data(record! { "name" => "fizz" });
        let err = Builder::of::<MySql>()
            .build_execute(&query, Operation::Update)
            .unwrap_err();
        assert_eq!(Error::MissingWhere(Operation::Update), err);
    }

    #[test]
    fn test_force_bypasses_guard() {
        let mut query = Query::table("users");
        query.data(record! { "name" => "fizz" }).force();
        let (sql, binds) = Builder::of::<MySql>()
            .build_execute(&query, Operation::Update)
            .unwrap();
        assert_eq!("UPDATE users SET name = ?", sql);
        assert_eq!(1, binds.len());
    }

    #[test]
    fn test_delete_requires_where() {
        let query = Query::table("users");
        let err = Builder::of::<MySql>()
            .build_execute(&query, Operation::Delete)
            .unwrap_err();
        assert_eq!(Error::MissingWhere(Operation::Delete), err);

        let mut query = Query::table("users");
        query.force();
        let (sql, binds) = Builder::of::<MySql>()
            .build_execute(&query, Operation::Delete)
            .unwrap();
        assert_eq!("DELETE FROM users", sql);
        assert!(binds.is_empty());
    }

    #[test]
    fn test_delete_with_where() {
        let mut query = Query::table("users");
        query.where_cond(cond!["id", 3]);
        let (sql, binds) = Builder::of::<Postgres>()
            .build_execute(&query, Operation::Delete)
            .unwrap();
        assert_eq!("DELETE FROM users WHERE id = $1", sql);
        assert_eq!(vec![Value::I32(3)], binds);
    }

    #[test]
    fn test_insert_requires_data() {
        let query = Query::table("users");
        let err = Builder::of::<MySql>()
            .build_execute(&query, Operation::Insert)
            .unwrap_err();
        assert_eq!(Error::MissingData, err);
    }

    #[test]
    fn test_insert_single_record() {
        let mut query = Query::table("users");
        query.data(record! { "name" => "fizz", "website" => "fizzday.net" });
        let (sql, binds) = Builder::of::<Postgres>()
            .build_execute(&query, Operation::Insert)
            .unwrap();
        assert_eq!("INSERT INTO users (name,website) VALUES ($1,$2)", sql);
        assert_eq!(2, binds.len());
    }

    #[test]
    fn test_insert_missing_key_renders_null() {
        let mut query = Query::table("users");
        query.data(vec![
            record! { "name" => "fizz", "website" => "fizzday.net" },
            record! { "name" => "gorose" },
        ]);
        let (sql, binds) = Builder::of::<Postgres>()
            .build_execute(&query, Operation::Insert)
            .unwrap();
        assert_eq!(
            "INSERT INTO users (name,website) VALUES ($1,$2),($3,null)",
            sql
        );
        assert_eq!(3, binds.len());
    }

    #[test]
    fn test_insert_ignores_where() {
        let mut query = Query::table("users");
        query
            .where_cond(cond!["id", 1])
            .data(record! { "name" => "fizz" });
        let (sql, binds) = Builder::of::<Postgres>()
            .build_execute(&query, Operation::Insert)
            .unwrap();
        assert_eq!("INSERT INTO users (name) VALUES ($1)", sql);
        assert_eq!(1, binds.len());
    }

    #[test]
    fn test_update_with_where() {
        let mut query = Query::table("users");
        query
            .data(record! { "name" => "fizz", "age" => Value::Null })
            .where_cond(cond!["id", 3]);
        let (sql, binds) = Builder::of::<Postgres>()
            .build_execute(&query, Operation::Update)
            .unwrap();
        assert_eq!("UPDATE users SET name = $1,age = null WHERE id = $2", sql);
        assert_eq!(
            vec![Value::String(SmolStr::new("fizz")), Value::I32(3)],
            binds
        );
    }

    #[test]
    fn test_update_expr_passthrough() {
        let mut query = Query::table("users");
        query.data("votes=votes+1").where_cond(cond!["id", 3]);
        let (sql, binds) = Builder::of::<MySql>()
            .build_execute(&query, Operation::Update)
            .unwrap();
        assert_eq!("UPDATE users SET votes=votes+1 WHERE id = ?", sql);
        assert_eq!(1, binds.len());
    }

    #[test]
    fn test_update_rejects_record_sequence() {
        let mut query = Query::table("users");
        query
            .data(vec![record! { "name" => "fizz" }])
            .where_cond(cond!["id", 3]);
        let err = Builder::of::<MySql>()
            .build_execute(&query, Operation::Update)
            .unwrap_err();
        assert_eq!(Error::InvalidData("update expects a single record"), err);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut query = Query::table("users");
        query
            .where_cond(cond!["age", ">", 18])
            .where_cond(cond!["type", "in", [2, 3]]);
        let builder = Builder::of::<Postgres>();
        let first = builder.build_query(&query).unwrap();
        let second = builder.build_query(&query).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            "SELECT * FROM users WHERE age>$1 and type in ($2,$3)",
            first.0
        );
    }

    #[test]
    fn test_for_driver_selects_placeholder_style() {
        let mut query = Query::table("users");
        query.where_cond(cond!["id", 1]);
        let (sql, _) = Builder::for_driver("postgres")
            .unwrap()
            .build_query(&query)
            .unwrap();
        assert_eq!("SELECT * FROM users WHERE id = $1", sql);
        let (sql, _) = Builder::for_driver("mysql")
            .unwrap()
            .build_query(&query)
            .unwrap();
        assert_eq!("SELECT * FROM users WHERE id = ?", sql);
        assert!(Builder::for_driver("oracle").is_err());
    }
}
